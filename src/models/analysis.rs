//! 分析结果模型
//!
//! 生成调用成功后返回的结构化输出：生成的代码与测试、
//! 逻辑评估反馈，以及最近一次测试执行的归一化报告。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::report::ExecutionReport;

/// 一次生成调用的结构化结果
///
/// 直接按生成接口的响应体反序列化；`result` 字段由
/// 测试执行流程在本地填充，线上响应中不存在。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 服务端回显的输入解析结果（原样保留，不做解释）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_processing: Option<Value>,
    /// 生成的代码与测试代码
    pub code_generation: CodeGeneration,
    /// 伪代码逻辑评估
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_evaluation: Option<LogicEvaluation>,
    /// 最近一次测试执行的归一化报告
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExecutionReport>,
}

impl AnalysisResult {
    /// 从用户可编辑副本合成一个最小结果
    ///
    /// 用户在没有生成结果的情况下独立触发测试执行时，
    /// 归一化报告需要一个挂载点。
    pub fn from_editable(code: impl Into<String>, testing_code: impl Into<String>) -> Self {
        Self {
            input_processing: None,
            code_generation: CodeGeneration {
                code: code.into(),
                testing_code: testing_code.into(),
            },
            logic_evaluation: None,
            result: None,
        }
    }
}

/// 生成的源码（围栏形式的文本，展示前需剥离围栏）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeGeneration {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub testing_code: String,
}

/// 逻辑评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicEvaluation {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    pub logical_analysis: LogicalAnalysis,
    #[serde(default)]
    pub potential_issues: Vec<String>,
}

/// 三个维度的文字评价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalAnalysis {
    #[serde(default)]
    pub correctness: String,
    #[serde(default)]
    pub efficiency: String,
    #[serde(default)]
    pub readability: String,
}
