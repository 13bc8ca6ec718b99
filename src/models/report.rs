//! 测试执行报告模型
//!
//! 远程执行服务返回 pytest json-report 格式的原始报告，
//! 本模块定义其线上形态，并提供到统一视图的归一化转换。

use serde::{Deserialize, Serialize};

/// 执行调用的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResponse {
    pub report: RawReport,
}

/// 远程服务返回的原始测试报告
#[derive(Debug, Clone, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub exitcode: Option<i64>,
    #[serde(default)]
    pub summary: TestSummary,
    #[serde(default)]
    pub tests: Vec<RawTestCase>,
}

/// 原始报告中的单条测试记录
#[derive(Debug, Clone, Deserialize)]
pub struct RawTestCase {
    pub nodeid: String,
    #[serde(default)]
    pub lineno: i64,
    pub outcome: String,
    #[serde(default)]
    pub call: Option<RawCall>,
    #[serde(default)]
    pub score: Option<TestScore>,
}

/// 测试调用阶段的详情（目前只关心崩溃信息）
#[derive(Debug, Clone, Deserialize)]
pub struct RawCall {
    #[serde(default)]
    pub crash: Option<RawCrash>,
}

/// 崩溃位置与消息
#[derive(Debug, Clone, Deserialize)]
pub struct RawCrash {
    #[serde(default)]
    pub lineno: i64,
    #[serde(default)]
    pub message: String,
}

/// 通过 / 失败统计，原始报告与归一化报告共用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub collected: u32,
}

/// 三个独立维度的评分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScore {
    pub correctness: f64,
    pub efficiency: f64,
    pub readability: f64,
}

/// 崩溃详情（归一化后）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashInfo {
    pub line: i64,
    pub message: String,
}

/// 归一化后的单条测试结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test_name: String,
    pub line_number: i64,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<TestScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash: Option<CrashInfo>,
}

/// 归一化后的执行报告，挂在 `AnalysisResult.result` 上
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<TestOutcome>,
    pub summary: TestSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exitcode: Option<i64>,
}

impl ExecutionReport {
    /// 将原始报告归一化为统一视图
    ///
    /// `outcome == "passed"` 视为通过，其余一律视为失败。
    pub fn from_raw(raw: RawReport) -> Self {
        let outcomes = raw
            .tests
            .into_iter()
            .map(|t| TestOutcome {
                test_name: t.nodeid,
                line_number: t.lineno,
                passed: t.outcome == "passed",
                score: t.score,
                crash: t.call.and_then(|c| c.crash).map(|c| CrashInfo {
                    line: c.lineno,
                    message: c.message,
                }),
            })
            .collect();

        Self {
            outcomes,
            summary: raw.summary,
            created: raw.created,
            duration: raw.duration,
            exitcode: raw.exitcode,
        }
    }
}
