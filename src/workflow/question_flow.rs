//! 题目分析流程 - 流程层
//!
//! 核心职责：驱动一道题目走完生命周期状态机
//!
//! ```text
//! pending → loading → completed | error
//! ```
//!
//! 流程顺序：
//! 1. submit：打包两侧文件 → 生成调用 → 存结果、播种可编辑副本
//! 2. 链式 run_tests：用刚生成的代码 / 测试执行一次测试
//! 3. 独立 run_tests：随时针对当前可编辑副本重跑测试
//!
//! 流程自身不持有题目集合，所有变化通过事件通道发布。

use tracing::{info, warn};

use crate::clients::grader_client::GradingApi;
use crate::error::AppResult;
use crate::models::analysis::AnalysisResult;
use crate::models::attachment::{FileItem, Side};
use crate::models::question::{Question, QuestionStatus, QuestionUpdate};
use crate::models::report::ExecutionReport;
use crate::workflow::events::{QuestionEvent, UpdateSender};

/// 题目分析流程
///
/// - 编排"提交 → 生成 → 执行"的完整流程
/// - 只依赖评分服务能力接口，不持有题目集合
/// - 每个状态变化都发布为部分更新事件
pub struct QuestionFlow<C: GradingApi> {
    client: C,
}

impl<C: GradingApi> QuestionFlow<C> {
    /// 创建新的题目分析流程
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// 提交一道题目做完整分析
    ///
    /// 对内容没有前置要求，空输入原样转发，由远程服务判断是否充分。
    /// 新的提交完全取代之前的结果：旧的分析结果和可编辑副本先清空，
    /// 不尝试部分合并。
    ///
    /// # 参数
    /// - `question`: 提交时刻的题目快照
    /// - `seq`: 本次提交的序号（编排层分配）
    /// - `updates`: 更新事件发送端
    pub async fn submit(
        &self,
        question: &Question,
        seq: u64,
        updates: &UpdateSender,
    ) -> AppResult<()> {
        info!("[{}] 📤 提交分析...", question.id);

        // 进入 loading，同时清空上一轮的结果与可编辑副本
        emit(
            updates,
            &question.id,
            seq,
            QuestionUpdate {
                status: Some(QuestionStatus::Loading),
                analysis_result: Some(None),
                editable_code: Some(String::new()),
                editable_tests: Some(String::new()),
                ..Default::default()
            },
        );

        // 两侧各打包成"恰好一个主文件 + 全部非主附件"
        let question_files =
            package_side(Side::Context, &question.context, &question.context_files);
        let pseudocode_files = package_side(
            Side::Pseudocode,
            &question.pseudocode,
            &question.pseudocode_files,
        );

        let result = match self
            .client
            .generate(&question_files, &pseudocode_files)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                // 内容与附件保持原样，用户修正后可以直接重试
                warn!("[{}] ⚠️ 生成调用失败: {}", question.id, e);
                emit(
                    updates,
                    &question.id,
                    seq,
                    QuestionUpdate::status(QuestionStatus::Error),
                );
                return Err(e);
            }
        };

        // 播种可编辑副本：本轮开头刚清空过，此时一定没有本地编辑
        let code = strip_code_fence(&result.code_generation.code);
        let tests = strip_code_fence(&result.code_generation.testing_code);

        info!("[{}] ✓ 生成完成", question.id);
        emit(
            updates,
            &question.id,
            seq,
            QuestionUpdate {
                status: Some(QuestionStatus::Completed),
                analysis_result: Some(Some(result.clone())),
                editable_code: Some(code.clone()),
                editable_tests: Some(tests.clone()),
                ..Default::default()
            },
        );

        // 没有执行过测试的生成结果对用户没有参考价值，立刻链式执行
        self.execute_and_merge(&question.id, seq, &code, &tests, Some(result), updates)
            .await
    }

    /// 针对当前可编辑副本执行一次测试
    ///
    /// 可独立于 `submit` 调用（例如用户手改代码之后）。
    /// 任一侧为空则没有可执行的东西，保持状态不变直接返回。
    pub async fn run_tests(
        &self,
        question: &Question,
        seq: u64,
        updates: &UpdateSender,
    ) -> AppResult<()> {
        self.execute_and_merge(
            &question.id,
            seq,
            &question.editable_code,
            &question.editable_tests,
            question.analysis_result.clone(),
            updates,
        )
        .await
    }

    /// 执行测试并把归一化报告合并进分析结果
    ///
    /// 失败时只把状态置为 `error`——之前成功的生成结果保留，
    /// 一次失败的测试运行不应抹掉已有的生成代码。
    async fn execute_and_merge(
        &self,
        question_id: &str,
        seq: u64,
        code: &str,
        tests: &str,
        base: Option<AnalysisResult>,
        updates: &UpdateSender,
    ) -> AppResult<()> {
        if code.is_empty() || tests.is_empty() {
            info!("[{}] 代码或测试为空，跳过执行", question_id);
            return Ok(());
        }

        info!("[{}] 🧪 执行测试...", question_id);
        emit(
            updates,
            question_id,
            seq,
            QuestionUpdate::status(QuestionStatus::Loading),
        );

        let raw = match self.client.execute_tests(code, tests).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[{}] ⚠️ 测试执行失败: {}", question_id, e);
                emit(
                    updates,
                    question_id,
                    seq,
                    QuestionUpdate::status(QuestionStatus::Error),
                );
                return Err(e);
            }
        };

        let report = ExecutionReport::from_raw(raw);
        info!(
            "[{}] ✓ 测试完成: 通过 {}/{}",
            question_id, report.summary.passed, report.summary.total
        );

        // 没有生成结果时，报告需要一个挂载点
        let mut merged = base.unwrap_or_else(|| AnalysisResult::from_editable(code, tests));
        merged.result = Some(report);

        emit(
            updates,
            question_id,
            seq,
            QuestionUpdate {
                status: Some(QuestionStatus::Completed),
                analysis_result: Some(Some(merged)),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// 打包题目的一侧
///
/// 保证打包结果恰好包含一个持有当前文本的主文件（即使文本为空），
/// 外加按附加顺序排列的全部非主附件。
fn package_side(side: Side, text: &str, files: &[FileItem]) -> Vec<FileItem> {
    let primary_name = side.primary_name();
    let mut packaged: Vec<FileItem> = vec![FileItem::text(primary_name, text)];
    packaged.extend(files.iter().filter(|f| f.name != primary_name).cloned());
    packaged
}

/// 剥离一层代码围栏（幂等）
///
/// 生成接口返回 ```` ```lang ... ``` ```` 形式的围栏源码；
/// 没有围栏的文本原样返回，重复剥离不会变化。
pub fn strip_code_fence(text: &str) -> String {
    let re =
        match regex::Regex::new(r"(?s)^\s*```[A-Za-z0-9_+#.-]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```\s*$")
        {
            Ok(re) => re,
            Err(_) => return text.to_string(),
        };
    match re.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    }
}

/// 发布一条更新事件
///
/// 接收端已关闭说明编排层不再收集更新，只记录日志。
fn emit(updates: &UpdateSender, question_id: &str, seq: u64, update: QuestionUpdate) {
    let event = QuestionEvent {
        question_id: question_id.to_string(),
        seq,
        update,
    };
    if updates.send(event).is_err() {
        warn!("[{}] ⚠️ 更新通道已关闭，事件被丢弃", question_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attachment::{CONTEXT_PRIMARY_NAME, PSEUDOCODE_PRIMARY_NAME};

    #[test]
    fn test_strip_code_fence_basic() {
        let fenced = "```python\nx = 1\n```";
        assert_eq!(strip_code_fence(fenced), "x = 1");
    }

    #[test]
    fn test_strip_code_fence_without_language() {
        assert_eq!(strip_code_fence("```\nassert x == 1\n```"), "assert x == 1");
    }

    #[test]
    fn test_strip_code_fence_is_idempotent() {
        let fenced = "```python\ndef f():\n    return 1\n```";
        let once = strip_code_fence(fenced);
        let twice = strip_code_fence(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "def f():\n    return 1");
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("x = 1"), "x = 1");
        assert_eq!(strip_code_fence(""), "");
    }

    #[test]
    fn test_package_side_always_has_one_primary() {
        // 文本为空也要有主文件
        let packaged = package_side(Side::Pseudocode, "", &[]);
        assert_eq!(packaged.len(), 1);
        assert_eq!(packaged[0].name, PSEUDOCODE_PRIMARY_NAME);
        assert_eq!(packaged[0].content, "");
    }

    #[test]
    fn test_package_side_primary_supersedes_stored_copy() {
        // 附件列表里残留的旧主文件不会重复出现，以当前文本为准
        let files = vec![
            FileItem::text(CONTEXT_PRIMARY_NAME, "旧文本"),
            FileItem::text("extra.txt", "附件"),
        ];
        let packaged = package_side(Side::Context, "新文本", &files);

        let primaries: Vec<_> = packaged
            .iter()
            .filter(|f| f.name == CONTEXT_PRIMARY_NAME)
            .collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].content, "新文本");
        assert_eq!(packaged.len(), 2);
        assert_eq!(packaged[1].name, "extra.txt");
    }
}
