//! 端到端流程测试
//!
//! 用确定性的评分服务桩替换真实客户端，
//! 验证"提交 → 生成 → 执行 → 合并落盘"的完整链路。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use cs_grader::clients::GradingApi;
use cs_grader::error::{AppError, AppResult};
use cs_grader::models::{AnalysisResult, FileItem, QuestionStatus, QuestionUpdate, RawReport};
use cs_grader::storage::{MemoryKvStore, PersistenceAdapter};
use cs_grader::workflow::{update_channel, QuestionFlow};
use cs_grader::QuestionManager;

/// 记录下来的执行调用参数 (code, test_code)
type ExecuteCalls = Arc<Mutex<Vec<(String, String)>>>;

/// 评分服务桩
///
/// 响应以 JSON 形式脚本化，每次调用重新反序列化，
/// 保证重复调用返回完全一致的结果。
struct StubGrader {
    /// 生成调用的脚本响应；`None` 表示返回服务端错误
    generate_response: Option<serde_json::Value>,
    /// 执行调用的脚本响应；`None` 表示返回服务端错误
    execute_response: Option<serde_json::Value>,
    execute_calls: ExecuteCalls,
}

impl StubGrader {
    /// 创建桩，同时返回共享的调用记录
    fn new(
        generate_response: Option<serde_json::Value>,
        execute_response: Option<serde_json::Value>,
    ) -> (Self, ExecuteCalls) {
        let calls: ExecuteCalls = Arc::new(Mutex::new(Vec::new()));
        let stub = Self {
            generate_response,
            execute_response,
            execute_calls: calls.clone(),
        };
        (stub, calls)
    }
}

#[async_trait]
impl GradingApi for StubGrader {
    async fn generate(
        &self,
        _question_files: &[FileItem],
        _pseudocode_files: &[FileItem],
    ) -> AppResult<AnalysisResult> {
        match &self.generate_response {
            Some(value) => Ok(serde_json::from_value(value.clone()).expect("桩响应应可反序列化")),
            None => Err(AppError::bad_response(
                "process/process-files",
                500,
                "bad input",
            )),
        }
    }

    async fn execute_tests(&self, code: &str, test_code: &str) -> AppResult<RawReport> {
        self.execute_calls
            .lock()
            .unwrap()
            .push((code.to_string(), test_code.to_string()));
        match &self.execute_response {
            Some(value) => Ok(serde_json::from_value(value.clone()).expect("桩响应应可反序列化")),
            None => Err(AppError::bad_response("pytest/run", 500, "sandbox down")),
        }
    }
}

fn generation_ok() -> serde_json::Value {
    json!({
        "input_processing": { "question": "求和", "pseudocode": "x ← 1" },
        "code_generation": {
            "code": "```python\nx = 1\n```",
            "testing_code": "```python\nassert x == 1\n```"
        },
        "logic_evaluation": {
            "score": 0.9,
            "feedback": "思路正确",
            "logical_analysis": {
                "correctness": "正确",
                "efficiency": "常数",
                "readability": "清晰"
            },
            "potential_issues": []
        }
    })
}

fn report_ok() -> serde_json::Value {
    json!({
        "created": 1.0,
        "duration": 0.2,
        "exitcode": 0,
        "tests": [{
            "nodeid": "test_gen.py::test_x",
            "lineno": 2,
            "outcome": "passed",
            "score": { "correctness": 1.0, "efficiency": 0.9, "readability": 0.9 }
        }],
        "summary": { "passed": 1, "failed": 0, "total": 1, "collected": 1 }
    })
}

fn new_manager() -> QuestionManager<MemoryKvStore> {
    QuestionManager::new(PersistenceAdapter::new(MemoryKvStore::new()))
}

/// 建一道带内容的题目，返回 id
fn seed_question(manager: &mut QuestionManager<MemoryKvStore>) -> String {
    let id = manager.add_question();
    manager.update_question(
        &id,
        QuestionUpdate {
            context: Some("计算 x".to_string()),
            pseudocode: Some("x ← 1".to_string()),
            ..Default::default()
        },
    );
    id
}

/// 跑一次提交流程，把全部事件回灌进管理器，返回事件中出现过的状态序列
async fn drive_submit<C: GradingApi>(
    flow: &QuestionFlow<C>,
    manager: &mut QuestionManager<MemoryKvStore>,
    id: &str,
) -> (AppResult<()>, Vec<QuestionStatus>) {
    let seq = manager.begin_submission(id);
    let snapshot = manager.question(id).expect("题目应存在").clone();

    let (tx, mut rx) = update_channel();
    let result = flow.submit(&snapshot, seq, &tx).await;
    drop(tx);

    let mut statuses = Vec::new();
    while let Some(event) = rx.recv().await {
        if let Some(status) = event.update.status {
            statuses.push(status);
        }
        manager.apply_event(event);
    }
    (result, statuses)
}

/// 跑一次独立测试执行，把全部事件回灌进管理器
async fn drive_run_tests<C: GradingApi>(
    flow: &QuestionFlow<C>,
    manager: &mut QuestionManager<MemoryKvStore>,
    id: &str,
) -> AppResult<()> {
    let seq = manager.begin_submission(id);
    let snapshot = manager.question(id).expect("题目应存在").clone();

    let (tx, mut rx) = update_channel();
    let result = flow.run_tests(&snapshot, seq, &tx).await;
    drop(tx);

    while let Some(event) = rx.recv().await {
        manager.apply_event(event);
    }
    result
}

#[tokio::test]
async fn test_submit_generates_seeds_editables_and_chains_execution() {
    let (stub, calls) = StubGrader::new(Some(generation_ok()), Some(report_ok()));
    let flow = QuestionFlow::new(stub);
    let mut manager = new_manager();
    let id = seed_question(&mut manager);

    let (result, statuses) = drive_submit(&flow, &mut manager, &id).await;
    result.expect("提交应成功");

    // 状态轨迹：loading（生成）→ completed → loading（执行）→ completed
    assert_eq!(
        statuses,
        vec![
            QuestionStatus::Loading,
            QuestionStatus::Completed,
            QuestionStatus::Loading,
            QuestionStatus::Completed,
        ]
    );

    let question = manager.question(&id).unwrap();
    assert_eq!(question.status, QuestionStatus::Completed);

    // 可编辑副本播种自生成结果，围栏已剥离
    assert_eq!(question.editable_code, "x = 1");
    assert_eq!(question.editable_tests, "assert x == 1");

    // 链式执行收到的正是剥离围栏后的源码
    let recorded = calls.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "x = 1");
    assert_eq!(recorded[0].1, "assert x == 1");

    let analysis = question.analysis_result.as_ref().expect("应有分析结果");
    let report = analysis.result.as_ref().expect("应有执行报告");
    assert_eq!(report.summary.passed, 1);
    assert!(report.outcomes[0].passed);
}

#[tokio::test]
async fn test_generation_failure_keeps_inputs_intact() {
    let (stub, calls) = StubGrader::new(None, Some(report_ok()));
    let flow = QuestionFlow::new(stub);
    let mut manager = new_manager();
    let id = seed_question(&mut manager);

    let (result, statuses) = drive_submit(&flow, &mut manager, &id).await;
    assert!(result.is_err());
    assert_eq!(statuses.last(), Some(&QuestionStatus::Error));

    let question = manager.question(&id).unwrap();
    assert_eq!(question.status, QuestionStatus::Error);
    // 输入内容原样保留，修正后可以直接重试
    assert_eq!(question.context, "计算 x");
    assert_eq!(question.pseudocode, "x ← 1");
    assert!(question.analysis_result.is_none());

    // 生成失败后不应触发执行调用
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_tests_twice_yields_identical_reports() {
    let (stub, _calls) = StubGrader::new(Some(generation_ok()), Some(report_ok()));
    let flow = QuestionFlow::new(stub);
    let mut manager = new_manager();
    let id = seed_question(&mut manager);
    manager.update_question(
        &id,
        QuestionUpdate {
            editable_code: Some("x = 1".to_string()),
            editable_tests: Some("assert x == 1".to_string()),
            ..Default::default()
        },
    );

    drive_run_tests(&flow, &mut manager, &id).await.unwrap();
    let first = manager
        .question(&id)
        .unwrap()
        .analysis_result
        .as_ref()
        .and_then(|r| r.result.clone())
        .expect("第一次执行应有报告");

    drive_run_tests(&flow, &mut manager, &id).await.unwrap();
    let second = manager
        .question(&id)
        .unwrap()
        .analysis_result
        .as_ref()
        .and_then(|r| r.result.clone())
        .expect("第二次执行应有报告");

    // 相同输入重复执行，归一化结果完全一致
    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(first.summary, second.summary);
}

#[tokio::test]
async fn test_run_tests_with_empty_editable_is_noop() {
    let (stub, calls) = StubGrader::new(Some(generation_ok()), Some(report_ok()));
    let flow = QuestionFlow::new(stub);
    let mut manager = new_manager();
    let id = seed_question(&mut manager);

    // 可编辑副本尚未播种，没有可执行的东西
    drive_run_tests(&flow, &mut manager, &id).await.unwrap();

    let question = manager.question(&id).unwrap();
    assert_eq!(question.status, QuestionStatus::Pending);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_execution_retains_previous_analysis() {
    // 先用正常桩走完一轮提交
    let (stub, _calls) = StubGrader::new(Some(generation_ok()), Some(report_ok()));
    let flow = QuestionFlow::new(stub);
    let mut manager = new_manager();
    let id = seed_question(&mut manager);
    let (result, _) = drive_submit(&flow, &mut manager, &id).await;
    result.expect("提交应成功");

    // 换一个执行必败的桩，模拟重跑失败
    let (failing, _calls) = StubGrader::new(Some(generation_ok()), None);
    let failing_flow = QuestionFlow::new(failing);
    let result = drive_run_tests(&failing_flow, &mut manager, &id).await;
    assert!(result.is_err());

    let question = manager.question(&id).unwrap();
    assert_eq!(question.status, QuestionStatus::Error);
    // 一次失败的测试运行不抹掉已有的生成结果
    let analysis = question.analysis_result.as_ref().expect("分析结果应保留");
    assert!(analysis.code_generation.code.contains("x = 1"));
}

#[tokio::test]
async fn test_collection_survives_persistence_round_trip() {
    let store = MemoryKvStore::new();

    {
        let (stub, _calls) = StubGrader::new(Some(generation_ok()), Some(report_ok()));
        let flow = QuestionFlow::new(stub);
        let mut manager = QuestionManager::new(PersistenceAdapter::new(store.clone()));
        let id = seed_question(&mut manager);
        let (result, _) = drive_submit(&flow, &mut manager, &id).await;
        result.expect("提交应成功");
        manager.persist_if_dirty().await.expect("落盘应成功");
    }

    // 用同一份存储重新加载
    let mut reloaded = QuestionManager::new(PersistenceAdapter::new(store));
    let restored = reloaded.load().await;

    assert_eq!(restored, 1);
    let question = reloaded.active_question().expect("活动题目应恢复");
    assert_eq!(question.status, QuestionStatus::Completed);
    assert_eq!(question.editable_code, "x = 1");
    let report = question
        .analysis_result
        .as_ref()
        .and_then(|r| r.result.as_ref())
        .expect("执行报告应随集合一起恢复");
    assert_eq!(report.summary.passed, 1);
}
