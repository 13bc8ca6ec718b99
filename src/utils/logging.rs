//! 日志工具模块
//!
//! 提供 tracing 初始化以及格式化输出的辅助函数

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::question::Question;

/// 初始化日志订阅器
///
/// 过滤级别优先读 `RUST_LOG`，默认 `info`；
/// 配置了详细日志时默认放宽到 `debug`。
pub fn init(config: &Config) {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, restored: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 CS Grader 客户端启动");
    info!("🌐 评分服务: {}", config.grader_api_base_url);
    info!("📂 已恢复题目: {} 道", restored);
    info!("{}", "=".repeat(60));
}

/// 打印一道题目的测试报告
pub fn log_test_report(question: &Question) {
    let report = match question
        .analysis_result
        .as_ref()
        .and_then(|r| r.result.as_ref())
    {
        Some(report) => report,
        None => {
            warn!("[{}] 没有可展示的测试报告", question.id);
            return;
        }
    };

    info!("\n{}", "─".repeat(60));
    info!("📋 测试报告: {}", question.title);
    info!("{}", "─".repeat(60));

    for outcome in &report.outcomes {
        if outcome.passed {
            info!("✅ {} (行 {})", outcome.test_name, outcome.line_number);
        } else {
            info!("❌ {} (行 {})", outcome.test_name, outcome.line_number);
            if let Some(crash) = &outcome.crash {
                info!("   崩溃于行 {}: {}", crash.line, crash.message);
            }
        }
        if let Some(score) = &outcome.score {
            info!(
                "   评分: 正确性 {:.2} | 效率 {:.2} | 可读性 {:.2}",
                score.correctness, score.efficiency, score.readability
            );
        }
    }

    info!("{}", "─".repeat(60));
    info!(
        "📊 通过 {}/{} (收集 {})",
        report.summary.passed, report.summary.total, report.summary.collected
    );
    if let Some(feedback) = question
        .analysis_result
        .as_ref()
        .and_then(|r| r.logic_evaluation.as_ref())
        .map(|e| e.feedback.as_str())
        .filter(|f| !f.is_empty())
    {
        info!("💬 评估反馈: {}", feedback);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
