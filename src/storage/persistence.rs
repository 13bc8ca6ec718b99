//! 持久化适配器
//!
//! 负责题目集合与活动题目指针的序列化往返。
//!
//! ## 约定
//!
//! - 两个固定键：题目数组一个键、活动题目 id 一个键
//! - 图片附件的 `preview` 永不落盘，加载后从 `content` 重建
//!   （图片的持久化 `content` 本身就是可展示的 data URL）
//! - 单条题目记录损坏时丢弃该条继续加载，整体损坏时
//!   回到空集合——部分恢复好于全部丢失

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::question::Question;
use crate::storage::kv_store::KvStore;

/// 题目集合的存储键
pub const QUESTIONS_KEY: &str = "cs-grader-questions";

/// 活动题目 id 的存储键
pub const ACTIVE_QUESTION_KEY: &str = "cs-grader-active-question";

/// 持久化适配器
pub struct PersistenceAdapter<S: KvStore> {
    store: S,
}

impl<S: KvStore> PersistenceAdapter<S> {
    /// 创建新的持久化适配器
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 保存整个题目集合与活动指针
    ///
    /// 每次都是整体覆盖写，没有行级写入。
    pub async fn save(&self, questions: &[Question], active_id: Option<&str>) -> AppResult<()> {
        let serialized = serde_json::to_string(questions)?;
        self.store.set(QUESTIONS_KEY, &serialized).await?;

        match active_id {
            Some(id) => self.store.set(ACTIVE_QUESTION_KEY, id).await?,
            None => self.store.remove(ACTIVE_QUESTION_KEY).await?,
        }

        debug!("已持久化 {} 道题目", questions.len());
        Ok(())
    }

    /// 加载题目集合与活动指针
    ///
    /// 任何损坏都不会越过这个边界：整体不可解析时返回空集合，
    /// 单条记录不可解析时丢弃该条。
    pub async fn load(&self) -> (Vec<Question>, Option<String>) {
        let raw = match self.store.get(QUESTIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("没有已保存的题目，按首次运行处理");
                return (Vec::new(), None);
            }
            Err(e) => {
                warn!("⚠️ 读取存储失败，按首次运行处理: {}", e);
                return (Vec::new(), None);
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("⚠️ 存储的题目集合损坏，已重置: {}", e);
                return (Vec::new(), None);
            }
        };

        let total = entries.len();
        let mut questions = Vec::with_capacity(total);
        for entry in entries {
            match serde_json::from_value::<Question>(entry) {
                Ok(mut question) => {
                    rebuild_previews(&mut question);
                    questions.push(question);
                }
                Err(e) => {
                    warn!("⚠️ 丢弃一条损坏的题目记录: {}", e);
                }
            }
        }

        if questions.len() < total {
            warn!("⚠️ 加载完成: {}/{} 条记录有效", questions.len(), total);
        }

        let active_id = match self.store.get(ACTIVE_QUESTION_KEY).await {
            Ok(id) => id.filter(|id| questions.iter().any(|q| q.id == *id)),
            Err(_) => None,
        };

        (questions, active_id)
    }
}

/// 重建题目所有附件的预览字段
fn rebuild_previews(question: &mut Question) {
    for file in question
        .context_files
        .iter_mut()
        .chain(question.pseudocode_files.iter_mut())
    {
        file.rebuild_preview();
    }
}
