//! 题目集合管理器 - 编排层
//!
//! ## 职责
//!
//! 1. **集合所有权**：唯一持有题目列表与活动题目指针
//! 2. **变更入口**：所有题目变动都经过 [`QuestionManager::update_question`]，
//!    持久化只需订阅这一条路径
//! 3. **过期响应防护**：按题目分配递增的提交序号，丢弃迟到的旧响应
//! 4. **合并写入**：变更只标记脏位，由调用方攒一批事件后统一落盘，
//!    避免连续更新触发多次整体覆盖写

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::question::{Question, QuestionUpdate};
use crate::storage::kv_store::KvStore;
use crate::storage::persistence::PersistenceAdapter;
use crate::workflow::events::QuestionEvent;

/// 题目集合管理器
pub struct QuestionManager<S: KvStore> {
    questions: Vec<Question>,
    active_question_id: Option<String>,
    persistence: PersistenceAdapter<S>,
    /// 每道题目最近一次下发的提交序号
    submission_seqs: HashMap<String, u64>,
    /// 本进程内创建过的题目数，用于 id 去重
    created_count: u64,
    dirty: bool,
}

impl<S: KvStore> QuestionManager<S> {
    /// 创建空的题目集合管理器
    pub fn new(persistence: PersistenceAdapter<S>) -> Self {
        Self {
            questions: Vec::new(),
            active_question_id: None,
            persistence,
            submission_seqs: HashMap::new(),
            created_count: 0,
            dirty: false,
        }
    }

    /// 从持久化存储恢复集合
    pub async fn load(&mut self) -> usize {
        let (questions, active_id) = self.persistence.load().await;
        info!("📂 已恢复 {} 道题目", questions.len());
        self.questions = questions;
        self.active_question_id = active_id;
        self.dirty = false;
        self.questions.len()
    }

    /// 新建一道题目并设为活动题目
    ///
    /// # 返回
    /// 返回新题目的 id
    pub fn add_question(&mut self) -> String {
        self.created_count += 1;
        let id = format!("q-{}-{}", Utc::now().timestamp_millis(), self.created_count);
        let title = format!("Question {}", self.questions.len() + 1);

        info!("➕ 新建题目: {} ({})", title, id);
        self.questions.push(Question::new(&id, title));
        self.active_question_id = Some(id.clone());
        self.dirty = true;
        id
    }

    /// 选中一道题目；id 不存在时不做任何事
    pub fn select_question(&mut self, id: &str) {
        if self.questions.iter().any(|q| q.id == id) {
            self.active_question_id = Some(id.to_string());
            self.dirty = true;
        }
    }

    /// 删除一道题目
    ///
    /// 被删除的题目如果正是活动题目，活动指针清空，
    /// 不自动选中相邻题目。
    pub fn delete_question(&mut self, id: &str) {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        if self.questions.len() == before {
            return;
        }

        if self.active_question_id.as_deref() == Some(id) {
            self.active_question_id = None;
        }
        self.submission_seqs.remove(id);
        self.dirty = true;
        info!("🗑️ 已删除题目: {}", id);
    }

    /// 合并一次部分更新；id 不存在时不做任何事
    ///
    /// 这是集合唯一的变更入口，流程层事件和用户编辑都走这里。
    pub fn update_question(&mut self, id: &str, update: QuestionUpdate) {
        if let Some(question) = self.questions.iter_mut().find(|q| q.id == id) {
            question.apply(update);
            self.dirty = true;
        }
    }

    /// 为一次新提交分配序号
    ///
    /// 序号按题目单调递增，后续用于丢弃过期响应。
    pub fn begin_submission(&mut self, id: &str) -> u64 {
        let seq = self.submission_seqs.entry(id.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    /// 应用一条流程层事件
    ///
    /// 事件序号小于该题目最近下发的序号时说明来自已被取代的提交，
    /// 直接丢弃（后发的提交覆盖先发的，不做交错合并）。
    pub fn apply_event(&mut self, event: QuestionEvent) {
        let latest = self
            .submission_seqs
            .get(&event.question_id)
            .copied()
            .unwrap_or(0);
        if event.seq < latest {
            debug!(
                "[{}] 丢弃过期事件 (seq {} < {})",
                event.question_id, event.seq, latest
            );
            return;
        }
        self.update_question(&event.question_id, event.update);
    }

    /// 有未落盘的变更时整体持久化一次
    ///
    /// 调用方先攒一批事件再调用，把连续变更合并成一次覆盖写。
    pub async fn persist_if_dirty(&mut self) -> AppResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.persistence
            .save(&self.questions, self.active_question_id.as_deref())
            .await?;
        self.dirty = false;
        Ok(())
    }

    // ========== 只读访问 ==========

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn active_question_id(&self) -> Option<&str> {
        self.active_question_id.as_deref()
    }

    pub fn active_question(&self) -> Option<&Question> {
        let id = self.active_question_id.as_deref()?;
        self.question(id)
    }
}
