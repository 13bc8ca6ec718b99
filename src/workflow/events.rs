//! 题目更新事件
//!
//! 流程层不直接改动任何题目记录，每个状态 / 结果变化都作为
//! 部分更新事件发布，由编排层统一合并并增量持久化。

use tokio::sync::mpsc;

use crate::models::question::QuestionUpdate;

/// 一次题目部分更新事件
#[derive(Debug)]
pub struct QuestionEvent {
    /// 目标题目 id
    pub question_id: String,
    /// 本次提交的序号，编排层用它丢弃迟到的过期响应
    pub seq: u64,
    /// 部分更新内容
    pub update: QuestionUpdate,
}

/// 更新事件发送端
pub type UpdateSender = mpsc::UnboundedSender<QuestionEvent>;

/// 更新事件接收端
pub type UpdateReceiver = mpsc::UnboundedReceiver<QuestionEvent>;

/// 创建一条更新事件通道
pub fn update_channel() -> (UpdateSender, UpdateReceiver) {
    mpsc::unbounded_channel()
}
