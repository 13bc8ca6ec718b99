//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有题目集合并调度整体流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `collection` - 题目集合管理器
//! - 唯一持有题目列表与活动题目指针
//! - 所有变更经过单一入口，合并落盘
//! - 按题目分配提交序号，丢弃过期响应
//!
//! ### `app` - 应用装配与命令行流程
//! - 装配存储、客户端、流程为可运行应用
//! - 从命令行摄入伪代码与附件并提交分析

pub mod app;
pub mod collection;

pub use app::App;
pub use collection::QuestionManager;
