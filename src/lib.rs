//! # CS Grader 客户端
//!
//! 一个用于 CS 作业自动评分的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 题目、附件、分析结果、测试报告的类型定义
//! - `Question` - 题目实体与部分更新合并
//! - `FileItem` - 附件与 MIME 允许清单
//!
//! ### ② 基础设施层（Storage / Clients）
//! - `storage/` - 键值存储抽象与整体覆盖式持久化适配器
//! - `clients/` - 评分服务 HTTP 客户端（生成 + 执行两个端点）
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `AttachmentIngestor` - 文件摄入与 base64 编码能力
//! - `ArtifactStore` - 生成产物缓存能力
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整分析流程
//! - `QuestionFlow` - 流程编排（打包 → 生成 → 执行 → 合并）
//! - 状态变化以部分更新事件发布
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/collection` - 题目集合管理器，持有状态与提交序号
//! - `orchestrator/app` - 应用装配与命令行流程
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GraderClient, GradingApi};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisResult, FileItem, Question, QuestionStatus, QuestionUpdate};
pub use orchestrator::{App, QuestionManager};
pub use storage::{FileKvStore, MemoryKvStore, PersistenceAdapter};
pub use workflow::{update_channel, QuestionEvent, QuestionFlow};
