//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **装配**：把存储、持久化适配器、集合管理器、评分客户端、
//!    分析流程装配成一个可运行的应用
//! 2. **命令行流程**：从命令行读入伪代码 / 题目描述 / 附件，
//!    建题、提交、收集更新事件、落盘、打印报告
//! 3. **事件回灌**：流程层发布的更新事件在这里合并回集合，
//!    攒一批后一次持久化

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::clients::grader_client::GraderClient;
use crate::config::Config;
use crate::models::attachment::{self, Side};
use crate::models::question::{QuestionStatus, QuestionUpdate};
use crate::orchestrator::collection::QuestionManager;
use crate::services::{ArtifactStore, AttachmentIngestor};
use crate::storage::kv_store::FileKvStore;
use crate::storage::persistence::PersistenceAdapter;
use crate::utils::logging;
use crate::workflow::events::update_channel;
use crate::workflow::question_flow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    manager: QuestionManager<FileKvStore>,
    flow: QuestionFlow<GraderClient>,
    ingestor: AttachmentIngestor,
    artifacts: ArtifactStore,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let store = FileKvStore::new(&config.storage_file);
        let mut manager = QuestionManager::new(PersistenceAdapter::new(store));
        let restored = manager.load().await;

        logging::log_startup(&config, restored);

        let client = GraderClient::new(&config).context("创建评分服务客户端失败")?;
        let flow = QuestionFlow::new(client);
        let artifacts = ArtifactStore::new(&config);

        Ok(Self {
            config,
            manager,
            flow,
            ingestor: AttachmentIngestor::new(),
            artifacts,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 用法: `cs_grader <伪代码文件> [题目描述文件] [附件...]`
    pub async fn run(&mut self) -> Result<()> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let Some(pseudocode_path) = args.first() else {
            warn!("用法: cs_grader <伪代码文件> [题目描述文件] [附件...]");
            return Ok(());
        };

        let pseudocode = tokio::fs::read_to_string(pseudocode_path)
            .await
            .with_context(|| format!("读取伪代码文件失败: {}", pseudocode_path))?;

        let context = match args.get(1) {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("读取题目描述文件失败: {}", path))?,
            None => String::new(),
        };

        // 其余参数作为题目描述侧附件摄入，不支持的类型被跳过
        let attachment_paths: Vec<PathBuf> = args.iter().skip(2).map(PathBuf::from).collect();
        let mut context_files = self.ingestor.ingest_all(&attachment_paths).await?;

        // 主文件镜像进附件列表，和编辑保存的行为保持一致
        attachment::upsert_primary(
            &mut context_files,
            Side::Context.primary_name(),
            &context,
        );
        let mut pseudocode_files = Vec::new();
        attachment::upsert_primary(
            &mut pseudocode_files,
            Side::Pseudocode.primary_name(),
            &pseudocode,
        );

        let id = self.manager.add_question();
        self.manager.update_question(
            &id,
            QuestionUpdate {
                context: Some(context),
                pseudocode: Some(pseudocode.clone()),
                context_files: Some(context_files),
                pseudocode_files: Some(pseudocode_files),
                ..Default::default()
            },
        );

        info!(
            "📝 伪代码预览: {}",
            logging::truncate_text(&pseudocode, 80)
        );

        // 提交并回灌更新事件
        let seq = self.manager.begin_submission(&id);
        let snapshot = self
            .manager
            .question(&id)
            .cloned()
            .context("刚创建的题目不存在")?;

        let (tx, mut rx) = update_channel();
        let submit_result = self.flow.submit(&snapshot, seq, &tx).await;
        drop(tx);

        // 攒齐本轮全部事件再落盘一次
        while let Some(event) = rx.recv().await {
            self.manager.apply_event(event);
        }
        self.manager.persist_if_dirty().await?;

        if let Err(e) = submit_result {
            error!("❌ 分析失败: {}", e);
            return Err(e.into());
        }

        let question = self
            .manager
            .question(&id)
            .context("题目在处理过程中消失")?;

        // 缓存生成产物，方便在编辑器里直接打开
        if question.status == QuestionStatus::Completed {
            self.artifacts
                .save(&format!("{}_generated.py", id), &question.editable_code)
                .await?;
            self.artifacts
                .save(&format!("{}_tests.py", id), &question.editable_tests)
                .await?;
            info!("💾 生成产物已缓存到 {}/", self.config.artifacts_dir);
        }

        logging::log_test_report(question);
        Ok(())
    }
}
