//! 批量答卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量答卷的批改和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、加载标准答案、创建外部服务客户端
//! 2. **批量加载**：扫描所有待批改的答卷（`Vec<Submission>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将答卷分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有答卷的批改结果
//!
//! 单份答卷失败只计入失败数，不会中断其他答卷。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{load_all_submissions, load_answer_key, Submission};
use crate::orchestrator::submission_processor;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_startup, log_submissions_loaded,
    print_final_stats,
};
use crate::workflow::{Collaborators, GradingFlow};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        let answer_key = load_answer_key(Path::new(&config.answer_key_path))
            .await
            .context("加载标准答案失败")?;

        log_startup(config.max_concurrent_submissions, answer_key.len());

        let collaborators = Collaborators::from_config(&config);
        let flow = GradingFlow::new(&config, collaborators, Arc::new(answer_key));

        Ok(Self::with_flow(config, flow))
    }

    /// 使用已构建好的批改流程创建应用
    pub fn with_flow(config: Config, flow: GradingFlow) -> Self {
        Self {
            config,
            flow: Arc::new(flow),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待批改的答卷
        let submissions = self.load_submissions().await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待批改的 PDF 文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        tokio::fs::create_dir_all(&self.config.results_folder)
            .await
            .with_context(|| format!("无法创建结果目录: {}", self.config.results_folder))?;

        log_submissions_loaded(submissions.len(), self.config.max_concurrent_submissions);

        // 批改所有答卷
        let stats = self.process_all_submissions(submissions).await?;

        // 输出最终统计
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.results_folder,
        );

        Ok(stats)
    }

    /// 加载答卷
    async fn load_submissions(&self) -> Result<Vec<Submission>> {
        info!("\n📁 正在扫描待批改的答卷...");
        load_all_submissions(&self.config.submissions_folder).await
    }

    /// 批改所有答卷
    async fn process_all_submissions(&self, submissions: Vec<Submission>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_submissions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = submissions.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        // 分批处理
        for (batch_index, batch) in submissions.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;
            let batch_num = batch_index + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 批改单个批次
    async fn process_batch(
        &self,
        batch: &[Submission],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::with_capacity(batch.len());
        let results_folder = PathBuf::from(&self.config.results_folder);

        // 为本批创建并发任务
        for (idx, submission) in batch.iter().enumerate() {
            let submission_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = Arc::clone(&self.flow);
            let submission = submission.clone();
            let results_folder = results_folder.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result = submission_processor::process_submission(
                    &flow,
                    &submission,
                    submission_index,
                    &results_folder,
                )
                .await;

                if let Err(e) = &result {
                    error!(
                        "[答卷 {} {}] ❌ 批改过程中发生错误: {:#}",
                        submission_index, submission.name, e
                    );
                }
                result.is_ok()
            }));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for joined in join_all(handles).await {
            match joined {
                Ok(true) => result.success += 1,
                Ok(false) => result.failed += 1,
                Err(e) => {
                    error!("任务执行失败: {}", e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}
