//! 答卷批改流程 - 流程层
//!
//! 核心职责：定义"一份答卷"的完整批改流程
//!
//! 流程顺序：
//! 1. PDF → 页面图片
//! 2. 逐页 OCR → 原始文本（失败页以行内标记占位）
//! 3. 原始文本 → 答卷（题号 → 作答）
//! 4. 答卷 + 标准答案 → 批改结果

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::grading::{Embedder, GradingEngine, GradingPolicy, Segmenter};
use crate::infrastructure::{PageRenderer, PdfRasterizer};
use crate::models::{AnswerKey, AnswerSheet, GradeReport, Submission};
use crate::services::embedding_service::{CachedEmbedder, EmbeddingService};
use crate::services::ocr_service::{OcrSpaceClient, PageTranscriber, TextExtractor, Transcript};
use crate::utils::logging::truncate_text;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 外部协作者
///
/// 全部通过 trait 注入，测试时可替换为固定实现。
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn PageRenderer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub embedder: Arc<dyn Embedder>,
}

impl Collaborators {
    /// 按配置创建真实的外部服务客户端
    pub fn from_config(config: &Config) -> Self {
        let embedder = CachedEmbedder::new(
            EmbeddingService::new(config),
            config.embedding_cache_capacity,
        );

        Self {
            renderer: Arc::new(PdfRasterizer::new(config)),
            extractor: Arc::new(OcrSpaceClient::new(config)),
            embedder: Arc::new(embedder),
        }
    }
}

/// 单份答卷的批改产物
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub transcript: Transcript,
    pub sheet: AnswerSheet,
    pub report: GradeReport,
}

/// 答卷批改流程
///
/// - 编排 渲染 → OCR → 切分 → 判分
/// - 不持有任何页面资源，渲染结果在单次 `run` 结束时释放
/// - 标准答案只读共享
pub struct GradingFlow {
    renderer: Arc<dyn PageRenderer>,
    transcriber: PageTranscriber,
    segmenter: Segmenter,
    engine: GradingEngine,
    answer_key: Arc<AnswerKey>,
    verbose_logging: bool,
}

impl GradingFlow {
    /// 创建新的批改流程
    pub fn new(config: &Config, collaborators: Collaborators, answer_key: Arc<AnswerKey>) -> Self {
        Self {
            renderer: collaborators.renderer,
            transcriber: PageTranscriber::new(collaborators.extractor, !config.keep_page_images),
            segmenter: Segmenter::default(),
            engine: GradingEngine::new(
                collaborators.embedder,
                GradingPolicy::new(config.similarity_threshold),
            ),
            answer_key,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 替换切分器（自定义拼写词表）
    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// 批改一份 PDF 答卷
    pub async fn run(&self, submission: &Submission, ctx: &SubmissionCtx) -> Result<SubmissionOutcome> {
        info!("{} 📄 正在渲染 PDF...", ctx);

        let rendered = self
            .renderer
            .render(&submission.pdf_path, &submission.name)
            .await
            .with_context(|| format!("{} PDF 渲染失败", ctx))?;
        debug!("{} 页面目录: {}", ctx, rendered.dir().display());

        self.grade_pages(rendered.pages(), ctx).await
    }

    /// 批改已渲染好的页面图片
    pub async fn grade_pages(&self, pages: &[PathBuf], ctx: &SubmissionCtx) -> Result<SubmissionOutcome> {
        info!("{} 🔍 正在识别 {} 页...", ctx, pages.len());

        let transcript = self.transcriber.transcribe(pages).await;

        if !transcript.failed_pages.is_empty() {
            warn!(
                "{} ⚠️ {} / {} 页识别失败: {:?}",
                ctx,
                transcript.failed_pages.len(),
                transcript.page_count,
                transcript.failed_pages
            );
        }

        let (sheet, report) = self.grade_text(&transcript.text, ctx).await?;

        Ok(SubmissionOutcome {
            transcript,
            sheet,
            report,
        })
    }

    /// 批改原始文本
    pub async fn grade_text(&self, raw_text: &str, ctx: &SubmissionCtx) -> Result<(AnswerSheet, GradeReport)> {
        let sheet = self.segmenter.segment(raw_text);

        if sheet.is_empty() {
            warn!("{} ⚠️ 未识别到任何题目标记", ctx);
        } else {
            info!("{} ✓ 切分出 {} 题", ctx, sheet.len());
        }

        if self.verbose_logging {
            self.log_answers(ctx, &sheet);
        }

        info!("{} 🤖 正在计算语义相似度...", ctx);

        let report = self
            .engine
            .grade(&sheet, &self.answer_key)
            .await
            .with_context(|| format!("{} 判分失败", ctx))?;

        Ok((sheet, report))
    }

    // ========== 日志辅助方法 ==========

    /// 显示作答预览
    fn log_answers(&self, ctx: &SubmissionCtx, sheet: &AnswerSheet) {
        for (question, answer) in sheet.iter() {
            info!("{}   {}: {}", ctx, question, truncate_text(answer, 80));
        }
    }
}
