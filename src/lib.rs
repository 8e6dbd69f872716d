//! # Answer Sheet Grader
//!
//! 扫描版答卷自动批改：PDF → OCR 文本 → 按题切分 → 与标准答案做语义相似度比对 → 整数得分
//!
//! ## 架构设计
//!
//! 本系统采用四层架构，外加不持有任何资源的判分核心：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（页面图片目录），只暴露能力
//! - `PdfRasterizer` - PDF → 页面图片（`pdftoppm`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单页或单段文本
//! - `OcrSpaceClient` / `PageTranscriber` - 页面图片 → 原始文本
//! - `EmbeddingService` / `CachedEmbedder` - 文本 → 向量
//!
//! ### 判分核心（Grading）
//! - `grading/` - 纯逻辑，只依赖 `Embedder` 抽象
//! - `Segmenter` - 原始文本 → 答卷
//! - `GradingPolicy` - 相似度 → 整数分
//! - `GradingEngine` - 答卷 + 标准答案 → 批改结果
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份答卷"的完整批改流程
//! - `SubmissionCtx` - 上下文封装（答卷名 + 索引）
//! - `GradingFlow` - 流程编排（渲染 → OCR → 切分 → 判分）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量答卷处理器，管理并发
//! - `orchestrator/submission_processor` - 单份答卷处理器，写出结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod grading;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use grading::{segment, Embedder, GradingEngine, GradingPolicy, Segmenter};
pub use infrastructure::{PageRenderer, PdfRasterizer};
pub use models::{AnswerKey, AnswerKeyEntry, AnswerSheet, GradeReport, QuestionId, Submission};
pub use orchestrator::{process_submission, App, ProcessingStats};
pub use services::{TextExtractor, Transcript};
pub use workflow::{Collaborators, GradingFlow, SubmissionCtx};
