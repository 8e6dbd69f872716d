//! 单份答卷处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：委托 `GradingFlow` 完成批改
//! 2. **结果落盘**：写出 `{results_folder}/{答卷名}.json`
//! 3. **统计输出**：记录得分和诊断信息

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{GradeReport, Submission};
use crate::workflow::{GradingFlow, SubmissionCtx, SubmissionOutcome};

/// 写入结果文件的内容
#[derive(Debug, Serialize)]
pub struct SubmissionRecord<'a> {
    pub submission: &'a str,
    pub graded_at: String,
    pub obtained: u64,
    pub percentage: Option<f64>,
    /// 识别失败的页码（从 0 开始）
    pub failed_pages: &'a [usize],
    /// 切分出的作答，键为 `answer{n}`
    pub answers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub report: &'a GradeReport,
}

impl<'a> SubmissionRecord<'a> {
    pub fn new(submission: &'a Submission, outcome: &'a SubmissionOutcome) -> Self {
        Self {
            submission: &submission.name,
            graded_at: chrono::Local::now().to_rfc3339(),
            obtained: outcome.report.obtained(),
            percentage: outcome.report.percentage(),
            failed_pages: &outcome.transcript.failed_pages,
            answers: outcome.sheet.to_keyed_map(),
            report: &outcome.report,
        }
    }
}

/// 批改单份答卷并写出结果
///
/// # 参数
/// - `flow`: 批改流程（共享）
/// - `submission`: 答卷
/// - `submission_index`: 答卷索引（用于日志）
/// - `results_folder`: 结果输出目录
///
/// # 返回
/// 返回批改结果
pub async fn process_submission(
    flow: &GradingFlow,
    submission: &Submission,
    submission_index: usize,
    results_folder: &Path,
) -> Result<GradeReport> {
    let ctx = SubmissionCtx::new(&submission.name, submission_index);

    log_submission_start(&ctx, submission);

    let outcome = flow.run(submission, &ctx).await?;

    let report_path = write_record(submission, &outcome, results_folder).await?;
    info!("{} 💾 结果已写入: {}", ctx, report_path.display());

    log_submission_complete(&ctx, &outcome.report);

    Ok(outcome.report)
}

/// 写出结果 JSON
async fn write_record(
    submission: &Submission,
    outcome: &SubmissionOutcome,
    results_folder: &Path,
) -> Result<PathBuf> {
    let record = SubmissionRecord::new(submission, outcome);
    let json = serde_json::to_string_pretty(&record).context("序列化批改结果失败")?;

    let path = results_folder.join(submission.report_file_name());
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;

    Ok(path)
}

// ========== 日志辅助函数 ==========

fn log_submission_start(ctx: &SubmissionCtx, submission: &Submission) {
    info!("{} 开始批改", ctx);
    info!("{} 文件: {}", ctx, submission.pdf_path.display());
}

fn log_submission_complete(ctx: &SubmissionCtx, report: &GradeReport) {
    info!(
        "{} 得分: {} / {}（已评 {} 题，可得 {}）",
        ctx,
        report.obtained(),
        report.total_marks,
        report.marks.len(),
        report.attainable
    );

    if !report.unmatched_answers.is_empty() {
        warn!(
            "{} ⚠️ 标准答案中不存在的题号: {:?}",
            ctx, report.unmatched_answers
        );
    }
    if !report.unanswered_questions.is_empty() {
        info!("{} 未作答: {:?}", ctx, report.unanswered_questions);
    }

    info!("\n{} ✅ 答卷批改完成\n", ctx);
}
