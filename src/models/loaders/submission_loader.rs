use crate::models::submission::Submission;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// 扫描文件夹中的所有 PDF 答卷，按文件名排序
pub async fn load_all_submissions(folder_path: &str) -> Result<Vec<Submission>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut submissions = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            tracing::info!(
                "发现答卷: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
            submissions.push(Submission::from_path(&path));
        }
    }

    submissions.sort_by(|a, b| a.pdf_path.cmp(&b.pdf_path));

    Ok(submissions)
}
