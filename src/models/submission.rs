use std::path::{Path, PathBuf};

/// 待批改的一份答卷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// 答卷名称（PDF 文件名去掉扩展名）
    pub name: String,
    /// PDF 文件路径
    pub pdf_path: PathBuf,
}

impl Submission {
    pub fn from_path(pdf_path: &Path) -> Self {
        let name = pdf_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "submission".to_string());

        Self {
            name,
            pdf_path: pdf_path.to_path_buf(),
        }
    }

    /// 批改结果文件名
    pub fn report_file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let submission = Submission::from_path(Path::new("scans/alice_midterm.pdf"));
        assert_eq!(submission.name, "alice_midterm");
        assert_eq!(submission.report_file_name(), "alice_midterm.json");
    }
}
