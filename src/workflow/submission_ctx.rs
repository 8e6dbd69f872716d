//! 答卷处理上下文
//!
//! 封装"我正在批改第几份答卷"这一信息

use std::fmt::Display;

/// 答卷处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 答卷名称
    pub name: String,

    /// 答卷索引（从1开始，仅用于日志显示）
    pub submission_index: usize,
}

impl SubmissionCtx {
    /// 创建新的答卷上下文
    pub fn new(name: impl Into<String>, submission_index: usize) -> Self {
        Self {
            name: name.into(),
            submission_index,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[答卷 {} {}]", self.submission_index, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = SubmissionCtx::new("alice", 3);
        assert_eq!(ctx.to_string(), "[答卷 3 alice]");
    }
}
