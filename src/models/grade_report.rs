use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question_id::QuestionId;

/// 单份答卷的批改结果
///
/// `marks` 只包含答卷与标准答案中都存在的题号；两侧不匹配的题号
/// 不计分，仅记录在诊断字段中。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// 题号 → 得分
    pub marks: BTreeMap<QuestionId, u32>,
    /// 题号 → 余弦相似度
    pub similarities: BTreeMap<QuestionId, f64>,
    /// 答卷中出现但标准答案中没有的题号
    pub unmatched_answers: Vec<QuestionId>,
    /// 标准答案中有但答卷未作答的题号
    pub unanswered_questions: Vec<QuestionId>,
    /// 已评分题目的满分之和
    pub attainable: f64,
    /// 标准答案全部题目的满分之和，未作答的题也计入
    pub total_marks: f64,
}

impl GradeReport {
    /// 总得分
    pub fn obtained(&self) -> u64 {
        self.marks.values().map(|&mark| u64::from(mark)).sum()
    }

    /// 得分率（百分比），以整份标准答案的满分为分母；满分为 0 时返回 `None`
    pub fn percentage(&self) -> Option<f64> {
        if self.total_marks > 0.0 {
            Some(self.obtained() as f64 / self.total_marks * 100.0)
        } else {
            None
        }
    }

    /// 未匹配题号的数量
    pub fn unmatched_count(&self) -> usize {
        self.unmatched_answers.len() + self.unanswered_questions.len()
    }

    pub fn mark(&self, question: QuestionId) -> Option<u32> {
        self.marks.get(&question).copied()
    }
}
