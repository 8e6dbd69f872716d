//! 判分引擎
//!
//! 只对答卷与标准答案都存在的题号评分；两侧多出或缺失的题号不报错，
//! 记录在 [`GradeReport`] 的诊断字段里。

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::grading::policy::GradingPolicy;
use crate::grading::similarity::{Embedder, SimilarityScorer};
use crate::models::{AnswerKey, AnswerSheet, GradeReport};

/// 判分引擎
#[derive(Clone)]
pub struct GradingEngine {
    scorer: SimilarityScorer,
    policy: GradingPolicy,
}

impl GradingEngine {
    pub fn new(embedder: Arc<dyn Embedder>, policy: GradingPolicy) -> Self {
        Self {
            scorer: SimilarityScorer::new(embedder),
            policy,
        }
    }

    pub fn policy(&self) -> GradingPolicy {
        self.policy
    }

    /// 批改一份答卷
    ///
    /// 任一题向量化失败即返回错误，整份答卷不出成绩。
    pub async fn grade(&self, sheet: &AnswerSheet, key: &AnswerKey) -> Result<GradeReport, EmbeddingError> {
        let mut report = GradeReport {
            total_marks: key.total_marks(),
            ..Default::default()
        };

        for (question, student_answer) in sheet.iter() {
            let Some(entry) = key.get(question) else {
                debug!("题号 {} 不在标准答案中，跳过", question);
                report.unmatched_answers.push(question);
                continue;
            };

            let similarity = self
                .scorer
                .score(student_answer, &entry.reference_text)
                .await?;
            let mark = self.policy.mark(similarity, entry.max_marks);

            debug!(
                "题号 {}: 相似度 {:.4} → {}/{}",
                question, similarity, mark, entry.max_marks
            );

            report.similarities.insert(question, similarity);
            report.marks.insert(question, mark);
            report.attainable += entry.max_marks;
        }

        report.unanswered_questions = key
            .iter()
            .map(|(question, _)| question)
            .filter(|question| !sheet.contains(*question))
            .collect();

        if report.unmatched_count() > 0 {
            info!(
                "⚠️ 未匹配题号: 答卷多出 {} 题，未作答 {} 题",
                report.unmatched_answers.len(),
                report.unanswered_questions.len()
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerKeyEntry, QuestionId};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// 按文本查表返回固定向量
    struct FixedEmbedder(HashMap<String, Vec<f32>>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.0.get(text).cloned().ok_or(EmbeddingError::EmptyResponse {
                model: "fixed".to_string(),
            })
        }
    }

    /// 构造与参考向量 (1, 0) 的余弦相似度恰为 `similarity` 的单位向量
    fn at_similarity(similarity: f32) -> Vec<f32> {
        vec![similarity, (1.0 - similarity * similarity).sqrt()]
    }

    fn engine(table: Vec<(&str, Vec<f32>)>) -> GradingEngine {
        let table = table
            .into_iter()
            .map(|(text, vector)| (text.to_string(), vector))
            .collect();
        GradingEngine::new(Arc::new(FixedEmbedder(table)), GradingPolicy::default())
    }

    fn key(entries: &[(u32, &str, f64)]) -> AnswerKey {
        entries
            .iter()
            .map(|(id, text, marks)| (QuestionId(*id), AnswerKeyEntry::new(*text, *marks)))
            .collect()
    }

    #[tokio::test]
    async fn test_grade_example_scenario() {
        let engine = engine(vec![
            ("ML is a subset of AI", vec![1.0, 0.0]),
            ("machine learning is great", at_similarity(0.55)),
        ]);
        let key = key(&[(1, "ML is a subset of AI", 10.0)]);
        let sheet: AnswerSheet = [(QuestionId(1), "machine learning is great".to_string())]
            .into_iter()
            .collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.mark(QuestionId(1)), Some(6));
        assert_eq!(report.attainable, 10.0);
    }

    #[tokio::test]
    async fn test_grade_low_similarity_is_zero() {
        let engine = engine(vec![
            ("reference", vec![1.0, 0.0]),
            ("noise", at_similarity(0.05)),
        ]);
        let key = key(&[(1, "reference", 10.0)]);
        let sheet: AnswerSheet = [(QuestionId(1), "noise".to_string())].into_iter().collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.mark(QuestionId(1)), Some(0));
    }

    #[tokio::test]
    async fn test_grade_identical_answer_full_marks() {
        let engine = engine(vec![("same text", vec![0.3, 0.4, 0.5])]);
        let key = key(&[(2, "same text", 7.0)]);
        let sheet: AnswerSheet = [(QuestionId(2), "same text".to_string())].into_iter().collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.mark(QuestionId(2)), Some(7));
    }

    #[tokio::test]
    async fn test_grade_only_intersection() {
        let engine = engine(vec![("a", vec![1.0, 0.0])]);
        let key = key(&[(1, "a", 5.0), (3, "a", 5.0)]);
        let sheet: AnswerSheet = [
            (QuestionId(1), "a".to_string()),
            (QuestionId(2), "extra".to_string()),
        ]
        .into_iter()
        .collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.marks.len(), 1);
        assert_eq!(report.mark(QuestionId(1)), Some(5));
        assert_eq!(report.mark(QuestionId(2)), None);
        assert_eq!(report.unmatched_answers, vec![QuestionId(2)]);
        assert_eq!(report.unanswered_questions, vec![QuestionId(3)]);
        assert_eq!(report.attainable, 5.0);
        assert_eq!(report.total_marks, 10.0);
        assert_eq!(report.percentage(), Some(50.0));
    }

    #[tokio::test]
    async fn test_grade_partial_sheet_percentage_uses_whole_key() {
        let engine = engine(vec![("reference", vec![1.0, 0.0])]);
        let entries: Vec<(u32, &str, f64)> = (1..=10).map(|id| (id, "reference", 10.0)).collect();
        let key = key(&entries);
        let sheet: AnswerSheet = [(QuestionId(1), "reference".to_string())].into_iter().collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.obtained(), 10);
        assert_eq!(report.attainable, 10.0);
        assert_eq!(report.total_marks, 100.0);
        assert_eq!(report.percentage(), Some(10.0));
        assert_eq!(report.unanswered_questions.len(), 9);
    }

    #[tokio::test]
    async fn test_grade_large_max_marks_total() {
        let engine = engine(vec![("reference", vec![1.0, 0.0])]);
        let key = key(&[(1, "reference", 3e9), (2, "reference", 3e9)]);
        assert!(key.validate().is_ok());
        let sheet: AnswerSheet = [
            (QuestionId(1), "reference".to_string()),
            (QuestionId(2), "reference".to_string()),
        ]
        .into_iter()
        .collect();

        let report = engine.grade(&sheet, &key).await.unwrap();
        assert_eq!(report.mark(QuestionId(1)), Some(3_000_000_000));
        assert_eq!(report.obtained(), 6_000_000_000);
    }

    #[tokio::test]
    async fn test_grade_embedding_failure_is_error() {
        let engine = engine(vec![("reference", vec![1.0, 0.0])]);
        let key = key(&[(1, "reference", 10.0)]);
        let sheet: AnswerSheet = [(QuestionId(1), "unknown".to_string())].into_iter().collect();

        assert!(engine.grade(&sheet, &key).await.is_err());
    }

    #[tokio::test]
    async fn test_grade_empty_inputs() {
        let engine = engine(vec![]);
        let report = engine
            .grade(&AnswerSheet::new(), &AnswerKey::new())
            .await
            .unwrap();
        assert!(report.marks.is_empty());
        assert_eq!(report.obtained(), 0);
        assert_eq!(report.percentage(), None);
    }
}
