//! 语义相似度评分

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::EmbeddingError;

/// 文本向量化能力
///
/// 同一模型版本下，相同文本应得到相同向量。
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[async_trait]
impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }
}

/// 余弦相似度 `dot(a, b) / (‖a‖·‖b‖)`
///
/// 任一向量模长为 0 时返回 0.0；维度不同视为错误。
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = f64::from(av);
                let bv = f64::from(bv);
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / (norm_a * norm_b))
    }
}

/// 相似度评分器
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// 计算学生作答与参考答案的余弦相似度
    ///
    /// 向量化失败直接返回错误，不会被当作 0 分处理。
    pub async fn score(&self, student_answer: &str, reference_answer: &str) -> Result<f64, EmbeddingError> {
        let student = self.embedder.embed(student_answer).await?;
        let reference = self.embedder.embed(reference_answer).await?;

        let similarity = cosine_similarity(&student, &reference)?;
        debug!("相似度: {:.4}", similarity);

        Ok(similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TableEmbedder(HashMap<&'static str, Vec<f32>>);

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| EmbeddingError::EmptyResponse {
                    model: "table".to_string(),
                })
        }
    }

    fn scorer() -> SimilarityScorer {
        let table = HashMap::from([
            ("neural networks", vec![0.6, 0.8, 0.0]),
            ("deep learning", vec![0.8, 0.6, 0.0]),
            ("cooking pasta", vec![0.0, 0.0, 1.0]),
            ("opposite", vec![-0.6, -0.8, 0.0]),
        ]);
        SimilarityScorer::new(Arc::new(TableEmbedder(table)))
    }

    #[test]
    fn test_cosine_basic() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { left: 1, right: 2 }));
    }

    #[tokio::test]
    async fn test_score_reflexive() {
        let similarity = scorer().score("deep learning", "deep learning").await.unwrap();
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_score_related_and_unrelated() {
        let scorer = scorer();

        let related = scorer.score("neural networks", "deep learning").await.unwrap();
        assert!((related - 0.96).abs() < 1e-6);

        let unrelated = scorer.score("cooking pasta", "deep learning").await.unwrap();
        assert!(unrelated.abs() < 1e-9);

        let negative = scorer.score("opposite", "neural networks").await.unwrap();
        assert!(negative < 0.0);
    }

    #[tokio::test]
    async fn test_score_propagates_embedding_failure() {
        let result = scorer().score("unknown text", "deep learning").await;
        assert!(matches!(result, Err(EmbeddingError::EmptyResponse { .. })));
    }
}
