//! 核心判分层
//!
//! 不持有任何外部资源，只依赖 [`Embedder`] 抽象：
//! - `segmenter` - 原始文本 → 答卷
//! - `similarity` - 两段文本 → 余弦相似度
//! - `policy` - 相似度 → 整数分
//! - `engine` - 答卷 + 标准答案 → 批改结果

pub mod engine;
pub mod policy;
pub mod segmenter;
pub mod similarity;

pub use engine::GradingEngine;
pub use policy::{GradingPolicy, DEFAULT_ZERO_THRESHOLD};
pub use segmenter::{segment, AnswerSpan, Marker, MarkerVocabulary, Segmenter};
pub use similarity::{cosine_similarity, Embedder, SimilarityScorer};
