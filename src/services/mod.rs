pub mod embedding_service;
pub mod ocr_service;

pub use embedding_service::{CachedEmbedder, EmbeddingService};
pub use ocr_service::{OcrSpaceClient, PageTranscriber, TextExtractor, Transcript};
