//! Embedding 服务 - 业务能力层
//!
//! 只负责"文本 → 向量"能力，不关心判分流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用 `/embeddings` 接口
//! - 兼容 OpenAI API 的向量服务（如 text-embeddings-inference、infinity 等部署的
//!   `all-MiniLM-L6-v2`）
//! - `moka` 内存缓存，同一批次中参考答案只向量化一次

use std::sync::Arc;

use async_openai::{config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use moka::sync::Cache;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::EmbeddingError;
use crate::grading::Embedder;

/// OpenAI 兼容的 Embedding 服务
pub struct EmbeddingService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl EmbeddingService {
    /// 创建新的 Embedding 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.embedding_api_key)
            .with_api_base(&config.embedding_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.embedding_model_name.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!("调用 Embedding API，模型: {}，文本长度: {} 字符", self.model_name, text.len());

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model_name)
            .input(text.to_string())
            .build()
            .map_err(|e| EmbeddingError::api_failed(&self.model_name, e))?;

        let response = self.client.embeddings().create(request).await.map_err(|e| {
            warn!("Embedding API 调用失败: {}", e);
            EmbeddingError::api_failed(&self.model_name, e)
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|embedding| embedding.embedding)
            .ok_or_else(|| EmbeddingError::EmptyResponse {
                model: self.model_name.clone(),
            })
    }
}

/// 带缓存的向量化
///
/// 只缓存成功结果，失败不会被记住。
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Cache<String, Arc<Vec<f32>>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    /// 当前缓存条目数（近似值）
    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(vector) = self.cache.get(text) {
            debug!("Embedding 缓存命中");
            return Ok(vector.as_ref().clone());
        }

        let vector = self.inner.embed(text).await?;
        self.cache.insert(text.to_string(), Arc::new(vector.clone()));
        Ok(vector)
    }
}
