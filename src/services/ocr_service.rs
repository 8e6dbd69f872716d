//! OCR 服务 - 业务能力层
//!
//! 只负责"页面图片 → 文本"能力：
//! - [`TextExtractor`] - 单页识别的抽象
//! - [`OcrSpaceClient`] - OCR.space HTTP 接口实现
//! - [`PageTranscriber`] - 逐页识别并拼接为原始文本，单页失败写入行内失败标记

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::OcrError;

/// 单页文本识别能力
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// OCR.space 返回结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// OCR.space 客户端
pub struct OcrSpaceClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    engine: u8,
    max_image_bytes: u64,
}

impl OcrSpaceClient {
    /// 创建新的 OCR 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.ocr_api_url.clone(),
            api_key: config.ocr_api_key.clone(),
            engine: config.ocr_engine,
            max_image_bytes: config.max_page_image_bytes,
        }
    }

    /// 使用自定义接口地址创建
    pub fn with_url(config: &Config, api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::new(config)
        }
    }

    fn request_failed(&self, source: reqwest::Error) -> OcrError {
        OcrError::RequestFailed {
            endpoint: self.api_url.clone(),
            source,
        }
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceClient {
    async fn extract(&self, image_path: &Path) -> Result<String, OcrError> {
        let path_display = image_path.display().to_string();

        let size = tokio::fs::metadata(image_path)
            .await
            .map_err(|source| OcrError::ImageReadFailed {
                path: path_display.clone(),
                source,
            })?
            .len();

        if size > self.max_image_bytes {
            return Err(OcrError::ImageTooLarge {
                path: path_display,
                size,
                limit: self.max_image_bytes,
            });
        }

        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| OcrError::ImageReadFailed {
                path: path_display.clone(),
                source,
            })?;

        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "page.jpg".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| self.request_failed(e))?;

        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("OCREngine", self.engine.to_string())
            .text("isTable", "true")
            .part("file", part);

        debug!("上传页面到 OCR 服务: {} ({} 字节)", path_display, size);

        let response = self
            .http
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::BadResponse {
                message: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let result: OcrSpaceResponse = response.json().await.map_err(|e| self.request_failed(e))?;

        if let Some(parsed) = result.parsed_results.into_iter().next() {
            return Ok(parsed.parsed_text);
        }

        if result.is_errored_on_processing {
            return Err(OcrError::BadResponse {
                message: describe_error_message(result.error_message.as_ref()),
            });
        }

        Err(OcrError::EmptyResponse)
    }
}

/// `ErrorMessage` 可能是字符串或字符串数组
fn describe_error_message(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Array(messages)) => messages
            .iter()
            .filter_map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => "未知错误".to_string(),
    }
}

/// 逐页识别结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// 拼接后的原始文本
    pub text: String,
    /// 页面总数
    pub page_count: usize,
    /// 识别失败的页码（从 0 开始）
    pub failed_pages: Vec<usize>,
}

/// 成功页面的页首标记
pub fn page_marker(page_index: usize) -> String {
    format!("page{}: ", page_index)
}

/// 失败页面的行内标记
pub fn failure_marker(page_index: usize) -> String {
    format!("\n[Error: OCR failed for this page {}]\n", page_index)
}

/// 逐页识别器
pub struct PageTranscriber {
    extractor: Arc<dyn TextExtractor>,
    delete_after_use: bool,
}

impl PageTranscriber {
    /// 创建逐页识别器
    ///
    /// `delete_after_use` 为真时，每页文本取得后立即删除该页图片。
    pub fn new(extractor: Arc<dyn TextExtractor>, delete_after_use: bool) -> Self {
        Self {
            extractor,
            delete_after_use,
        }
    }

    /// 按顺序识别所有页面
    ///
    /// 单页失败不会中断，失败页以 [`failure_marker`] 占位。
    pub async fn transcribe(&self, pages: &[PathBuf]) -> Transcript {
        let mut transcript = Transcript {
            page_count: pages.len(),
            ..Default::default()
        };

        for (index, page) in pages.iter().enumerate() {
            match self.extractor.extract(page).await {
                Ok(text) => {
                    info!("✓ 第 {} 页识别完成，{} 字符", index, text.chars().count());
                    transcript.text.push_str(&page_marker(index));
                    transcript.text.push_str(&text);
                    transcript.text.push('\n');
                }
                Err(e) => {
                    warn!("⚠️ 第 {} 页识别失败: {}", index, e);
                    transcript.text.push_str(&failure_marker(index));
                    transcript.failed_pages.push(index);
                }
            }

            if self.delete_after_use {
                if let Err(e) = tokio::fs::remove_file(page).await {
                    warn!("⚠️ 删除页面图片失败 {}: {}", page.display(), e);
                }
            }
        }

        transcript
    }
}
