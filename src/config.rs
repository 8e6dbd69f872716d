use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待批改答卷（PDF）所在目录
    pub submissions_folder: String,
    /// 标准答案 JSON 文件
    pub answer_key_path: String,
    /// 批改结果输出目录
    pub results_folder: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 同时批改的答卷数量
    pub max_concurrent_submissions: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- OCR 配置 ---
    pub ocr_api_key: String,
    pub ocr_api_url: String,
    pub ocr_engine: u8,
    // --- PDF 渲染配置 ---
    pub pdf_dpi: u32,
    /// 单页图片上传上限（字节）
    pub max_page_image_bytes: u64,
    /// OCR 完成后是否保留页面图片
    pub keep_page_images: bool,
    /// 保留页面图片时的存放目录
    pub page_image_folder: String,
    // --- Embedding 配置 ---
    pub embedding_api_key: String,
    pub embedding_api_base_url: String,
    pub embedding_model_name: String,
    pub embedding_cache_capacity: u64,
    // --- 判分配置 ---
    /// 相似度不超过该值时直接判 0 分
    pub similarity_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submissions_folder: "submissions".to_string(),
            answer_key_path: "answer_key.json".to_string(),
            results_folder: "results".to_string(),
            output_log_file: "grading_log.txt".to_string(),
            max_concurrent_submissions: 4,
            verbose_logging: false,
            ocr_api_key: String::new(),
            ocr_api_url: "https://api.ocr.space/parse/image".to_string(),
            ocr_engine: 2,
            pdf_dpi: 100,
            max_page_image_bytes: 1024 * 1024,
            keep_page_images: false,
            page_image_folder: "output".to_string(),
            embedding_api_key: String::new(),
            embedding_api_base_url: "http://localhost:8080/v1".to_string(),
            embedding_model_name: "all-MiniLM-L6-v2".to_string(),
            embedding_cache_capacity: 1024,
            similarity_threshold: 0.1,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            answer_key_path: std::env::var("ANSWER_KEY_PATH").unwrap_or(default.answer_key_path),
            results_folder: std::env::var("RESULTS_FOLDER").unwrap_or(default.results_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_submissions),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            ocr_api_key: std::env::var("OCR_API_KEY").unwrap_or(default.ocr_api_key),
            ocr_api_url: std::env::var("OCR_API_URL").unwrap_or(default.ocr_api_url),
            ocr_engine: std::env::var("OCR_ENGINE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ocr_engine),
            pdf_dpi: std::env::var("PDF_DPI").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pdf_dpi),
            max_page_image_bytes: std::env::var("MAX_PAGE_IMAGE_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_page_image_bytes),
            keep_page_images: std::env::var("KEEP_PAGE_IMAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.keep_page_images),
            page_image_folder: std::env::var("PAGE_IMAGE_FOLDER").unwrap_or(default.page_image_folder),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY").unwrap_or(default.embedding_api_key),
            embedding_api_base_url: std::env::var("EMBEDDING_API_BASE_URL").unwrap_or(default.embedding_api_base_url),
            embedding_model_name: std::env::var("EMBEDDING_MODEL_NAME").unwrap_or(default.embedding_model_name),
            embedding_cache_capacity: std::env::var("EMBEDDING_CACHE_CAPACITY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.embedding_cache_capacity),
            similarity_threshold: std::env::var("SIMILARITY_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.similarity_threshold),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_submissions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_submissions".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "similarity_threshold".to_string(),
                reason: format!("必须在 [0, 1] 之间，当前为 {}", self.similarity_threshold),
            });
        }
        if self.pdf_dpi == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pdf_dpi".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}
