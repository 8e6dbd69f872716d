use thiserror::Error;

/// OCR 服务错误
///
/// 单页失败不会中断整份答卷，由 `PageTranscriber` 转换为行内失败标记
#[derive(Debug, Error)]
pub enum OcrError {
    /// 网络请求失败
    #[error("OCR请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回错误响应
    #[error("OCR服务返回错误: {message}")]
    BadResponse { message: String },
    /// 服务返回空结果
    #[error("OCR服务未返回解析结果")]
    EmptyResponse,
    /// 图片超过上传大小限制
    #[error("页面图片过大 ({path}): {size} 字节，上限 {limit} 字节")]
    ImageTooLarge { path: String, size: u64, limit: u64 },
    /// 读取图片失败
    #[error("读取页面图片失败 ({path}): {source}")]
    ImageReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 向量化服务错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// API 调用失败
    #[error("Embedding API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 返回结果为空
    #[error("Embedding返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 两个向量维度不一致
    #[error("向量维度不一致: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// PDF 渲染错误
#[derive(Debug, Error)]
pub enum RasterizeError {
    /// 无法启动 pdftoppm
    #[error("无法启动 {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// pdftoppm 退出码非零
    #[error("PDF渲染失败 ({path}): {stderr}")]
    ConversionFailed { path: String, stderr: String },
    /// 没有生成任何页面
    #[error("PDF没有可渲染的页面: {path}")]
    NoPages { path: String },
    /// 临时目录或输出目录操作失败
    #[error("页面目录操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 答案文件错误
#[derive(Debug, Error)]
pub enum AnswerKeyError {
    /// 读取文件失败
    #[error("读取答案文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("答案文件JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 满分值非法
    #[error("题目 {question} 的满分值非法: {max_marks}")]
    InvalidMaxMarks { question: String, max_marks: f64 },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl EmbeddingError {
    /// 创建 API 调用错误
    pub fn api_failed(model: impl Into<String>, source: async_openai::error::OpenAIError) -> Self {
        EmbeddingError::ApiCallFailed {
            model: model.into(),
            source,
        }
    }
}
