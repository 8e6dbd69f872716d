use crate::error::AnswerKeyError;
use crate::models::answer_key::AnswerKey;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载标准答案并校验满分
pub async fn load_answer_key(path: &Path) -> Result<AnswerKey, AnswerKeyError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| AnswerKeyError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

    let key = AnswerKey::from_json_str(&content).map_err(|source| AnswerKeyError::JsonParseFailed {
        path: path.display().to_string(),
        source,
    })?;

    key.validate()?;

    tracing::info!("成功加载标准答案 {} 题，满分 {}", key.len(), key.total_marks());

    Ok(key)
}
