use std::path::Path;

use tokio::fs;

use crate::error::{InputError, Result};
use crate::models::answer::AnswerInput;

/// 从 JSON 文件加载答案输入
pub async fn load_answers_file(path: &str) -> Result<AnswerInput> {
    if !Path::new(path).exists() {
        return Err(InputError::FileNotFound {
            path: path.to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| InputError::ReadFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| InputError::JsonParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    // 顶层必须是 { "questions": [...] }
    if !value.get("questions").map(|q| q.is_array()).unwrap_or(false) {
        return Err(InputError::UnrecognizedFormat.into());
    }

    let input: AnswerInput =
        serde_json::from_value(value).map_err(|e| InputError::JsonParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    tracing::info!("成功加载 {} 个顶级问题", input.questions.len());

    Ok(input)
}
