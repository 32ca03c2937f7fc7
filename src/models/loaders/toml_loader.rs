use std::path::Path;

use tokio::fs;

use crate::config::AnswerFormatConfig;
use crate::error::{ConfigError, Result};

/// 从 TOML 文件加载答案格式配置
///
/// 文件不存在不算错误：全部字段回退到默认值（缩进开启、偏移 36pt、
/// 无显式样式）。文件存在但无法解析则中止。
pub async fn load_format_config(path: &str) -> Result<AnswerFormatConfig> {
    if !Path::new(path).exists() {
        tracing::info!("未找到格式配置文件 {}, 使用默认格式", path);
        return Ok(AnswerFormatConfig::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    let config: AnswerFormatConfig =
        toml::from_str(&content).map_err(|e| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;

    tracing::info!("已加载格式配置: {}", path);

    Ok(config)
}
