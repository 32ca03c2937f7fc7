use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 目标文档ID
    pub doc_id: String,
    /// 答案JSON文件路径
    pub answers_file: String,
    /// 答案格式配置文件路径（可选存在）
    pub format_file: String,
    /// 文档服务 API 地址
    pub docs_api_base_url: String,
    /// 文档服务访问令牌
    pub docs_api_token: String,
    /// 试运行：只计算决策，不提交任何编辑
    pub dry_run: bool,
    /// 只导出文档结构后退出（调试用）
    pub dump_structure: bool,
    /// 报告文件名前缀
    pub report_prefix: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_id: String::new(),
            answers_file: "answers.json".to_string(),
            format_file: "answer_format.toml".to_string(),
            docs_api_base_url: "https://docs.googleapis.com/v1".to_string(),
            docs_api_token: String::new(),
            dry_run: false,
            dump_structure: false,
            report_prefix: "processed".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            doc_id: std::env::var("DOC_ID").unwrap_or(default.doc_id),
            answers_file: std::env::var("ANSWERS_FILE").unwrap_or(default.answers_file),
            format_file: std::env::var("ANSWER_FORMAT_FILE").unwrap_or(default.format_file),
            docs_api_base_url: std::env::var("DOCS_API_BASE_URL").unwrap_or(default.docs_api_base_url),
            docs_api_token: std::env::var("DOCS_API_TOKEN").unwrap_or(default.docs_api_token),
            dry_run: std::env::var("DRY_RUN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dry_run),
            dump_structure: std::env::var("DUMP_STRUCTURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dump_structure),
            report_prefix: std::env::var("REPORT_PREFIX").unwrap_or(default.report_prefix),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}

/// 答案格式配置
///
/// 显式传入 MutationPlanner 的一次性配置值，不使用任何进程级可变状态。
/// 缺省字段回退到文档化的默认值：缩进开启且偏移 36pt，无显式样式，
/// 不对已有内容重新套用样式。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnswerFormatConfig {
    pub style: StyleConfig,
    pub indentation: IndentationConfig,
}

/// 答案文字样式
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// 前景色，#RRGGBB 格式
    pub color: Option<String>,
    /// 字体名称
    pub font: Option<String>,
    /// 字号（pt）
    pub size: Option<f64>,
    /// 内容未变化时是否也重新套用样式
    pub restyle_existing: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color: None,
            font: None,
            size: None,
            restyle_existing: false,
        }
    }
}

/// 答案缩进配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndentationConfig {
    /// 是否强制答案缩进
    pub enabled: bool,
    /// 相对问题段落的额外缩进（pt）
    pub offset_pt: f64,
}

impl Default for IndentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_pt: 36.0,
        }
    }
}

impl AnswerFormatConfig {
    /// 校验配置合法性
    ///
    /// 在处理任何条目之前调用；失败即中止整轮处理。
    pub fn validate(&self) -> Result<()> {
        if let Some(color) = &self.style.color {
            if parse_hex_color(color).is_none() {
                return Err(ConfigError::InvalidColor {
                    value: color.clone(),
                }
                .into());
            }
        }
        if let Some(size) = self.style.size {
            if !(size > 0.0) {
                return Err(ConfigError::InvalidSize { value: size }.into());
            }
        }
        if self.indentation.offset_pt < 0.0 {
            return Err(ConfigError::InvalidIndentOffset {
                value: self.indentation.offset_pt,
            }
            .into());
        }
        Ok(())
    }

    /// 解析后的前景色（0-1 归一化 RGB）
    ///
    /// 要求先通过 validate；非法值返回 None
    pub fn parsed_color(&self) -> Option<(f64, f64, f64)> {
        self.style.color.as_deref().and_then(parse_hex_color)
    }
}

/// 解析 #RRGGBB 颜色值为归一化 RGB 分量
fn parse_hex_color(value: &str) -> Option<(f64, f64, f64)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    ))
}
