use std::fmt;

use crate::clients::DocsError;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文档服务错误
    Docs(DocsError),
    /// 文档结构错误
    Structure(StructureError),
    /// 输入数据错误
    Input(InputError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Docs(e) => write!(f, "文档服务错误: {}", e),
            AppError::Structure(e) => write!(f, "结构错误: {}", e),
            AppError::Input(e) => write!(f, "输入错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Docs(e) => Some(e),
            AppError::Structure(e) => Some(e),
            AppError::Input(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 文档结构错误
///
/// 解析段落大纲时发现文档不满足两级大纲约束，或目标编号无法定位
#[derive(Debug)]
pub enum StructureError {
    /// 大纲嵌套超过两级
    NestingTooDeep {
        list_id: String,
        nesting_level: u8,
    },
    /// 单个父级下的子项超过 26 个，无法用单个小写字母表示
    SubItemOverflow {
        parent_id: String,
        count: usize,
    },
    /// 子级项目之前没有出现过同列表的顶级项目
    OrphanSubItem {
        list_id: String,
        start_index: usize,
    },
    /// 文档中找不到目标大纲编号
    OutlineNotFound {
        outline_id: String,
    },
    /// 问题文本与输入中的预期文本不符
    QuestionTextMismatch {
        outline_id: String,
        expected: String,
        found: String,
    },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::NestingTooDeep {
                list_id,
                nesting_level,
            } => {
                write!(
                    f,
                    "大纲嵌套层级过深 (列表: {}, 层级: {}), 仅支持两级大纲",
                    list_id, nesting_level
                )
            }
            StructureError::SubItemOverflow { parent_id, count } => {
                write!(
                    f,
                    "父级 {} 下出现第 {} 个子项, 单级最多支持 26 个子项",
                    parent_id, count
                )
            }
            StructureError::OrphanSubItem {
                list_id,
                start_index,
            } => {
                write!(
                    f,
                    "子级项目缺少上级编号 (列表: {}, 起始偏移: {})",
                    list_id, start_index
                )
            }
            StructureError::OutlineNotFound { outline_id } => {
                write!(f, "文档中未找到大纲编号: {}", outline_id)
            }
            StructureError::QuestionTextMismatch {
                outline_id,
                expected,
                found,
            } => {
                write!(
                    f,
                    "问题文本校验失败 (编号: {}): 预期包含 '{}', 实际为 '{}'",
                    outline_id, expected, found
                )
            }
        }
    }
}

impl std::error::Error for StructureError {}

/// 输入数据错误
#[derive(Debug)]
pub enum InputError {
    /// 文档ID为空
    EmptyDocId,
    /// 答案文件格式无法识别
    UnrecognizedFormat,
    /// 大纲编号不符合语法（顶级为数字，子级为单个小写字母）
    InvalidOutlineId {
        id: String,
    },
    /// 答案嵌套超过两级
    NestedTooDeep {
        id: String,
    },
    /// 文件不存在
    FileNotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::EmptyDocId => write!(f, "文档ID不能为空"),
            InputError::UnrecognizedFormat => {
                write!(f, "无法识别的答案文件格式: 缺少 questions 数组")
            }
            InputError::InvalidOutlineId { id } => {
                write!(f, "无效的大纲编号: '{}'", id)
            }
            InputError::NestedTooDeep { id } => {
                write!(f, "答案条目嵌套层级过深 (编号: {}), 仅支持两级", id)
            }
            InputError::FileNotFound { path } => write!(f, "文件不存在: {}", path),
            InputError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            InputError::JsonParseFailed { path, source } => {
                write!(f, "JSON解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::ReadFailed { source, .. } | InputError::JsonParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 颜色值不是 #RRGGBB 格式
    InvalidColor {
        value: String,
    },
    /// 字号必须为正数
    InvalidSize {
        value: f64,
    },
    /// 缩进偏移量不能为负
    InvalidIndentOffset {
        value: f64,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidColor { value } => {
                write!(f, "无效的颜色值 '{}', 需要 #RRGGBB 格式", value)
            }
            ConfigError::InvalidSize { value } => write!(f, "无效的字号: {}", value),
            ConfigError::InvalidIndentOffset { value } => {
                write!(f, "无效的缩进偏移量: {}", value)
            }
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<DocsError> for AppError {
    fn from(err: DocsError) -> Self {
        AppError::Docs(err)
    }
}

impl From<StructureError> for AppError {
    fn from(err: StructureError) -> Self {
        AppError::Structure(err)
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Input(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Input(InputError::JsonParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Input(InputError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(format!("正则表达式错误: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建大纲未找到错误
    pub fn outline_not_found(outline_id: impl Into<String>) -> Self {
        AppError::Structure(StructureError::OutlineNotFound {
            outline_id: outline_id.into(),
        })
    }

    /// 创建问题文本校验失败错误
    pub fn question_mismatch(
        outline_id: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        AppError::Structure(StructureError::QuestionTextMismatch {
            outline_id: outline_id.into(),
            expected: expected.into(),
            found: found.into(),
        })
    }

    /// 判断该错误是否必须中止整轮处理
    ///
    /// 读取结构失败、结构不满足大纲约束、配置或输入非法时，后续条目
    /// 无法安全处理；单个条目的提交被拒绝或定位失败则可以降级为
    /// error 记录后继续。
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Docs(DocsError::FetchFailed { .. })
            | AppError::Docs(DocsError::RateLimited { .. }) => true,
            AppError::Docs(_) => false,
            AppError::Structure(StructureError::NestingTooDeep { .. })
            | AppError::Structure(StructureError::SubItemOverflow { .. })
            | AppError::Structure(StructureError::OrphanSubItem { .. }) => true,
            AppError::Structure(_) => false,
            AppError::Input(_) | AppError::Config(_) => true,
            AppError::Other(_) => false,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type Result<T> = std::result::Result<T, AppError>;
