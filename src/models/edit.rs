/// 单条编辑操作
///
/// 偏移量为绝对字符位置（Unicode 标量），且以"本条操作落地时"
/// 的文档状态为准：同一组内靠后的操作要使用前面操作生效后的坐标。
/// 只有文档服务客户端负责把它序列化成线上格式。
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// 在指定位置插入文本
    InsertText { index: usize, text: String },
    /// 删除区间 [start, end)
    DeleteRange { start: usize, end: usize },
    /// 设置区间内各段落的缩进
    SetIndent {
        start: usize,
        end: usize,
        indent_pt: f64,
    },
    /// 去除区间内各段落的项目符号
    StripBullets { start: usize, end: usize },
    /// 设置区间内的文字样式
    SetTextStyle {
        start: usize,
        end: usize,
        style: TextStylePatch,
    },
}

/// 文字样式补丁，None 字段不改动
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStylePatch {
    /// 前景色（0-1 归一化 RGB）
    pub color: Option<(f64, f64, f64)>,
    pub font: Option<String>,
    pub size_pt: Option<f64>,
}

impl TextStylePatch {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.font.is_none() && self.size_pt.is_none()
    }
}
