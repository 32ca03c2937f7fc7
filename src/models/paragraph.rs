use serde::{Deserialize, Serialize};

/// 项目符号元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletInfo {
    /// 所属列表ID
    pub list_id: String,
    /// 嵌套层级（0 为顶级）
    pub nesting_level: u8,
}

/// 文档服务返回的原始段落描述
///
/// 偏移量为整篇文档内的绝对字符位置（按 Unicode 标量计），
/// `end_index` 包含段落的结尾终止符，`text` 同样带着终止符。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParagraph {
    pub start_index: usize,
    pub end_index: usize,
    pub text: String,
    pub indent_pt: f64,
    pub bullet: Option<BulletInfo>,
}

/// 标注了大纲编号的段落记录
///
/// 一组记录只在下一次编辑落地前有效：任何编辑都会使其中所有
/// 绝对偏移失效，绝不能跨编辑复用。
#[derive(Debug, Clone, Serialize)]
pub struct ParagraphRecord {
    pub start_index: usize,
    /// 含结尾终止符
    pub end_index: usize,
    /// 已去掉结尾终止符
    pub text: String,
    pub indent_pt: f64,
    pub bullet: Option<BulletInfo>,
    /// 仅带项目符号的段落才有大纲编号
    pub outline_id: Option<String>,
}

/// 单次读取得到的完整文档结构
///
/// 归属于发起本次读取的调用方，用完即弃。
#[derive(Debug, Clone)]
pub struct DocumentStructure {
    pub paragraphs: Vec<ParagraphRecord>,
}

impl DocumentStructure {
    /// 按大纲编号属性查找问题段落（返回段落下标和记录）
    ///
    /// 只做属性匹配，绝不按位置下标定位——位置在编辑后会漂移，
    /// 而编号在重新读取后保持稳定。
    pub fn find_by_outline_id(&self, outline_id: &str) -> Option<(usize, &ParagraphRecord)> {
        self.paragraphs
            .iter()
            .enumerate()
            .find(|(_, p)| p.outline_id.as_deref() == Some(outline_id))
    }

    /// 按文档顺序返回全部大纲编号（重复编号只保留首个）
    pub fn outline_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.paragraphs
            .iter()
            .filter_map(|p| p.outline_id.clone())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// 判断某编号是否拥有子级条目
    pub fn has_children(&self, outline_id: &str) -> bool {
        self.paragraphs
            .iter()
            .filter_map(|p| p.outline_id.as_deref())
            .any(|id| is_child_id(id, outline_id))
    }
}

/// 问题分类：由是否拥有子级派生，而非类型层级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// 父级标题（不期望直接作答）
    Parent,
    /// 叶子问题（期望作答）
    Leaf,
}

/// 大纲节点
///
/// 按文档顺序组成的两级森林；节点持有自己的段落记录，
/// 整棵树按值交给下一阶段。
#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub outline_id: String,
    pub paragraph: ParagraphRecord,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn kind(&self) -> QuestionKind {
        if self.children.is_empty() {
            QuestionKind::Leaf
        } else {
            QuestionKind::Parent
        }
    }
}

/// 判断 id 是否是 parent 的直接子编号（如 "3a" 之于 "3"）
///
/// 子编号 = 父编号（纯数字）+ 单个小写字母；注意 "12" 不是 "1" 的子级
fn is_child_id(id: &str, parent: &str) -> bool {
    id.len() == parent.len() + 1
        && id.starts_with(parent)
        && id.ends_with(|c: char| c.is_ascii_lowercase())
}
