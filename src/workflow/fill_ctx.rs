//! 条目处理上下文
//!
//! 封装"我正在处理哪份文档的哪个编号"这一信息

use std::fmt::Display;

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct FillCtx {
    /// 文档ID
    pub doc_id: String,

    /// 目标大纲编号
    pub outline_id: String,

    /// 条目在本轮中的序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本轮条目总数
    pub total: usize,
}

impl FillCtx {
    /// 创建新的条目上下文
    pub fn new(doc_id: &str, outline_id: &str, position: usize, total: usize) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            outline_id: outline_id.to_string(),
            position,
            total,
        }
    }
}

impl Display for FillCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "条目 {} ({}/{})",
            self.outline_id, self.position, self.total
        )
    }
}
