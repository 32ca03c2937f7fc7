//! 插入点解析 - 业务能力层
//!
//! 在一份刚刚读取的文档结构里定位目标问题段落，并探测紧随其后的
//! 现存答案块。所有判断只依赖绝对偏移和大纲编号属性，绝不使用
//! 会随编辑漂移的位置下标。

use crate::error::{AppError, Result};
use crate::models::{DocumentStructure, ParagraphRecord};

/// 现存答案探测结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 问题后没有现存答案块
    NoExistingAnswer {
        /// 新答案的插入位置（问题段落的 end_index；问题是最后一段时即文档末尾）
        insert_at: usize,
        /// 在该位置插入的新段落会继承的缩进
        inherited_indent_pt: f64,
        /// 在该位置插入的新段落是否会继承项目符号
        inherits_bullet: bool,
    },
    /// 找到现存答案块 [start, end)
    ExistingAnswer {
        start: usize,
        end: usize,
        /// 块内各段文本按换行拼接（不含各段终止符）
        text: String,
        /// 块内各段的缩进
        indents: Vec<f64>,
        /// 删除整块后在 start 处重新插入时会继承的缩进
        reinsert_indent_pt: f64,
        /// 删除整块后在 start 处重新插入时是否会继承项目符号
        reinsert_inherits_bullet: bool,
    },
}

/// 问题定位结果：问题段落 + 现存答案探测
#[derive(Debug, Clone)]
pub struct ResolvedQuestion {
    pub question: ParagraphRecord,
    pub resolution: Resolution,
}

/// 插入点解析器
pub struct InsertionResolver;

impl InsertionResolver {
    /// 在给定结构中定位目标编号的问题与现存答案
    ///
    /// 现存答案块 = 从问题的 end_index 起，连续满足
    /// "没有大纲编号且缩进严格大于问题缩进"的段落；遇到第一个带编号
    /// 或缩进不大于问题的段落即停止。块可以跨多个段落，也可以为空。
    pub fn resolve(structure: &DocumentStructure, outline_id: &str) -> Result<ResolvedQuestion> {
        let (q_idx, question) = structure
            .find_by_outline_id(outline_id)
            .ok_or_else(|| AppError::outline_not_found(outline_id))?;

        let mut block: Vec<&ParagraphRecord> = Vec::new();
        let mut stop_idx = None;
        for (idx, para) in structure.paragraphs.iter().enumerate().skip(q_idx + 1) {
            let qualifies = para.outline_id.is_none() && para.indent_pt > question.indent_pt;
            if qualifies {
                block.push(para);
            } else {
                stop_idx = Some(idx);
                break;
            }
        }

        let resolution = if block.is_empty() {
            // 继承来源：插入位置所在的段落；问题是最后一段时为问题自身
            let (indent, bullet) = match stop_idx.and_then(|i| structure.paragraphs.get(i)) {
                Some(next) => (next.indent_pt, next.bullet.is_some()),
                None => (question.indent_pt, question.bullet.is_some()),
            };
            Resolution::NoExistingAnswer {
                insert_at: question.end_index,
                inherited_indent_pt: indent,
                inherits_bullet: bullet,
            }
        } else {
            let start = block[0].start_index;
            let end = block[block.len() - 1].end_index;
            let text = block
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let indents = block.iter().map(|p| p.indent_pt).collect();
            // 整块删除后，start 处的继承来源是块后的第一个段落；
            // 块一直到文档末尾时回落到问题自身
            let (reinsert_indent, reinsert_bullet) =
                match stop_idx.and_then(|i| structure.paragraphs.get(i)) {
                    Some(next) => (next.indent_pt, next.bullet.is_some()),
                    None => (question.indent_pt, question.bullet.is_some()),
                };
            Resolution::ExistingAnswer {
                start,
                end,
                text,
                indents,
                reinsert_indent_pt: reinsert_indent,
                reinsert_inherits_bullet: reinsert_bullet,
            }
        };

        Ok(ResolvedQuestion {
            question: question.clone(),
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BulletInfo;

    struct ParaDef {
        text: &'static str,
        indent: f64,
        bullet: Option<&'static str>,
    }

    fn build(defs: &[ParaDef]) -> DocumentStructure {
        let mut paragraphs = Vec::new();
        let mut index = 1;
        for def in defs {
            let len = def.text.chars().count() + 1;
            paragraphs.push(ParagraphRecord {
                start_index: index,
                end_index: index + len,
                text: def.text.to_string(),
                indent_pt: def.indent,
                bullet: def.bullet.map(|_| BulletInfo {
                    list_id: "list-1".to_string(),
                    nesting_level: 0,
                }),
                outline_id: def.bullet.map(|id| id.to_string()),
            });
            index += len;
        }
        DocumentStructure { paragraphs }
    }

    #[test]
    fn test_no_existing_answer_before_next_bullet() {
        let structure = build(&[
            ParaDef { text: "问题一", indent: 18.0, bullet: Some("1") },
            ParaDef { text: "问题二", indent: 18.0, bullet: Some("2") },
        ]);
        let resolved = InsertionResolver::resolve(&structure, "1").expect("应能定位");
        match resolved.resolution {
            Resolution::NoExistingAnswer {
                insert_at,
                inherits_bullet,
                ..
            } => {
                assert_eq!(insert_at, resolved.question.end_index);
                assert!(inherits_bullet);
            }
            other => panic!("预期无现存答案, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_existing_answer_spans_multiple_paragraphs() {
        let structure = build(&[
            ParaDef { text: "问题一", indent: 18.0, bullet: Some("1") },
            ParaDef { text: "答案第一段", indent: 54.0, bullet: None },
            ParaDef { text: "答案第二段", indent: 54.0, bullet: None },
            ParaDef { text: "问题二", indent: 18.0, bullet: Some("2") },
        ]);
        let resolved = InsertionResolver::resolve(&structure, "1").expect("应能定位");
        match resolved.resolution {
            Resolution::ExistingAnswer {
                start,
                end,
                text,
                indents,
                ..
            } => {
                assert_eq!(start, structure.paragraphs[1].start_index);
                assert_eq!(end, structure.paragraphs[2].end_index);
                assert_eq!(text, "答案第一段\n答案第二段");
                assert_eq!(indents, vec![54.0, 54.0]);
            }
            other => panic!("预期现存答案, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_scan_stops_at_dedented_paragraph() {
        // 结语缩进不大于问题，不属于答案块
        let structure = build(&[
            ParaDef { text: "问题一", indent: 18.0, bullet: Some("1") },
            ParaDef { text: "结语", indent: 0.0, bullet: None },
        ]);
        let resolved = InsertionResolver::resolve(&structure, "1").expect("应能定位");
        match resolved.resolution {
            Resolution::NoExistingAnswer {
                inherits_bullet, ..
            } => assert!(!inherits_bullet),
            other => panic!("预期无现存答案, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_question_as_last_paragraph_inserts_at_document_end() {
        let structure = build(&[
            ParaDef { text: "问题一", indent: 18.0, bullet: Some("1") },
        ]);
        let resolved = InsertionResolver::resolve(&structure, "1").expect("应能定位");
        match resolved.resolution {
            Resolution::NoExistingAnswer {
                insert_at,
                inherits_bullet,
                ..
            } => {
                assert_eq!(insert_at, structure.paragraphs[0].end_index);
                // 文档末尾插入时继承问题自身的项目符号
                assert!(inherits_bullet);
            }
            other => panic!("预期无现存答案, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_unknown_outline_id_is_error() {
        let structure = build(&[
            ParaDef { text: "问题一", indent: 18.0, bullet: Some("1") },
        ]);
        assert!(InsertionResolver::resolve(&structure, "9").is_err());
    }
}
