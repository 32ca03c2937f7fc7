//! 结构读取 - 业务能力层
//!
//! 把文档服务返回的原始段落转换成带大纲编号的有序结构。
//!
//! ## 最重要的正确性约束
//!
//! 本模块的输出必须"现读现用"：每次编辑落地后，任何后续条目在
//! 定位插入点或校验状态之前都要重新读取，**绝不能缓存**。历史上的
//! "首次插入后结构损坏"缺陷正是缓存了过期的位置信息导致的。

use std::collections::HashMap;

use tracing::warn;

use crate::error::{Result, StructureError};
use crate::models::{DocumentStructure, OutlineNode, ParagraphRecord, RawParagraph};

/// 结构读取器
pub struct StructureReader;

impl StructureReader {
    /// 把原始段落序列转换为带大纲编号的文档结构
    ///
    /// 编号规则：按文档顺序扫描，每个 (列表, 层级) 维护一个计数器；
    /// 顶级项目用数字（1、2、…），二级项目用父编号加单个小写字母
    /// （3a、3b、…），进入新的顶级项目时重置该列表的下级计数器。
    /// 超过两级、子项超过 26 个或子级缺少父级都会立刻报错，
    /// 绝不静默编出错误的编号。
    ///
    /// 非项目符号段落原样保留（不带编号）——它们可能是已有的答案文本。
    pub fn read(raw: &[RawParagraph]) -> Result<DocumentStructure> {
        // (list_id, nesting_level) -> 当前序号
        let mut counters: HashMap<(String, u8), usize> = HashMap::new();
        // list_id -> 最近一个顶级编号
        let mut last_top: HashMap<String, String> = HashMap::new();
        let mut seen = std::collections::HashSet::new();

        let mut paragraphs = Vec::with_capacity(raw.len());

        for para in raw {
            let text = para
                .text
                .strip_suffix('\n')
                .unwrap_or(&para.text)
                .to_string();

            let outline_id = match &para.bullet {
                None => None,
                Some(bullet) => {
                    let id = match bullet.nesting_level {
                        0 => {
                            let count = {
                                let counter = counters
                                    .entry((bullet.list_id.clone(), 0))
                                    .or_insert(0);
                                *counter += 1;
                                *counter
                            };
                            // 新的顶级项目：重置本列表的下级计数
                            counters.remove(&(bullet.list_id.clone(), 1));
                            let id = count.to_string();
                            last_top.insert(bullet.list_id.clone(), id.clone());
                            id
                        }
                        1 => {
                            let parent = last_top.get(&bullet.list_id).ok_or_else(|| {
                                StructureError::OrphanSubItem {
                                    list_id: bullet.list_id.clone(),
                                    start_index: para.start_index,
                                }
                            })?;
                            let count = {
                                let counter = counters
                                    .entry((bullet.list_id.clone(), 1))
                                    .or_insert(0);
                                *counter += 1;
                                *counter
                            };
                            if count > 26 {
                                return Err(StructureError::SubItemOverflow {
                                    parent_id: parent.clone(),
                                    count,
                                }
                                .into());
                            }
                            let letter = (b'a' + (count as u8) - 1) as char;
                            format!("{}{}", parent, letter)
                        }
                        level => {
                            return Err(StructureError::NestingTooDeep {
                                list_id: bullet.list_id.clone(),
                                nesting_level: level,
                            }
                            .into());
                        }
                    };

                    if !seen.insert(id.clone()) {
                        warn!("⚠️ 文档中出现重复大纲编号 {}, 定位时只取首个", id);
                    }
                    Some(id)
                }
            };

            paragraphs.push(ParagraphRecord {
                start_index: para.start_index,
                end_index: para.end_index,
                text,
                indent_pt: para.indent_pt,
                bullet: para.bullet.clone(),
                outline_id,
            });
        }

        Ok(DocumentStructure { paragraphs })
    }

    /// 把文档结构整理为两级大纲森林（按文档顺序）
    ///
    /// 子节点按编号语法挂到最近的对应父节点下；问题是父级还是叶子
    /// 由节点有无子级派生。
    pub fn outline_forest(structure: &DocumentStructure) -> Vec<OutlineNode> {
        let mut forest: Vec<OutlineNode> = Vec::new();

        for para in &structure.paragraphs {
            let Some(id) = &para.outline_id else {
                continue;
            };

            let node = OutlineNode {
                outline_id: id.clone(),
                paragraph: para.clone(),
                children: Vec::new(),
            };

            if id.chars().all(|c| c.is_ascii_digit()) {
                forest.push(node);
            } else {
                let parent_id = &id[..id.len() - 1];
                // 读取阶段保证了子级必有父级；找不到时挂到末尾兜底
                match forest
                    .iter_mut()
                    .rev()
                    .find(|n| n.outline_id == parent_id)
                {
                    Some(parent) => parent.children.push(node),
                    None => forest.push(node),
                }
            }
        }

        forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BulletInfo, QuestionKind};

    fn bullet_para(start: usize, text: &str, level: u8) -> RawParagraph {
        RawParagraph {
            start_index: start,
            end_index: start + text.chars().count() + 1,
            text: format!("{}\n", text),
            indent_pt: f64::from(level) * 36.0 + 18.0,
            bullet: Some(BulletInfo {
                list_id: "list-1".to_string(),
                nesting_level: level,
            }),
        }
    }

    fn plain_para(start: usize, text: &str) -> RawParagraph {
        RawParagraph {
            start_index: start,
            end_index: start + text.chars().count() + 1,
            text: format!("{}\n", text),
            indent_pt: 0.0,
            bullet: None,
        }
    }

    #[test]
    fn test_outline_id_assignment() {
        let raw = vec![
            plain_para(1, "说明"),
            bullet_para(4, "问题一", 0),
            bullet_para(9, "问题二", 0),
            bullet_para(14, "联系方式", 0),
            bullet_para(20, "邮箱", 1),
            bullet_para(24, "电话", 1),
            bullet_para(28, "问题四", 0),
        ];
        let structure = StructureReader::read(&raw).expect("应能读取");
        let ids = structure.outline_ids();
        assert_eq!(ids, vec!["1", "2", "3", "3a", "3b", "4"]);
        // 非项目符号段落保留且不带编号
        assert!(structure.paragraphs[0].outline_id.is_none());
        assert_eq!(structure.paragraphs[0].text, "说明");
    }

    #[test]
    fn test_sub_counter_resets_per_top_item() {
        let raw = vec![
            bullet_para(1, "一", 0),
            bullet_para(5, "一甲", 1),
            bullet_para(10, "二", 0),
            bullet_para(14, "二甲", 1),
            bullet_para(19, "二乙", 1),
        ];
        let structure = StructureReader::read(&raw).expect("应能读取");
        assert_eq!(structure.outline_ids(), vec!["1", "1a", "2", "2a", "2b"]);
    }

    #[test]
    fn test_separate_lists_have_separate_counters() {
        let mut raw = vec![bullet_para(1, "一", 0), bullet_para(5, "二", 0)];
        raw.push(RawParagraph {
            bullet: Some(BulletInfo {
                list_id: "list-2".to_string(),
                nesting_level: 0,
            }),
            ..bullet_para(9, "另一列表", 0)
        });
        let structure = StructureReader::read(&raw).expect("应能读取");
        // 两个列表都会产出 "1"，定位时取首个
        assert_eq!(structure.outline_ids(), vec!["1", "2"]);
    }

    #[test]
    fn test_nesting_too_deep_fails_loudly() {
        let raw = vec![
            bullet_para(1, "一", 0),
            bullet_para(5, "一甲", 1),
            bullet_para(10, "过深", 2),
        ];
        assert!(StructureReader::read(&raw).is_err());
    }

    #[test]
    fn test_orphan_sub_item_fails_loudly() {
        let raw = vec![bullet_para(1, "无父级", 1)];
        assert!(StructureReader::read(&raw).is_err());
    }

    #[test]
    fn test_sub_item_overflow_fails_loudly() {
        let mut raw = vec![bullet_para(1, "一", 0)];
        let mut start = 5;
        for i in 0..27 {
            raw.push(bullet_para(start, &format!("子项{}", i), 1));
            start += 10;
        }
        assert!(StructureReader::read(&raw).is_err());
    }

    #[test]
    fn test_outline_forest_classification() {
        let raw = vec![
            bullet_para(1, "问题一", 0),
            bullet_para(6, "联系方式", 0),
            bullet_para(12, "邮箱", 1),
            bullet_para(16, "电话", 1),
        ];
        let structure = StructureReader::read(&raw).expect("应能读取");
        let forest = StructureReader::outline_forest(&structure);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].kind(), QuestionKind::Leaf);
        assert_eq!(forest[1].kind(), QuestionKind::Parent);
        let children: Vec<&str> = forest[1]
            .children
            .iter()
            .map(|c| c.outline_id.as_str())
            .collect();
        assert_eq!(children, vec!["2a", "2b"]);
    }
}
