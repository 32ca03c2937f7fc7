//! 决策与操作编排 - 业务能力层
//!
//! 把"该编号在文档与输入中的状态"折算成唯一的主要动作，并构造
//! 该条目的原子操作组。决策表：
//!
//! | 文档 | 输入 | 现存块 vs 预期 | 主要动作 |
//! |------|------|----------------|----------|
//! | 有   | 有   | 无现存块       | inserted / would_insert |
//! | 有   | 有   | 一致           | no_change |
//! | 有   | 有   | 不一致         | replaced / would_replace |
//! | 有   | 无   | 叶子           | missing_answer |
//! | 有   | 无   | 有子级         | skipped |
//! | 无   | 有   | —              | not_in_doc（由流程层生成） |
//!
//! 文本比较只去掉段落终止符，不做任何其他空白归一化。
//! 试运行下所有决策照常计算，但操作组恒为空。

use crate::config::AnswerFormatConfig;
use crate::models::{
    ActionKind, ActionRecord, EditOperation, FlatAnswer, QuestionKind, SecondaryAction,
    TextStylePatch,
};
use crate::services::insertion_resolver::{ResolvedQuestion, Resolution};

/// 规划结果：动作记录 + 该条目的原子操作组
#[derive(Debug, Clone)]
pub struct PlannedMutation {
    pub record: ActionRecord,
    pub operations: Vec<EditOperation>,
}

/// 决策规划器
///
/// 格式配置是构造时一次性传入的显式值，没有任何进程级状态。
pub struct MutationPlanner<'a> {
    format: &'a AnswerFormatConfig,
    dry_run: bool,
}

impl<'a> MutationPlanner<'a> {
    pub fn new(format: &'a AnswerFormatConfig, dry_run: bool) -> Self {
        Self { format, dry_run }
    }

    /// 为一个文档内编号做出决策
    pub fn plan(
        &self,
        resolved: &ResolvedQuestion,
        entry: Option<&FlatAnswer>,
        kind: QuestionKind,
    ) -> PlannedMutation {
        match entry.and_then(|e| e.answer.as_deref()) {
            Some(answer) => self.plan_with_answer(resolved, answer),
            None => self.plan_without_answer(resolved, kind),
        }
    }

    /// 输入带答案：插入 / 替换 / 无变化
    fn plan_with_answer(&self, resolved: &ResolvedQuestion, answer: &str) -> PlannedMutation {
        // 只去掉一个结尾终止符
        let expected = answer.strip_suffix('\n').unwrap_or(answer);
        let question = &resolved.question;
        let target_indent = question.indent_pt + self.format.indentation.offset_pt;

        match &resolved.resolution {
            Resolution::NoExistingAnswer {
                insert_at,
                inherited_indent_pt,
                inherits_bullet,
            } => {
                let (operations, secondary) = self.insert_group(
                    *insert_at,
                    expected,
                    target_indent,
                    *inherited_indent_pt,
                    *inherits_bullet,
                );
                PlannedMutation {
                    record: self.record(
                        question,
                        true,
                        if self.dry_run {
                            ActionKind::WouldInsert
                        } else {
                            ActionKind::Inserted
                        },
                        secondary,
                        None,
                        Some(expected.to_string()),
                        None,
                    ),
                    operations,
                }
            }
            Resolution::ExistingAnswer {
                start,
                end,
                text,
                indents,
                reinsert_inherits_bullet,
                ..
            } => {
                if text == expected {
                    let (operations, secondary) =
                        self.no_change_group(*start, *end, indents, target_indent);
                    PlannedMutation {
                        record: self.record(
                            question,
                            true,
                            ActionKind::NoChange,
                            secondary,
                            None,
                            Some(expected.to_string()),
                            Some(text.clone()),
                        ),
                        operations,
                    }
                } else {
                    let (operations, secondary) = self.replace_group(
                        *start,
                        *end,
                        expected,
                        target_indent,
                        indents,
                        *reinsert_inherits_bullet,
                    );
                    PlannedMutation {
                        record: self.record(
                            question,
                            true,
                            if self.dry_run {
                                ActionKind::WouldReplace
                            } else {
                                ActionKind::Replaced
                            },
                            secondary,
                            None,
                            Some(expected.to_string()),
                            Some(text.clone()),
                        ),
                        operations,
                    }
                }
            }
        }
    }

    /// 输入无答案：父级跳过，叶子记缺答案
    fn plan_without_answer(
        &self,
        resolved: &ResolvedQuestion,
        kind: QuestionKind,
    ) -> PlannedMutation {
        let doc_text = match &resolved.resolution {
            Resolution::ExistingAnswer { text, .. } => Some(text.clone()),
            Resolution::NoExistingAnswer { .. } => None,
        };
        let (action, message) = match kind {
            QuestionKind::Parent => (ActionKind::Skipped, "父级标题, 不作答"),
            QuestionKind::Leaf => (ActionKind::MissingAnswer, "输入未提供该问题的答案"),
        };
        PlannedMutation {
            record: self.record(
                &resolved.question,
                false,
                action,
                Vec::new(),
                Some(message.to_string()),
                None,
                doc_text,
            ),
            operations: Vec::new(),
        }
    }

    // ========== 操作组构造 ==========

    /// 插入组：插入文本 → 去项目符号 → 设缩进 → 套样式
    ///
    /// 组内靠后的操作使用插入生效后的坐标（[index, index+len)）。
    fn insert_group(
        &self,
        insert_at: usize,
        expected: &str,
        target_indent: f64,
        inherited_indent: f64,
        inherits_bullet: bool,
    ) -> (Vec<EditOperation>, Vec<SecondaryAction>) {
        let text = format!("{}\n", expected);
        let len = text.chars().count();
        let (start, end) = (insert_at, insert_at + len);

        let mut secondary = Vec::new();
        if inherits_bullet {
            secondary.push(SecondaryAction::RemovedBullets);
        }
        if self.format.indentation.enabled && !indent_eq(inherited_indent, target_indent) {
            secondary.push(SecondaryAction::FixedIndentation);
        }
        let patch = self.style_patch();
        self.push_style_secondaries(&mut secondary, &patch);

        if self.dry_run {
            return (Vec::new(), secondary);
        }

        let mut operations = vec![
            EditOperation::InsertText {
                index: insert_at,
                text,
            },
            // 新段落会继承插入点的格式，无条件去一次项目符号
            EditOperation::StripBullets { start, end },
        ];
        if self.format.indentation.enabled {
            operations.push(EditOperation::SetIndent {
                start,
                end,
                indent_pt: target_indent,
            });
        }
        if !patch.is_empty() {
            operations.push(EditOperation::SetTextStyle {
                start,
                end,
                style: patch,
            });
        }
        (operations, secondary)
    }

    /// 替换组：删除旧块 → 在原起点插入 → 去项目符号 → 设缩进 → 套样式
    fn replace_group(
        &self,
        start: usize,
        end: usize,
        expected: &str,
        target_indent: f64,
        old_indents: &[f64],
        reinsert_inherits_bullet: bool,
    ) -> (Vec<EditOperation>, Vec<SecondaryAction>) {
        let text = format!("{}\n", expected);
        let len = text.chars().count();
        let new_end = start + len;

        let mut secondary = Vec::new();
        if reinsert_inherits_bullet {
            secondary.push(SecondaryAction::RemovedBullets);
        }
        if self.format.indentation.enabled
            && old_indents.iter().any(|i| !indent_eq(*i, target_indent))
        {
            secondary.push(SecondaryAction::FixedIndentation);
        }
        let patch = self.style_patch();
        self.push_style_secondaries(&mut secondary, &patch);

        if self.dry_run {
            return (Vec::new(), secondary);
        }

        let mut operations = vec![
            EditOperation::DeleteRange { start, end },
            EditOperation::InsertText {
                index: start,
                text,
            },
            EditOperation::StripBullets {
                start,
                end: new_end,
            },
        ];
        if self.format.indentation.enabled {
            operations.push(EditOperation::SetIndent {
                start,
                end: new_end,
                indent_pt: target_indent,
            });
        }
        if !patch.is_empty() {
            operations.push(EditOperation::SetTextStyle {
                start,
                end: new_end,
                style: patch,
            });
        }
        (operations, secondary)
    }

    /// 无变化组：内容一致也要保证结构正确（缩进修正），
    /// 以及按需对已有内容重新套样式
    fn no_change_group(
        &self,
        start: usize,
        end: usize,
        indents: &[f64],
        target_indent: f64,
    ) -> (Vec<EditOperation>, Vec<SecondaryAction>) {
        let mut secondary = Vec::new();
        let mut operations = Vec::new();

        if self.format.indentation.enabled
            && indents.iter().any(|i| !indent_eq(*i, target_indent))
        {
            secondary.push(SecondaryAction::FixedIndentation);
            if !self.dry_run {
                operations.push(EditOperation::SetIndent {
                    start,
                    end,
                    indent_pt: target_indent,
                });
            }
        }

        if self.format.style.restyle_existing {
            let patch = self.style_patch();
            if !patch.is_empty() {
                self.push_style_secondaries(&mut secondary, &patch);
                if !self.dry_run {
                    operations.push(EditOperation::SetTextStyle {
                        start,
                        end,
                        style: patch,
                    });
                }
            }
        }

        (operations, secondary)
    }

    fn style_patch(&self) -> TextStylePatch {
        TextStylePatch {
            color: self.format.parsed_color(),
            font: self.format.style.font.clone(),
            size_pt: self.format.style.size,
        }
    }

    fn push_style_secondaries(
        &self,
        secondary: &mut Vec<SecondaryAction>,
        patch: &TextStylePatch,
    ) {
        if patch.color.is_some() {
            secondary.push(SecondaryAction::AppliedColor);
        }
        if patch.font.is_some() {
            secondary.push(SecondaryAction::AppliedFont);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        question: &crate::models::ParagraphRecord,
        in_answers: bool,
        action: ActionKind,
        secondary: Vec<SecondaryAction>,
        message: Option<String>,
        input_text: Option<String>,
        doc_text: Option<String>,
    ) -> ActionRecord {
        ActionRecord {
            outline_id: question.outline_id.clone().unwrap_or_default(),
            in_doc: true,
            in_answers,
            action,
            secondary,
            message,
            input_text,
            doc_text,
        }
    }
}

/// 缩进比较（pt 浮点值，容差 0.01）
fn indent_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}
