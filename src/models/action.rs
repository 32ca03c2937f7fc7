use std::fmt;

use serde::Serialize;

/// 单个条目的主要动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// 已插入新答案
    Inserted,
    /// 试运行：将插入
    WouldInsert,
    /// 已替换现有答案
    Replaced,
    /// 试运行：将替换
    WouldReplace,
    /// 现有答案与输入一致
    NoChange,
    /// 文档中有该问题但输入未提供答案
    MissingAnswer,
    /// 父级标题，不作答
    Skipped,
    /// 输入中的编号在文档里不存在
    NotInDoc,
    /// 处理该条目时出错
    Error,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Inserted => "inserted",
            ActionKind::WouldInsert => "would_insert",
            ActionKind::Replaced => "replaced",
            ActionKind::WouldReplace => "would_replace",
            ActionKind::NoChange => "no_change",
            ActionKind::MissingAnswer => "missing_answer",
            ActionKind::Skipped => "skipped",
            ActionKind::NotInDoc => "not_in_doc",
            ActionKind::Error => "error",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 附加动作，与主要动作相互独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryAction {
    /// 修正了答案块缩进
    FixedIndentation,
    /// 套用了前景色
    AppliedColor,
    /// 套用了字体
    AppliedFont,
    /// 去除了插入段落继承的项目符号
    RemovedBullets,
}

impl SecondaryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondaryAction::FixedIndentation => "fixed_indentation",
            SecondaryAction::AppliedColor => "applied_color",
            SecondaryAction::AppliedFont => "applied_font",
            SecondaryAction::RemovedBullets => "removed_bullets",
        }
    }
}

/// 单个大纲编号的处理记录
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub outline_id: String,
    pub in_doc: bool,
    /// 输入中存在该编号且携带答案文本
    pub in_answers: bool,
    pub action: ActionKind,
    pub secondary: Vec<SecondaryAction>,
    /// 补充说明（错误原因、跳过原因等）
    pub message: Option<String>,
    /// 输入提供的答案文本（用于报告展示）
    pub input_text: Option<String>,
    /// 文档中当时的答案块文本（用于报告展示）
    pub doc_text: Option<String>,
}

impl ActionRecord {
    /// 主要动作在前、附加动作在后的完整动作列表
    pub fn actions(&self) -> Vec<&'static str> {
        let mut actions = vec![self.action.as_str()];
        actions.extend(self.secondary.iter().map(|s| s.as_str()));
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_primary_first() {
        let record = ActionRecord {
            outline_id: "1".to_string(),
            in_doc: true,
            in_answers: true,
            action: ActionKind::Inserted,
            secondary: vec![
                SecondaryAction::FixedIndentation,
                SecondaryAction::RemovedBullets,
            ],
            message: None,
            input_text: None,
            doc_text: None,
        };
        assert_eq!(
            record.actions(),
            vec!["inserted", "fixed_indentation", "removed_bullets"]
        );
    }
}
