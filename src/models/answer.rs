use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{InputError, Result};

/// 递归的答案输入条目
///
/// 子级条目的有效大纲编号 = 父级编号 + 自身编号（父 "3" + 子 "a" → "3a"）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// 问题文本（仅用于校验定位是否正确）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// 答案文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// 子问题
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<AnswerEntry>,
}

/// 答案文件根结构
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub questions: Vec<AnswerEntry>,
}

/// 展平后的答案条目（按输入顺序）
#[derive(Debug, Clone)]
pub struct FlatAnswer {
    pub outline_id: String,
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl FlatAnswer {
    /// 是否携带答案文本
    ///
    /// 只为校验而存在的条目（如父级标题）在决策表中视同缺席
    pub fn has_answer(&self) -> bool {
        self.answer.is_some()
    }
}

/// 将嵌套的答案输入展平为按输入顺序排列的条目列表
///
/// 展平是纯前置处理，在 MutationPlanner 运行前只执行一次。
/// 编号语法在这里一次性校验：顶级为纯数字，子级为单个小写字母；
/// 重复编号保留首个并告警。
pub fn flatten_answers(input: &AnswerInput) -> Result<Vec<FlatAnswer>> {
    let top_re = Regex::new(r"^\d+$")?;
    let sub_re = Regex::new(r"^[a-z]$")?;

    let mut flat = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for entry in &input.questions {
        if !top_re.is_match(&entry.id) {
            return Err(InputError::InvalidOutlineId {
                id: entry.id.clone(),
            }
            .into());
        }
        push_unique(
            &mut flat,
            &mut seen,
            FlatAnswer {
                outline_id: entry.id.clone(),
                question: entry.question.clone(),
                answer: entry.answer.clone(),
            },
        );

        for sub in &entry.questions {
            if !sub_re.is_match(&sub.id) {
                return Err(InputError::InvalidOutlineId {
                    id: format!("{}{}", entry.id, sub.id),
                }
                .into());
            }
            if !sub.questions.is_empty() {
                return Err(InputError::NestedTooDeep {
                    id: format!("{}{}", entry.id, sub.id),
                }
                .into());
            }
            push_unique(
                &mut flat,
                &mut seen,
                FlatAnswer {
                    outline_id: format!("{}{}", entry.id, sub.id),
                    question: sub.question.clone(),
                    answer: sub.answer.clone(),
                },
            );
        }
    }

    Ok(flat)
}

fn push_unique(
    flat: &mut Vec<FlatAnswer>,
    seen: &mut std::collections::HashSet<String>,
    entry: FlatAnswer,
) {
    if seen.insert(entry.outline_id.clone()) {
        flat.push(entry);
    } else {
        warn!("⚠️ 输入中出现重复编号 {}, 只保留首个", entry.outline_id);
    }
}

// 编号既可能是字符串也可能是数字（"3" 或 3），统一转为字符串
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
