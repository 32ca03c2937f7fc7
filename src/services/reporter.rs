//! 结果汇总 - 业务能力层
//!
//! 把逐条目的动作记录合并为一份有序、去重的结果列表并统计各类
//! 动作数量。排序规则：文档内编号按文档遍历顺序在前，not_in_doc
//! 编号按输入顺序在后。只有 error 记录驱动非零退出状态，
//! missing_answer / skipped / not_in_doc 均为提示性信息。

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::warn;

use crate::models::{ActionKind, ActionRecord};
use crate::utils::logging::truncate_text;

/// 汇总报告
#[derive(Debug, Clone)]
pub struct FillReport {
    pub doc_id: String,
    pub dry_run: bool,
    pub results: Vec<ActionRecord>,
    pub counts: BTreeMap<&'static str, usize>,
}

impl FillReport {
    /// 是否存在应当以非零状态结束的条目
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.action == ActionKind::Error)
    }

    pub fn count(&self, action: ActionKind) -> usize {
        self.counts.get(action.as_str()).copied().unwrap_or(0)
    }

    /// 渲染为对外的 JSON 报告
    pub fn to_json(&self) -> Value {
        let results: Vec<Value> = self
            .results
            .iter()
            .map(|r| {
                let mut entry = json!({
                    "outline_id": r.outline_id,
                    "in_doc": r.in_doc,
                    "in_answers": r.in_answers,
                    "actions": r.actions(),
                });
                if let Some(message) = &r.message {
                    entry["message"] = json!(message);
                }
                entry
            })
            .collect();

        json!({
            "doc_id": self.doc_id,
            "dry_run": self.dry_run,
            "results": results,
            "counts": self.counts,
        })
    }

    /// 渲染为 Markdown 报告
    pub fn to_markdown(&self) -> String {
        let mut rows = Vec::new();
        for r in &self.results {
            let input_col = match r.input_text.as_deref() {
                Some(text) => cell(text),
                None => "—".to_string(),
            };
            let doc_col = match r.doc_text.as_deref() {
                Some(text) => cell(text),
                None => "_(空)_".to_string(),
            };
            let details = r.message.clone().unwrap_or_default();
            rows.push(format!(
                "| **{}** | {} | {} | {} | {} |",
                r.outline_id,
                input_col,
                doc_col,
                r.actions().join(", "),
                details
            ));
        }

        let summary: Vec<String> = self
            .counts
            .iter()
            .map(|(action, count)| format!("{}: {}", action, count))
            .collect();

        format!(
            "# 填写结果\n\n\
             文档: `{}`{}\n\n\
             ## 处理明细\n\n\
             | 编号 | 输入 | 文档 | 动作 | 说明 |\n\
             |------|------|------|------|------|\n\
             {}\n\n\
             ---\n\n\
             **共 {} 条** | {}\n",
            self.doc_id,
            if self.dry_run { "（试运行）" } else { "" },
            rows.join("\n"),
            self.results.len(),
            summary.join(" | ")
        )
    }
}

/// 截断过长文本并标注原始长度
fn cell(text: &str) -> String {
    let chars = text.chars().count();
    if chars > 25 {
        format!("`{}` ({})", truncate_text(text, 25), chars)
    } else if text.is_empty() {
        "_(空)_".to_string()
    } else {
        format!("`{}`", text)
    }
}

/// 结果汇总器
#[derive(Debug, Default)]
pub struct Reporter {
    records: Vec<ActionRecord>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录（调用方保证先文档顺序、后输入顺序）
    pub fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    /// 合并为最终报告
    ///
    /// 完整性约束：结果集合恰好等于"文档编号 ∪ 输入编号"，
    /// 既无重复也无遗漏；出现重复时保留首条并告警。
    pub fn finish(self, doc_id: &str, dry_run: bool) -> FillReport {
        let mut seen = std::collections::HashSet::new();
        let mut results = Vec::with_capacity(self.records.len());
        for record in self.records {
            if seen.insert(record.outline_id.clone()) {
                results.push(record);
            } else {
                warn!("⚠️ 报告中出现重复编号 {}, 只保留首条", record.outline_id);
            }
        }

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for record in &results {
            *counts.entry(record.action.as_str()).or_insert(0) += 1;
        }

        FillReport {
            doc_id: doc_id.to_string(),
            dry_run,
            results,
            counts,
        }
    }
}
