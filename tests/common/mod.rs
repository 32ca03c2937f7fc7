#![allow(dead_code)]
//! 测试用内存文档服务
//!
//! 用段落列表模拟远程文档：编辑操作会真实地移动后续段落的绝对
//! 偏移，插入的段落继承插入点所在段落的格式（缩进与项目符号），
//! 与线上服务的行为一致——索引稳定性测试依赖这一点。

use std::sync::Mutex;

use doc_answer_fill::clients::{DocService, DocsError};
use doc_answer_fill::models::{
    BulletInfo, EditOperation, RawParagraph, TextStylePatch,
};
use doc_answer_fill::models::{flatten_answers, AnswerInput, FlatAnswer};

/// 内存文档中的一个段落（text 不含结尾终止符）
#[derive(Debug, Clone)]
pub struct FakePara {
    pub text: String,
    pub indent_pt: f64,
    pub bullet: Option<BulletInfo>,
}

/// 内存文档
#[derive(Debug, Clone, Default)]
pub struct FakeDoc {
    pub paragraphs: Vec<FakePara>,
    /// 所有落地过的文字样式操作（范围 + 补丁）
    pub style_log: Vec<(usize, usize, TextStylePatch)>,
}

impl FakeDoc {
    pub fn new(paragraphs: Vec<FakePara>) -> Self {
        Self {
            paragraphs,
            style_log: Vec::new(),
        }
    }

    /// 各段落的绝对区间 [start, end)，首段从 1 开始
    fn ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges = Vec::with_capacity(self.paragraphs.len());
        let mut index = 1;
        for p in &self.paragraphs {
            let len = p.text.chars().count() + 1;
            ranges.push((index, index + len));
            index += len;
        }
        ranges
    }

    fn end_index(&self) -> usize {
        1 + self
            .paragraphs
            .iter()
            .map(|p| p.text.chars().count() + 1)
            .sum::<usize>()
    }

    /// 以服务端线格式导出段落
    pub fn fetch_raw(&self) -> Vec<RawParagraph> {
        let ranges = self.ranges();
        self.paragraphs
            .iter()
            .zip(ranges)
            .map(|(p, (start, end))| RawParagraph {
                start_index: start,
                end_index: end,
                text: format!("{}\n", p.text),
                indent_pt: p.indent_pt,
                bullet: p.bullet.clone(),
            })
            .collect()
    }

    /// 全文快照（用于字节级不变性断言）
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for p in &self.paragraphs {
            text.push_str(&p.text);
            text.push('\n');
        }
        text
    }

    /// 原子地应用一组操作：任一失败则整组不生效
    pub fn apply(&mut self, operations: &[EditOperation]) -> Result<(), String> {
        let mut staged = self.clone();
        for op in operations {
            staged.apply_one(op)?;
        }
        *self = staged;
        Ok(())
    }

    fn apply_one(&mut self, op: &EditOperation) -> Result<(), String> {
        match op {
            EditOperation::InsertText { index, text } => self.insert_text(*index, text),
            EditOperation::DeleteRange { start, end } => self.delete_range(*start, *end),
            EditOperation::SetIndent {
                start,
                end,
                indent_pt,
            } => {
                self.for_intersecting(*start, *end, |p| p.indent_pt = *indent_pt);
                Ok(())
            }
            EditOperation::StripBullets { start, end } => {
                self.for_intersecting(*start, *end, |p| p.bullet = None);
                Ok(())
            }
            EditOperation::SetTextStyle { start, end, style } => {
                self.style_log.push((*start, *end, style.clone()));
                Ok(())
            }
        }
    }

    fn insert_text(&mut self, index: usize, text: &str) -> Result<(), String> {
        if index == self.end_index() {
            // 文档末尾追加：继承最后一个段落的格式
            let attrs = self
                .paragraphs
                .last()
                .cloned()
                .ok_or_else(|| "空文档无法追加".to_string())?;
            let mut parts: Vec<&str> = text.split('\n').collect();
            let tail = parts.pop().unwrap_or("");
            for part in parts {
                self.paragraphs.push(FakePara {
                    text: part.to_string(),
                    indent_pt: attrs.indent_pt,
                    bullet: attrs.bullet.clone(),
                });
            }
            if !tail.is_empty() {
                self.paragraphs.push(FakePara {
                    text: tail.to_string(),
                    indent_pt: attrs.indent_pt,
                    bullet: attrs.bullet.clone(),
                });
            }
            return Ok(());
        }

        let ranges = self.ranges();
        let pos = ranges
            .iter()
            .position(|(s, e)| *s <= index && index < *e)
            .ok_or_else(|| format!("插入位置越界: {}", index))?;
        let para = self.paragraphs[pos].clone();
        let (start, _) = ranges[pos];
        let rel = index - start;

        // 插入点所在段落的完整内容（含终止符），新段落继承其格式
        let full: Vec<char> = para.text.chars().chain(std::iter::once('\n')).collect();
        let mut new_full = String::new();
        new_full.extend(full[..rel].iter());
        new_full.push_str(text);
        new_full.extend(full[rel..].iter());

        let mut parts: Vec<&str> = new_full.split('\n').collect();
        parts.pop(); // 结尾终止符产生的空串
        let replacement: Vec<FakePara> = parts
            .iter()
            .map(|t| FakePara {
                text: t.to_string(),
                indent_pt: para.indent_pt,
                bullet: para.bullet.clone(),
            })
            .collect();
        self.paragraphs.splice(pos..pos + 1, replacement);
        Ok(())
    }

    fn delete_range(&mut self, start: usize, end: usize) -> Result<(), String> {
        if start >= end {
            return Err(format!("非法删除区间: [{}, {})", start, end));
        }
        let ranges = self.ranges();
        let mut new_paras: Vec<FakePara> = Vec::new();
        // 终止符被删的段落，剩余文本并入下一个存活段落的开头
        let mut carry = String::new();

        for (i, para) in self.paragraphs.iter().enumerate() {
            let (s, e) = ranges[i];
            if e <= start || s >= end {
                let mut p = para.clone();
                if !carry.is_empty() {
                    p.text = std::mem::take(&mut carry) + &p.text;
                }
                new_paras.push(p);
                continue;
            }

            let full: Vec<char> = para.text.chars().chain(std::iter::once('\n')).collect();
            let kept: String = full
                .iter()
                .enumerate()
                .filter(|(j, _)| {
                    let abs = s + j;
                    abs < start || abs >= end
                })
                .map(|(_, c)| *c)
                .collect();

            if kept.is_empty() {
                continue;
            }
            if let Some(body) = kept.strip_suffix('\n') {
                let mut text = std::mem::take(&mut carry);
                text.push_str(body);
                new_paras.push(FakePara {
                    text,
                    indent_pt: para.indent_pt,
                    bullet: para.bullet.clone(),
                });
            } else {
                carry.push_str(&kept);
            }
        }

        if !carry.is_empty() {
            match new_paras.last_mut() {
                Some(last) => last.text.push_str(&carry),
                None => new_paras.push(FakePara {
                    text: carry,
                    indent_pt: 0.0,
                    bullet: None,
                }),
            }
        }

        self.paragraphs = new_paras;
        Ok(())
    }

    fn for_intersecting(&mut self, start: usize, end: usize, mut f: impl FnMut(&mut FakePara)) {
        let ranges = self.ranges();
        for (i, para) in self.paragraphs.iter_mut().enumerate() {
            let (s, e) = ranges[i];
            if s < end && start < e {
                f(para);
            }
        }
    }
}

/// 测试用文档服务
pub struct FakeDocService {
    doc: Mutex<FakeDoc>,
    fetch_count: Mutex<usize>,
    apply_count: Mutex<usize>,
    /// 前 N 次 apply 直接拒绝（模拟服务端拒绝编辑组）
    fail_applies: Mutex<usize>,
    /// 第 N 次 fetch 失败（模拟读取结构失败）
    fail_fetch_at: Mutex<Option<usize>>,
}

impl FakeDocService {
    pub fn new(doc: FakeDoc) -> Self {
        Self {
            doc: Mutex::new(doc),
            fetch_count: Mutex::new(0),
            apply_count: Mutex::new(0),
            fail_applies: Mutex::new(0),
            fail_fetch_at: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> FakeDoc {
        self.doc.lock().unwrap().clone()
    }

    pub fn full_text(&self) -> String {
        self.doc.lock().unwrap().full_text()
    }

    pub fn fetches(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }

    pub fn applies(&self) -> usize {
        *self.apply_count.lock().unwrap()
    }

    pub fn set_fail_applies(&self, n: usize) {
        *self.fail_applies.lock().unwrap() = n;
    }

    pub fn set_fail_fetch_at(&self, n: usize) {
        *self.fail_fetch_at.lock().unwrap() = Some(n);
    }
}

impl DocService for FakeDocService {
    async fn fetch(&self, doc_id: &str) -> Result<Vec<RawParagraph>, DocsError> {
        let count = {
            let mut fetch_count = self.fetch_count.lock().unwrap();
            *fetch_count += 1;
            *fetch_count
        };
        if *self.fail_fetch_at.lock().unwrap() == Some(count) {
            return Err(DocsError::FetchFailed {
                doc_id: doc_id.to_string(),
                message: "测试注入的读取失败".to_string(),
            });
        }
        Ok(self.doc.lock().unwrap().fetch_raw())
    }

    async fn apply(&self, doc_id: &str, operations: &[EditOperation]) -> Result<(), DocsError> {
        *self.apply_count.lock().unwrap() += 1;
        {
            let mut fail = self.fail_applies.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(DocsError::ApplyRejected {
                    doc_id: doc_id.to_string(),
                    message: "测试注入的拒绝".to_string(),
                });
            }
        }
        self.doc
            .lock()
            .unwrap()
            .apply(operations)
            .map_err(|message| DocsError::ApplyRejected {
                doc_id: doc_id.to_string(),
                message,
            })
    }
}

// ========== 文档与答案构造 ==========

pub const TOP_INDENT: f64 = 18.0;
pub const SUB_INDENT: f64 = 54.0;

pub fn plain(text: &str, indent_pt: f64) -> FakePara {
    FakePara {
        text: text.to_string(),
        indent_pt,
        bullet: None,
    }
}

pub fn bullet_top(text: &str) -> FakePara {
    FakePara {
        text: text.to_string(),
        indent_pt: TOP_INDENT,
        bullet: Some(BulletInfo {
            list_id: "list-1".to_string(),
            nesting_level: 0,
        }),
    }
}

pub fn bullet_sub(text: &str) -> FakePara {
    FakePara {
        text: text.to_string(),
        indent_pt: SUB_INDENT,
        bullet: Some(BulletInfo {
            list_id: "list-1".to_string(),
            nesting_level: 1,
        }),
    }
}

/// 场景文档：编号 1、2、3（父级）、3a、3b、4
pub fn scenario_doc() -> FakeDoc {
    FakeDoc::new(vec![
        plain("请逐项作答", 0.0),
        bullet_top("你的全名是什么？"),
        bullet_top("你的出生日期？"),
        bullet_top("联系方式"),
        bullet_sub("电子邮箱"),
        bullet_sub("联系电话"),
        bullet_top("备注"),
        plain("感谢填写", 0.0),
    ])
}

/// 场景答案：1、2、3a、3b 有答案，3 仅父级，4 缺席
pub fn scenario_answers() -> Vec<FlatAnswer> {
    answers_from_json(serde_json::json!({
        "questions": [
            {"id": "1", "question": "全名", "answer": "张三"},
            {"id": "2", "answer": "1990年1月1日"},
            {
                "id": "3",
                "question": "联系方式",
                "questions": [
                    {"id": "a", "answer": "zhangsan@example.com"},
                    {"id": "b", "answer": "138-0000-0000"}
                ]
            }
        ]
    }))
}

pub fn answers_from_json(value: serde_json::Value) -> Vec<FlatAnswer> {
    let input: AnswerInput = serde_json::from_value(value).expect("答案 JSON 应能解析");
    flatten_answers(&input).expect("答案应能展平")
}
