/// 文档服务客户端
///
/// 封装所有与远程文档服务相关的调用逻辑；重试与退避属于这里，
/// 核心处理流程不做任何重试。
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{BulletInfo, EditOperation, RawParagraph};

/// 重试参数：指数退避从 1 秒起倍增，封顶 64 秒，只针对限流响应
const MAX_RETRIES: u32 = 5;
const MAX_BACKOFF_SECS: u64 = 64;

/// 文档服务错误
#[derive(Debug, Error)]
pub enum DocsError {
    /// 读取文档结构失败（整轮处理必须中止）
    #[error("读取文档结构失败 ({doc_id}): {message}")]
    FetchFailed { doc_id: String, message: String },
    /// 服务拒绝了某个条目的编辑组（该条目降级为 error，继续后续条目）
    #[error("文档服务拒绝了编辑请求 ({doc_id}): {message}")]
    ApplyRejected { doc_id: String, message: String },
    /// 响应不是预期的文档结构
    #[error("文档服务响应格式异常 ({doc_id}): {detail}")]
    MalformedResponse { doc_id: String, detail: String },
    /// 限流重试耗尽
    #[error("请求频率受限, 重试 {attempts} 次后仍失败")]
    RateLimited { attempts: u32 },
}

/// 文档服务接口
///
/// `fetch` 返回按文档顺序排列的段落描述，偏移量为全文绝对字符位置，
/// `end_index` 含段落结尾终止符；`apply` 将一组操作作为单次原子调用
/// 提交，要么全部生效要么全部不生效。
#[allow(async_fn_in_trait)]
pub trait DocService {
    async fn fetch(&self, doc_id: &str) -> Result<Vec<RawParagraph>, DocsError>;

    async fn apply(&self, doc_id: &str, operations: &[EditOperation]) -> Result<(), DocsError>;
}

/// 基于 HTTP 的文档服务客户端
pub struct HttpDocsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpDocsClient {
    /// 创建新的文档服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.docs_api_base_url.clone(),
            token: config.docs_api_token.clone(),
        }
    }

    /// 执行请求并在限流时指数退避重试
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RetryError> {
        for attempt in 0..=MAX_RETRIES {
            let response = build()
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| RetryError::Transport(e.to_string()))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RETRIES {
                    return Err(RetryError::RateLimited);
                }
                let wait_secs = (1u64 << attempt).min(MAX_BACKOFF_SECS);
                warn!(
                    "⚠️ 请求频率受限, {}秒后重试 (第 {}/{} 次)",
                    wait_secs,
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(std::time::Duration::from_secs(wait_secs)).await;
                continue;
            }

            return Ok(response);
        }
        Err(RetryError::RateLimited)
    }

    /// 从响应体中抽取服务端错误信息
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let detail = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("");
        if detail.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, detail)
        }
    }

    /// 把文档 JSON 解析为原始段落序列
    ///
    /// 非段落元素（表格、分节符）直接跳过，与大纲无关。
    fn parse_document(doc_id: &str, doc: &Value) -> Result<Vec<RawParagraph>, DocsError> {
        let content = doc
            .get("body")
            .and_then(|b| b.get("content"))
            .and_then(|c| c.as_array())
            .ok_or_else(|| DocsError::MalformedResponse {
                doc_id: doc_id.to_string(),
                detail: "缺少 body.content 数组".to_string(),
            })?;

        let mut paragraphs = Vec::new();
        for element in content {
            let Some(para) = element.get("paragraph") else {
                continue;
            };

            let start_index = element
                .get("startIndex")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize;
            let end_index = element
                .get("endIndex")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize;

            let indent_pt = para
                .get("paragraphStyle")
                .and_then(|s| s.get("indentStart"))
                .and_then(|i| i.get("magnitude"))
                .and_then(|m| m.as_f64())
                .unwrap_or(0.0);

            let bullet = para.get("bullet").map(|b| BulletInfo {
                list_id: b
                    .get("listId")
                    .and_then(|v| v.as_str())
                    .unwrap_or("default")
                    .to_string(),
                nesting_level: b
                    .get("nestingLevel")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u8,
            });

            paragraphs.push(RawParagraph {
                start_index,
                end_index,
                text: Self::paragraph_text(para),
                indent_pt,
                bullet,
            });
        }

        Ok(paragraphs)
    }

    /// 拼接段落内全部文本片段（保留结尾终止符）
    fn paragraph_text(para: &Value) -> String {
        let mut text = String::new();
        if let Some(elements) = para.get("elements").and_then(|e| e.as_array()) {
            for element in elements {
                if let Some(content) = element
                    .get("textRun")
                    .and_then(|tr| tr.get("content"))
                    .and_then(|c| c.as_str())
                {
                    text.push_str(content);
                }
            }
        }
        text
    }

    /// 把编辑操作序列化为服务端请求
    fn build_request(operation: &EditOperation) -> Value {
        match operation {
            EditOperation::InsertText { index, text } => json!({
                "insertText": {
                    "location": { "index": index },
                    "text": text
                }
            }),
            EditOperation::DeleteRange { start, end } => json!({
                "deleteContentRange": {
                    "range": { "startIndex": start, "endIndex": end }
                }
            }),
            EditOperation::SetIndent {
                start,
                end,
                indent_pt,
            } => json!({
                "updateParagraphStyle": {
                    "range": { "startIndex": start, "endIndex": end },
                    "paragraphStyle": {
                        "indentStart": { "magnitude": indent_pt, "unit": "PT" },
                        "indentFirstLine": { "magnitude": indent_pt, "unit": "PT" }
                    },
                    "fields": "indentStart,indentFirstLine"
                }
            }),
            EditOperation::StripBullets { start, end } => json!({
                "deleteParagraphBullets": {
                    "range": { "startIndex": start, "endIndex": end }
                }
            }),
            EditOperation::SetTextStyle { start, end, style } => {
                let mut text_style = json!({});
                let mut fields = Vec::new();
                if let Some((red, green, blue)) = style.color {
                    text_style["foregroundColor"] = json!({
                        "color": { "rgbColor": { "red": red, "green": green, "blue": blue } }
                    });
                    fields.push("foregroundColor");
                }
                if let Some(font) = &style.font {
                    text_style["weightedFontFamily"] = json!({ "fontFamily": font });
                    fields.push("weightedFontFamily");
                }
                if let Some(size) = style.size_pt {
                    text_style["fontSize"] = json!({ "magnitude": size, "unit": "PT" });
                    fields.push("fontSize");
                }
                json!({
                    "updateTextStyle": {
                        "range": { "startIndex": start, "endIndex": end },
                        "textStyle": text_style,
                        "fields": fields.join(",")
                    }
                })
            }
        }
    }
}

impl DocService for HttpDocsClient {
    async fn fetch(&self, doc_id: &str) -> Result<Vec<RawParagraph>, DocsError> {
        let url = format!("{}/documents/{}", self.base_url, doc_id);

        let response = self
            .send_with_retry(|| self.http.get(&url))
            .await
            .map_err(|e| e.into_fetch(doc_id))?;

        if !response.status().is_success() {
            return Err(DocsError::FetchFailed {
                doc_id: doc_id.to_string(),
                message: Self::error_message(response).await,
            });
        }

        let doc: Value = response
            .json()
            .await
            .map_err(|e| DocsError::MalformedResponse {
                doc_id: doc_id.to_string(),
                detail: e.to_string(),
            })?;

        let paragraphs = Self::parse_document(doc_id, &doc)?;
        debug!("读取到 {} 个段落", paragraphs.len());

        Ok(paragraphs)
    }

    async fn apply(&self, doc_id: &str, operations: &[EditOperation]) -> Result<(), DocsError> {
        if operations.is_empty() {
            return Ok(());
        }

        let url = format!("{}/documents/{}:batchUpdate", self.base_url, doc_id);
        let requests: Vec<Value> = operations.iter().map(Self::build_request).collect();
        let body = json!({ "requests": requests });

        debug!("提交 {} 条编辑操作", operations.len());

        let response = self
            .send_with_retry(|| self.http.post(&url).json(&body))
            .await
            .map_err(|e| e.into_apply(doc_id))?;

        if !response.status().is_success() {
            return Err(DocsError::ApplyRejected {
                doc_id: doc_id.to_string(),
                message: Self::error_message(response).await,
            });
        }

        Ok(())
    }
}

/// send_with_retry 的内部错误，由调用方映射为 fetch/apply 语义
enum RetryError {
    Transport(String),
    RateLimited,
}

impl RetryError {
    fn into_fetch(self, doc_id: &str) -> DocsError {
        match self {
            RetryError::Transport(message) => DocsError::FetchFailed {
                doc_id: doc_id.to_string(),
                message,
            },
            RetryError::RateLimited => DocsError::RateLimited {
                attempts: MAX_RETRIES,
            },
        }
    }

    fn into_apply(self, doc_id: &str) -> DocsError {
        match self {
            RetryError::Transport(message) => DocsError::ApplyRejected {
                doc_id: doc_id.to_string(),
                message,
            },
            RetryError::RateLimited => DocsError::RateLimited {
                attempts: MAX_RETRIES,
            },
        }
    }
}
