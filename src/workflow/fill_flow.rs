//! 填写流程 - 流程层
//!
//! 核心职责：定义"一个大纲编号"的完整处理流程，并严格串行地
//! 走完整轮。单个编号的状态机：
//!
//! 未开始 → 定位(无现存) → 插入 / 将插入
//! 未开始 → 定位(现存一致) → 无变化
//! 未开始 → 定位(现存不一致) → 替换 / 将替换
//! 任一定位/提交步骤出错 → error（终态，不重试）
//!
//! 绝对偏移是全文档共享的可变状态：必须一个编号完全处理完、
//! 结构重新读取之后，才能开始下一个编号。不做任何并发、预取
//! 或后台任务。

use std::collections::{HashMap, HashSet};

use tracing::{error, info, warn};

use crate::clients::DocService;
use crate::config::AnswerFormatConfig;
use crate::error::{AppError, Result};
use crate::models::{
    ActionKind, ActionRecord, DocumentStructure, FlatAnswer, QuestionKind,
};
use crate::services::{
    BatchExecutor, FillReport, InsertionResolver, MutationPlanner, Reporter, StructureReader,
};
use crate::workflow::fill_ctx::FillCtx;

/// 填写流程
///
/// - 编排整轮处理：读取 → 定位 → 决策 → 提交 → 汇总
/// - 持有格式配置（显式值）与试运行开关
/// - 文档服务只通过接口使用
pub struct FillFlow<'a, S: DocService> {
    service: &'a S,
    format: AnswerFormatConfig,
    dry_run: bool,
}

impl<'a, S: DocService> FillFlow<'a, S> {
    /// 创建新的填写流程
    pub fn new(service: &'a S, format: AnswerFormatConfig, dry_run: bool) -> Self {
        Self {
            service,
            format,
            dry_run,
        }
    }

    /// 对一份文档执行完整一轮填写
    ///
    /// 结果集合 = 文档编号 ∪ 输入编号，每个编号恰好一条记录。
    /// 读取结构失败或结构不满足大纲约束立即中止；单个编号的故障
    /// 降级为 error 记录后继续。
    pub async fn run(&self, doc_id: &str, answers: &[FlatAnswer]) -> Result<FillReport> {
        self.format.validate()?;

        // 初次读取：确定文档遍历顺序与问题分类
        let raw = self.service.fetch(doc_id).await?;
        let structure = StructureReader::read(&raw)?;
        let forest = StructureReader::outline_forest(&structure);

        let mut doc_order: Vec<(String, QuestionKind)> = Vec::new();
        for node in &forest {
            doc_order.push((node.outline_id.clone(), node.kind()));
            for child in &node.children {
                doc_order.push((child.outline_id.clone(), child.kind()));
            }
        }
        let doc_ids: HashSet<&str> = doc_order.iter().map(|(id, _)| id.as_str()).collect();

        // 输入映射（展平阶段已保证编号唯一）
        let answer_map: HashMap<&str, &FlatAnswer> = answers
            .iter()
            .map(|a| (a.outline_id.as_str(), a))
            .collect();

        let total = doc_order.len();
        info!(
            "文档内共 {} 个大纲条目, 输入共 {} 个条目{}",
            total,
            answers.len(),
            if self.dry_run { " (试运行)" } else { "" }
        );

        let mut reporter = Reporter::new();

        // 逐个编号严格串行处理；编辑落地后结构标记为过期
        let mut current = structure;
        let mut stale = false;

        for (position, (outline_id, kind)) in doc_order.iter().enumerate() {
            let ctx = FillCtx::new(doc_id, outline_id, position + 1, total);
            let entry = answer_map.get(outline_id.as_str()).copied();

            match self
                .process_item(&ctx, &mut current, &mut stale, *kind, entry)
                .await
            {
                Ok(record) => {
                    self.log_record(&ctx, &record);
                    reporter.push(record);
                }
                Err(e) if e.is_fatal() => {
                    error!("[{}] ❌ 不可恢复错误, 中止整轮处理: {}", ctx, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("[{}] ⚠️ 处理失败, 降级为 error 记录: {}", ctx, e);
                    reporter.push(ActionRecord {
                        outline_id: outline_id.clone(),
                        in_doc: true,
                        in_answers: entry.map(|a| a.has_answer()).unwrap_or(false),
                        action: ActionKind::Error,
                        secondary: Vec::new(),
                        message: Some(e.to_string()),
                        input_text: entry.and_then(|a| a.answer.clone()),
                        doc_text: None,
                    });
                }
            }
        }

        // 输入中有、文档中没有的编号，按输入顺序补到末尾
        for entry in answers {
            if !doc_ids.contains(entry.outline_id.as_str()) {
                warn!("[条目 {}] 文档中不存在该编号", entry.outline_id);
                reporter.push(ActionRecord {
                    outline_id: entry.outline_id.clone(),
                    in_doc: false,
                    in_answers: entry.has_answer(),
                    action: ActionKind::NotInDoc,
                    secondary: Vec::new(),
                    message: Some(if entry.has_answer() {
                        "文档中不存在该编号".to_string()
                    } else {
                        "文档中不存在该编号, 且输入未提供答案".to_string()
                    }),
                    input_text: entry.answer.clone(),
                    doc_text: None,
                });
            }
        }

        Ok(reporter.finish(doc_id, self.dry_run))
    }

    /// 处理单个文档内编号
    ///
    /// 刷新规则：只要上一个编号落过编辑，本编号定位前必须重新
    /// 读取结构——缓存过期偏移正是历史"结构损坏"缺陷的根因。
    async fn process_item(
        &self,
        ctx: &FillCtx,
        current: &mut DocumentStructure,
        stale: &mut bool,
        kind: QuestionKind,
        entry: Option<&FlatAnswer>,
    ) -> Result<ActionRecord> {
        if *stale {
            let raw = self.service.fetch(&ctx.doc_id).await?;
            *current = StructureReader::read(&raw)?;
            *stale = false;
        }

        let resolved = InsertionResolver::resolve(current, &ctx.outline_id)?;

        // 问题文本校验：输入给出预期文本时，定位到的段落必须包含它，
        // 否则绝不在错误的问题下写答案
        if let Some(expected) = entry.and_then(|e| e.question.as_deref()) {
            let found = &resolved.question.text;
            if !found.to_lowercase().contains(&expected.to_lowercase()) {
                return Err(AppError::question_mismatch(
                    &ctx.outline_id,
                    expected,
                    found.as_str(),
                ));
            }
        }

        let planner = MutationPlanner::new(&self.format, self.dry_run);
        let planned = planner.plan(&resolved, entry, kind);

        if !planned.operations.is_empty() {
            let executor = BatchExecutor::new(self.service, self.dry_run);
            executor
                .execute(&ctx.doc_id, &ctx.outline_id, &planned.operations)
                .await?;
            // 编辑已落地，当前结构中的所有偏移随之失效
            *stale = true;
        }

        Ok(planned.record)
    }

    fn log_record(&self, ctx: &FillCtx, record: &ActionRecord) {
        match record.action {
            ActionKind::Inserted => info!("[{}] ✓ 已插入答案", ctx),
            ActionKind::WouldInsert => info!("[{}] 将插入答案 (试运行)", ctx),
            ActionKind::Replaced => info!("[{}] ✓ 已替换答案", ctx),
            ActionKind::WouldReplace => info!("[{}] 将替换答案 (试运行)", ctx),
            ActionKind::NoChange => info!("[{}] 答案无变化", ctx),
            ActionKind::Skipped => info!("[{}] 父级标题, 跳过", ctx),
            ActionKind::MissingAnswer => warn!("[{}] ⚠️ 输入未提供答案", ctx),
            ActionKind::NotInDoc | ActionKind::Error => {}
        }
        if !record.secondary.is_empty() {
            let labels: Vec<&str> = record.secondary.iter().map(|s| s.as_str()).collect();
            info!("[{}] 附加动作: {}", ctx, labels.join(", "));
        }
    }
}
