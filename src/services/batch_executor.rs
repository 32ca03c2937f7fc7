//! 原子提交 - 业务能力层
//!
//! 一个条目的全部操作作为单次调用提交：要么整组生效，要么整组
//! 不生效，被拒绝时不得假定发生过任何部分修改。条目之间由流程层
//! 重新读取结构，因此偏移量只需在单个条目的编辑内有效。

use tracing::{debug, info};

use crate::clients::{DocService, DocsError};
use crate::models::EditOperation;

/// 原子提交执行器
pub struct BatchExecutor<'a, S: DocService> {
    service: &'a S,
    dry_run: bool,
}

impl<'a, S: DocService> BatchExecutor<'a, S> {
    pub fn new(service: &'a S, dry_run: bool) -> Self {
        Self { service, dry_run }
    }

    /// 提交一个条目的原子操作组
    ///
    /// 试运行下不发起任何远程调用。
    pub async fn execute(
        &self,
        doc_id: &str,
        outline_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), DocsError> {
        if operations.is_empty() {
            return Ok(());
        }
        if self.dry_run {
            debug!("[条目 {}] 试运行: 跳过 {} 条操作", outline_id, operations.len());
            return Ok(());
        }

        info!(
            "[条目 {}] 📤 提交 {} 条操作",
            outline_id,
            operations.len()
        );
        self.service.apply(doc_id, operations).await
    }
}
