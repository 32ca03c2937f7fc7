//! # Doc Answer Fill
//!
//! 把结构化答案填进带编号大纲的在线文档
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 远程文档服务的唯一出入口
//! - `DocService` - 服务接口：读取段落结构、原子提交编辑组
//! - `HttpDocsClient` - HTTP 实现，限流重试与退避只在这一层
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个编号
//! - `StructureReader` - 段落 → 大纲编号标注（现读现用，绝不缓存）
//! - `InsertionResolver` - 定位问题段落与现存答案块
//! - `MutationPlanner` - 决策表 + 原子操作组构造
//! - `BatchExecutor` - 一个编号一次原子提交
//! - `Reporter` - 有序去重的结果汇总
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个编号"的完整处理流程
//! - `FillCtx` - 上下文封装（doc_id + outline_id）
//! - `FillFlow` - 流程编排（读取 → 定位 → 决策 → 提交），严格串行
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 装载输入、驱动整轮、落盘报告
//!
//! ## 核心正确性约束
//!
//! 每次编辑都会使文档内所有后续绝对偏移漂移。因此任何编号在定位
//! 之前都必须基于一次新的结构读取，编号之间不得复用段落位置信息。

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{DocService, DocsError, HttpDocsClient};
pub use config::{AnswerFormatConfig, Config};
pub use error::{AppError, Result};
pub use models::{flatten_answers, AnswerEntry, AnswerInput, FlatAnswer};
pub use orchestrator::App;
pub use services::{FillReport, StructureReader};
pub use workflow::{FillCtx, FillFlow};
