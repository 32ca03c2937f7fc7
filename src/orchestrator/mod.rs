//! 文档填写编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整填写轮次的装配和收尾。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、配置校验、创建文档服务客户端
//! 2. **输入装载**：答案 JSON 展平、格式配置 TOML 加载
//! 3. **流程驱动**：把 FillFlow 跑完整轮（严格串行，无并发）
//! 4. **结果落盘**：带时间戳的 JSON / Markdown 报告
//! 5. **全局统计**：汇总输出各动作数量
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个条目的细节，向下委托 workflow
//! - **显式配置**：格式配置构造一次后按值传入，无进程级状态

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::clients::{DocService, HttpDocsClient};
use crate::config::Config;
use crate::error::InputError;
use crate::models::{flatten_answers, load_answers_file, load_format_config};
use crate::services::{FillReport, Reporter, StructureReader};
use crate::utils::logging::{init_log_file, log_answers_loaded, log_startup, print_final_stats};
use crate::workflow::FillFlow;

/// 应用主结构
pub struct App {
    config: Config,
    client: HttpDocsClient,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.doc_id, config.dry_run);

        if config.doc_id.is_empty() {
            return Err(InputError::EmptyDocId).context("请通过 DOC_ID 指定目标文档");
        }

        let client = HttpDocsClient::new(&config);

        Ok(Self { config, client })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<FillReport> {
        if self.config.dump_structure {
            return self.dump_structure().await;
        }

        // 加载格式配置（文件缺失回退默认值），处理任何条目前先校验
        let format = load_format_config(&self.config.format_file).await?;
        format.validate()?;

        // 加载并展平答案输入
        let input = load_answers_file(&self.config.answers_file).await?;
        let answers = flatten_answers(&input)?;
        log_answers_loaded(answers.len());

        // 完整一轮填写
        let flow = FillFlow::new(&self.client, format, self.config.dry_run);
        let report = flow.run(&self.config.doc_id, &answers).await?;

        self.write_report(&report).await?;
        print_final_stats(&report.counts, report.results.len());

        Ok(report)
    }

    /// 导出带大纲编号的文档结构后直接返回（调试用）
    async fn dump_structure(&self) -> Result<FillReport> {
        let raw = self.client.fetch(&self.config.doc_id).await?;
        let structure = StructureReader::read(&raw)?;
        println!("{}", serde_json::to_string_pretty(&structure.paragraphs)?);

        let reporter = Reporter::new();
        Ok(reporter.finish(&self.config.doc_id, true))
    }

    /// 把报告写到带时间戳的文件
    async fn write_report(&self, report: &FillReport) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d-%H%M");
        let json_path = format!("{}_{}.json", self.config.report_prefix, timestamp);
        let md_path = format!("{}_{}.md", self.config.report_prefix, timestamp);

        let mut json_text = serde_json::to_string_pretty(&report.to_json())?;
        json_text.push('\n');
        fs::write(&json_path, json_text)
            .await
            .with_context(|| format!("无法写入报告文件: {}", json_path))?;

        fs::write(&md_path, report.to_markdown())
            .await
            .with_context(|| format!("无法写入报告文件: {}", md_path))?;

        info!("报告已保存: {} / {}", json_path, md_path);

        Ok(())
    }
}
