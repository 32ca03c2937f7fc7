use std::fs;

use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// 默认 info 级别，可用 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档填写日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `doc_id`: 目标文档ID
/// - `dry_run`: 是否试运行
pub fn log_startup(doc_id: &str, dry_run: bool) {
    info!("{}", "=".repeat(60));
    if dry_run {
        info!("🚀 程序启动 - 试运行模式（不修改文档）");
    } else {
        info!("🚀 程序启动 - 文档填写模式");
    }
    info!("📄 目标文档: {}", doc_id);
    info!("{}", "=".repeat(60));
}

/// 记录答案加载信息
pub fn log_answers_loaded(total: usize) {
    info!("✓ 展平得到 {} 个答案条目", total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `counts`: 各动作数量（按动作名排序）
/// - `total`: 条目总数
pub fn print_final_stats(counts: &std::collections::BTreeMap<&'static str, usize>, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("共 {} 个条目", total);
    for (action, count) in counts {
        info!("  {}: {}", action, count);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
