/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::{info, warn};

use crate::config::Config;
use crate::models::OrderRecord;
use crate::orchestrator::RunSummary;
use crate::workflow::OrderCtx;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 机器人订单批量录入");
    info!("🌐 下单页面: {}", config.order_site_url);
    info!("📄 订单来源: {}", config.orders_csv_url);
    info!("{}", "=".repeat(60));
}

/// 记录订单加载信息
pub fn log_orders_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的订单", total);
    info!("📋 将按文件顺序逐个处理\n");
}

/// 记录单个订单开始
pub fn log_order_start(ctx: &OrderCtx, order: &OrderRecord) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!(
        "{} Head={} Body={} Legs={} Address={}",
        ctx,
        order.head,
        order.body,
        order.legs,
        truncate_text(&order.address, 40)
    );
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, failure_log: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.submitted, summary.total);
    info!("❌ 失败: {}", summary.failed.len());
    if !summary.failed.is_empty() {
        warn!("失败订单: {}", summary.failed.join(", "));
        info!("失败记录已保存至: {}", failure_log);
    }
    info!(
        "📦 压缩包: {} ({} 个条目)",
        summary.archive_path.display(),
        summary.archived_entries.len()
    );
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
