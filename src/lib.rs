//! # Robot Order
//!
//! 一个用于机器人订单批量录入的 Rust 应用程序：
//! 下载订单 CSV，逐单在网页上填表提交，保存截图和 PDF 回执，最后打包成 zip。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 页面能力接口，`ChromiumPage` 为 chromiumoxide 实现
//! - `UiActions` - 在每个动作前等待元素可见
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个订单
//! - `OrderSource` - 下载并解析订单 CSV
//! - `NavigationController` - 打开页面、关闭弹窗
//! - `ReceiptCapture` - 截图、回执 PDF、嵌入截图
//! - `Archiver` - 打包回执目录
//! - `FailureLog` - 写 failed_orders.txt
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一单"的完整处理流程
//! - `OrderCtx` - 上下文封装（订单号 + 序号）
//! - `OrderFlow` - 流程编排（填表 → 预览 → 截图 → 提交 → 回执 → 复位）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 持有浏览器，逐单处理并归档

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, WaitConfig};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromiumPage, PageDriver, UiActions};
pub use models::{Locator, OrderRecord, SiteLocators};
pub use orchestrator::{run_orders, App, RunSummary};
pub use workflow::{OrderCtx, OrderFlow, ResetOutcome, SubmissionOutcome, SubmissionStatus};
