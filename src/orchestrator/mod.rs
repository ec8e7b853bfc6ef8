//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批订单的调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单个订单)
//!     ↓
//! services (能力层：订单源 / 导航 / 回执 / 归档)
//!     ↓
//! infrastructure (基础设施：PageDriver / UiActions)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{prepare_output_dirs, run_orders, App, RunSummary};
