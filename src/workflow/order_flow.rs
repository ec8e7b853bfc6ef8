//! 订单提交流程 - 流程层
//!
//! 核心职责：定义"一单"的完整处理流程
//!
//! 流程顺序：
//! 1. 填表 → 预览 → 截图
//! 2. 提交（失败提示出现则重试，最多 4 次点击）
//! 3. 回执 PDF → 嵌入截图
//! 4. 点击 "Order another robot" 复位表单

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::UiActions;
use crate::models::{OrderRecord, SiteLocators};
use crate::services::ReceiptCapture;
use crate::workflow::order_ctx::OrderCtx;

/// 每单最多点击提交按钮的次数（首次 + 3 次重试）
pub const MAX_SUBMIT_ATTEMPTS: u32 = 4;

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// 失败提示消失，`attempts` 为实际点击次数
    Submitted { attempts: u32 },
    /// 重试耗尽或提交按钮不可用
    Failed { reason: String },
}

/// 复位结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// 已点击 "Order another robot"
    Reset,
    /// 按钮不存在，页面保持原状
    AffordanceMissing,
}

/// 单个订单的处理结果
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub order_number: String,
    pub screenshot_path: PathBuf,
    /// 跳过回执时为 `None`
    pub receipt_path: Option<PathBuf>,
    pub status: SubmissionStatus,
    pub reset: ResetOutcome,
}

impl SubmissionOutcome {
    pub fn success(&self) -> bool {
        matches!(self.status, SubmissionStatus::Submitted { .. })
    }
}

/// 订单提交流程
///
/// - 编排单个订单的完整处理流程
/// - 决定何时重试、何时生成回执、何时复位
/// - 不持有页面资源，只通过 `UiActions` 操作页面
pub struct OrderFlow<'a> {
    ui: &'a UiActions<'a>,
    locators: &'a SiteLocators,
    capture: ReceiptCapture,
    receipt_on_failed_submit: bool,
}

impl<'a> OrderFlow<'a> {
    pub fn new(ui: &'a UiActions<'a>, config: &'a Config) -> Self {
        Self {
            ui,
            locators: &config.locators,
            capture: ReceiptCapture::from_config(config),
            receipt_on_failed_submit: config.receipt_on_failed_submit,
        }
    }

    /// 处理一单
    ///
    /// 填表、预览、截图阶段的错误直接返回（整批中止）；
    /// 提交错误被记录在结果里，流程继续。
    pub async fn run(&self, order: &OrderRecord, ctx: &OrderCtx) -> AppResult<SubmissionOutcome> {
        // ========== 1. 填表 ==========
        self.fill_form(order).await?;
        info!("{} ✓ 表单已填写", ctx);

        // ========== 2. 预览 ==========
        self.ui.click("preview", &self.locators.preview).await?;

        // ========== 3. 提交前截图 ==========
        let screenshot_path = self
            .capture
            .capture_screenshot(self.ui, self.locators, &order.order_number)
            .await?;
        info!("{} 📸 已截图: {}", ctx, screenshot_path.display());

        // ========== 4. 提交（带重试） ==========
        let status = match self.submit_with_retry(&order.order_number, ctx).await {
            Ok(attempts) => {
                info!("{} ✓ 订单提交成功 (点击 {} 次)", ctx, attempts);
                SubmissionStatus::Submitted { attempts }
            }
            Err(e) => {
                error!("{} ❌ 订单提交失败: {}", ctx, e);
                SubmissionStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        // ========== 5. 回执 ==========
        let submitted = matches!(status, SubmissionStatus::Submitted { .. });
        let receipt_path = if submitted || self.receipt_on_failed_submit {
            if !submitted {
                warn!("{} ⚠️ 提交未确认成功，仍然尝试生成回执", ctx);
            }
            Some(self.generate_receipt(order, &screenshot_path, submitted).await?)
        } else {
            warn!("{} ⚠️ 提交失败，跳过回执生成", ctx);
            None
        };

        // ========== 6. 复位 ==========
        let reset = self.reset(ctx).await?;

        Ok(SubmissionOutcome {
            order_number: order.order_number.clone(),
            screenshot_path,
            receipt_path,
            status,
            reset,
        })
    }

    async fn fill_form(&self, order: &OrderRecord) -> AppResult<()> {
        let locators = self.locators;
        self.ui
            .select_option("head", &locators.head, &order.head)
            .await?;
        self.ui
            .click("body", &locators.body_option(&order.body))
            .await?;
        self.ui.fill("legs", &locators.legs, &order.legs).await?;
        self.ui
            .fill("address", &locators.address, &order.address)
            .await?;
        Ok(())
    }

    /// 点击提交，失败提示可见则继续点击，最多 [`MAX_SUBMIT_ATTEMPTS`] 次
    ///
    /// 返回成功时的点击次数。
    pub async fn submit_with_retry(&self, order_number: &str, ctx: &OrderCtx) -> AppResult<u32> {
        for attempt in 1..=MAX_SUBMIT_ATTEMPTS {
            self.ui.click("submit", &self.locators.submit).await?;

            if !self.ui.is_visible(&self.locators.failure_banner).await? {
                return Ok(attempt);
            }
            warn!(
                "{} ⚠️ 提交后出现错误提示 (尝试 {}/{})",
                ctx, attempt, MAX_SUBMIT_ATTEMPTS
            );
        }

        Err(AppError::SubmissionRetriesExhausted {
            order_number: order_number.to_string(),
            attempts: MAX_SUBMIT_ATTEMPTS,
        })
    }

    async fn generate_receipt(
        &self,
        order: &OrderRecord,
        screenshot_path: &Path,
        submitted: bool,
    ) -> AppResult<PathBuf> {
        if submitted {
            // 回执在提交成功后才渲染出来
            self.ui
                .wait_until_visible(&self.locators.receipt, self.ui.wait_config().action_timeout())
                .await?;
        }
        let receipt_path = self
            .capture
            .render_receipt_pdf(self.ui, self.locators, &order.order_number)
            .await?;
        self.capture.embed_image(screenshot_path, &receipt_path)?;
        Ok(receipt_path)
    }

    async fn reset(&self, ctx: &OrderCtx) -> AppResult<ResetOutcome> {
        if self.ui.is_visible(&self.locators.order_another_text).await? {
            self.ui
                .click("order_another", &self.locators.order_another)
                .await?;
            Ok(ResetOutcome::Reset)
        } else {
            warn!(
                "{} ⚠️ 未找到 \"Order another robot\" 按钮，页面保持当前状态",
                ctx
            );
            Ok(ResetOutcome::AffordanceMissing)
        }
    }
}
