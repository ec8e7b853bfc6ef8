//! 截图与回执 - 业务能力层
//!
//! 只负责单个订单的产物：机器人截图、回执 PDF、把截图嵌入 PDF

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::UiActions;
use crate::models::SiteLocators;
use crate::services::pdf_embed;

/// 截图与回执服务
pub struct ReceiptCapture {
    images_dir: PathBuf,
    receipts_dir: PathBuf,
}

impl ReceiptCapture {
    pub fn new(images_dir: impl Into<PathBuf>, receipts_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            receipts_dir: receipts_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.images_dir.clone(), config.receipts_dir.clone())
    }

    /// 截图保存路径
    pub fn screenshot_path(&self, order_number: &str) -> PathBuf {
        self.images_dir
            .join(format!("robot_img_{}.png", order_number))
    }

    /// 回执保存路径
    pub fn receipt_path(&self, order_number: &str) -> PathBuf {
        self.receipts_dir
            .join(format!("order_results_{}.pdf", order_number))
    }

    /// 截取机器人预览图
    pub async fn capture_screenshot(
        &self,
        ui: &UiActions<'_>,
        locators: &SiteLocators,
        order_number: &str,
    ) -> AppResult<PathBuf> {
        let bytes = ui
            .screenshot("robot_preview", &locators.robot_preview)
            .await?;

        let path = self.screenshot_path(order_number);
        write_creating_dirs(&path, &bytes).await?;
        debug!("截图已保存: {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }

    /// 把页面上的回执区域打印为 PDF
    pub async fn render_receipt_pdf(
        &self,
        ui: &UiActions<'_>,
        locators: &SiteLocators,
        order_number: &str,
    ) -> AppResult<PathBuf> {
        let receipt_html = ui
            .inner_html(&locators.receipt)
            .await?
            .ok_or_else(|| {
                AppError::render_failed(order_number, format!("页面上没有回执元素 ({})", locators.receipt))
            })?;

        let document = standalone_document(&receipt_html);
        let pdf = ui
            .html_to_pdf(&document)
            .await
            .map_err(|e| AppError::render_failed(order_number, e))?;

        let path = self.receipt_path(order_number);
        write_creating_dirs(&path, &pdf).await?;
        debug!("回执已保存: {}", path.display());
        Ok(path)
    }

    /// 把截图追加到回执 PDF（原地修改）
    pub fn embed_image(&self, image_path: &Path, pdf_path: &Path) -> AppResult<()> {
        pdf_embed::embed_image(image_path, pdf_path)?;
        info!("🖼️ 截图已嵌入回执: {}", pdf_path.display());
        Ok(())
    }
}

/// 回执 innerHTML 包成一份可独立打印的文档
fn standalone_document(inner_html: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Receipt</title></head><body>{}</body></html>",
        inner_html
    )
}

async fn write_creating_dirs(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
