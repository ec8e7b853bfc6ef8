//! 页面导航 - 业务能力层

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::infrastructure::UiActions;
use crate::models::SiteLocators;

/// 页面导航控制器
///
/// 负责打开下单页面和关闭首屏弹窗
///
/// 第一次完整等待后仍未出现弹窗，说明站点不弹窗，之后只检查一次。
pub struct NavigationController<'a> {
    ui: &'a UiActions<'a>,
    locators: &'a SiteLocators,
    checked: AtomicBool,
    modal_seen: AtomicBool,
}

impl<'a> NavigationController<'a> {
    pub fn new(ui: &'a UiActions<'a>, locators: &'a SiteLocators) -> Self {
        Self {
            ui,
            locators,
            checked: AtomicBool::new(false),
            modal_seen: AtomicBool::new(false),
        }
    }

    pub async fn open_site(&self, url: &str) -> AppResult<()> {
        self.ui.goto(url).await?;
        info!("🌐 已打开下单页面: {}", url);
        Ok(())
    }

    /// 关闭弹窗
    ///
    /// 每单之前都要调用一次；弹窗不存在不算错误。
    /// 返回是否真的点击了确认按钮。
    pub async fn dismiss_interstitial(&self) -> AppResult<bool> {
        let timeout = if self.checked.load(Ordering::Relaxed)
            && !self.modal_seen.load(Ordering::Relaxed)
        {
            Duration::ZERO
        } else {
            self.ui.wait_config().interstitial_timeout()
        };
        debug!("等待弹窗，最长 {:?}", timeout);

        let visible = self
            .ui
            .wait_until_visible(&self.locators.modal_confirm, timeout)
            .await?;
        self.checked.store(true, Ordering::Relaxed);
        if !visible {
            debug!("未出现弹窗，跳过");
            return Ok(false);
        }
        self.modal_seen.store(true, Ordering::Relaxed);

        self.ui
            .click("modal_confirm", &self.locators.modal_confirm)
            .await?;
        debug!("弹窗已关闭");
        Ok(true)
    }
}
