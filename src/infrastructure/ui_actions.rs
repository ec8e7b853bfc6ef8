//! 带等待条件的页面操作
//!
//! 每个动作前先轮询目标元素直到可见，点击后等待页面稳定。

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::WaitConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::PageDriver;
use crate::models::Locator;

pub struct UiActions<'a> {
    driver: &'a dyn PageDriver,
    wait: WaitConfig,
}

impl<'a> UiActions<'a> {
    pub fn new(driver: &'a dyn PageDriver, wait: WaitConfig) -> Self {
        Self { driver, wait }
    }

    pub fn driver(&self) -> &'a dyn PageDriver {
        self.driver
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    /// 在 `timeout` 内轮询，元素可见返回 true，超时返回 false
    pub async fn wait_until_visible(&self, locator: &Locator, timeout: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.driver.is_visible(locator).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.wait.poll_interval()).await;
        }
    }

    /// 等待元素可见，超时即 `ElementNotFound`
    pub async fn expect_visible(&self, name: &str, locator: &Locator) -> AppResult<()> {
        if self
            .wait_until_visible(locator, self.wait.action_timeout())
            .await?
        {
            Ok(())
        } else {
            Err(AppError::element_not_found(name, locator))
        }
    }

    /// 立即检查一次可见性，不等待
    pub async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        self.driver.is_visible(locator).await
    }

    pub async fn goto(&self, url: &str) -> AppResult<()> {
        self.driver.goto(url).await
    }

    pub async fn click(&self, name: &str, locator: &Locator) -> AppResult<()> {
        self.expect_visible(name, locator).await?;
        debug!("点击 {} ({})", name, locator);
        self.driver.click(locator).await?;
        self.settle().await;
        Ok(())
    }

    pub async fn fill(&self, name: &str, locator: &Locator, value: &str) -> AppResult<()> {
        self.expect_visible(name, locator).await?;
        debug!("填写 {} = {:?}", name, value);
        self.driver.fill(locator, value).await
    }

    pub async fn select_option(&self, name: &str, locator: &Locator, value: &str) -> AppResult<()> {
        self.expect_visible(name, locator).await?;
        debug!("选择 {} = {:?}", name, value);
        self.driver.select_option(locator, value).await
    }

    pub async fn screenshot(&self, name: &str, locator: &Locator) -> AppResult<Vec<u8>> {
        self.expect_visible(name, locator).await?;
        self.driver.screenshot_element(locator).await
    }

    /// 整页截图，不等待任何元素
    pub async fn screenshot_page(&self) -> AppResult<Vec<u8>> {
        self.driver.screenshot_page().await
    }

    pub async fn inner_html(&self, locator: &Locator) -> AppResult<Option<String>> {
        self.driver.inner_html(locator).await
    }

    pub async fn html_to_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        self.driver.html_to_pdf(html).await
    }

    /// 点击后等待页面重新渲染
    pub async fn settle(&self) {
        let delay = self.wait.settle_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}
