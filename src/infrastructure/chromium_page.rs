//! chromiumoxide 页面驱动 - 基础设施层
//!
//! 持有下单页面和一个用于打印 PDF 的草稿页面

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::PageDriver;
use crate::models::Locator;

/// chromiumoxide 页面驱动
///
/// `page` 是下单页面；`render_page` 只用来装载回执 HTML 并打印成 PDF，
/// 这样打印不会破坏下单页面的状态。
pub struct ChromiumPage {
    page: Page,
    render_page: Page,
}

#[derive(Deserialize)]
struct InnerHtml {
    found: bool,
    html: String,
}

impl ChromiumPage {
    pub fn new(page: Page, render_page: Page) -> Self {
        Self { page, render_page }
    }

    /// 获取下单页面的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    async fn find(&self, locator: &Locator) -> AppResult<Element> {
        let (is_xpath, expr) = locator.query();
        let element = if is_xpath {
            self.page.find_xpath(expr).await?
        } else {
            self.page.find_element(expr).await?
        };
        Ok(element)
    }

    /// 用原生 setter 写值并派发 input/change 事件，React 受控组件才能感知到
    async fn set_value(&self, locator: &Locator, prototype: &str, value: &str) -> AppResult<String> {
        let js_code = format!(
            r#"
            (() => {{
                const el = {expr};
                if (!el) return "no-element";
                const value = {value};
                if (el instanceof HTMLSelectElement
                    && !Array.from(el.options).some(o => o.value === value)) {{
                    return "no-option";
                }}
                const setter = Object.getOwnPropertyDescriptor({prototype}.prototype, "value").set;
                el.focus();
                setter.call(el, value);
                el.dispatchEvent(new Event("input", {{ bubbles: true }}));
                el.dispatchEvent(new Event("change", {{ bubbles: true }}));
                return "ok";
            }})()
            "#,
            expr = locator.js_expr(),
            value = serde_json::to_string(value)?,
            prototype = prototype,
        );
        self.eval_as(js_code).await
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = {};
                if (!el) return false;
                const style = window.getComputedStyle(el);
                if (style.display === "none" || style.visibility === "hidden") return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }})()
            "#,
            locator.js_expr()
        );
        self.eval_as(js_code).await
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        self.find(locator).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        match self.set_value(locator, "HTMLInputElement", value).await?.as_str() {
            "ok" => Ok(()),
            _ => Err(AppError::element_not_found("input", locator)),
        }
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()> {
        match self.set_value(locator, "HTMLSelectElement", value).await?.as_str() {
            "ok" => Ok(()),
            "no-option" => Err(AppError::element_not_found(
                format!("option[value={}]", value),
                locator,
            )),
            _ => Err(AppError::element_not_found("select", locator)),
        }
    }

    async fn inner_html(&self, locator: &Locator) -> AppResult<Option<String>> {
        let js_code = format!(
            r#"
            (() => {{
                const el = {};
                return el ? {{ found: true, html: el.innerHTML }} : {{ found: false, html: "" }};
            }})()
            "#,
            locator.js_expr()
        );
        let result: InnerHtml = self.eval_as(js_code).await?;
        Ok(result.found.then_some(result.html))
    }

    async fn screenshot_element(&self, locator: &Locator) -> AppResult<Vec<u8>> {
        let element = self.find(locator).await?;
        let bytes = element.screenshot(CaptureScreenshotFormat::Png).await?;
        Ok(bytes)
    }

    async fn screenshot_page(&self) -> AppResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        let bytes = self.page.screenshot(params).await?;
        Ok(bytes)
    }

    async fn html_to_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        self.render_page.set_content(html).await?;
        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        let bytes = self.render_page.pdf(params).await?;
        debug!("回执 PDF 大小: {} 字节", bytes.len());
        Ok(bytes)
    }
}
