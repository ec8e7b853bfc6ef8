//! 页面驱动接口 - 基础设施层
//!
//! 上层只依赖这里的能力，不直接接触 chromiumoxide，
//! 测试时可以用脚本化的假页面替换。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::Locator;

/// 页面驱动
///
/// 职责：
/// - 持有唯一的页面资源
/// - 暴露最基本的页面操作（点击、填写、读取、截图、打印）
/// - 不做任何等待，等待策略由 [`UiActions`](super::UiActions) 负责
/// - 不认识订单
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定 URL
    async fn goto(&self, url: &str) -> AppResult<()>;

    /// 元素是否存在且可见
    async fn is_visible(&self, locator: &Locator) -> AppResult<bool>;

    async fn click(&self, locator: &Locator) -> AppResult<()>;

    /// 清空输入框并写入新值
    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()>;

    /// 选中下拉框中 value 匹配的选项
    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()>;

    /// 元素的 innerHTML，元素不存在时返回 `None`
    async fn inner_html(&self, locator: &Locator) -> AppResult<Option<String>>;

    /// 只截取该元素的 PNG
    async fn screenshot_element(&self, locator: &Locator) -> AppResult<Vec<u8>>;

    /// 整个页面的 PNG，用于出错现场
    async fn screenshot_page(&self) -> AppResult<Vec<u8>>;

    /// 把一份完整的 HTML 文档打印为 PDF
    async fn html_to_pdf(&self, html: &str) -> AppResult<Vec<u8>>;
}
