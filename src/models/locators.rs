//! 页面元素定位描述
//!
//! 逻辑元素名 → 定位器 的声明式映射，流程代码只引用逻辑名，
//! 站点改版时只需改这里（或配置文件中的 `[locators]` 段）。

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// 元素定位器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// CSS 选择器
    Css(String),
    /// XPath 表达式
    XPath(String),
    /// 按可见文本精确匹配
    Text(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    /// 生成一段返回匹配元素（或 null）的 JS 表达式
    pub fn js_expr(&self) -> String {
        match self {
            Locator::Css(selector) => {
                format!("document.querySelector({})", js_string(selector))
            }
            Locator::XPath(expr) => xpath_js(expr),
            Locator::Text(text) => xpath_js(&self.text_xpath(text)),
        }
    }

    /// 文本定位器对应的 XPath
    fn text_xpath(&self, text: &str) -> String {
        format!("//*[normalize-space(text())={}]", xpath_literal(text))
    }

    /// 转成 chromiumoxide 能直接查找的形式：(是否 XPath, 表达式)
    pub fn query(&self) -> (bool, String) {
        match self {
            Locator::Css(selector) => (false, selector.clone()),
            Locator::XPath(expr) => (true, expr.clone()),
            Locator::Text(text) => (true, self.text_xpath(text)),
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
            Locator::Text(s) => write!(f, "text:{}", s),
        }
    }
}

fn js_string(value: &str) -> String {
    // serde_json 的字符串转义与 JS 字面量兼容
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// XPath 1.0 字符串字面量
///
/// 没有转义语法；同时含 `'` 和 `"` 时拆成 `concat('..', "'", '..')`。
fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        format!("\"{}\"", text)
    } else if !text.contains('\'') {
        format!("'{}'", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn xpath_js(expr: &str) -> String {
    format!(
        "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
        js_string(expr)
    )
}

/// 机器人下单页面的元素映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocators {
    /// 首次打开页面时弹出对话框的确认按钮
    pub modal_confirm: Locator,
    /// 头部下拉框
    pub head: Locator,
    /// 身体单选项的 id 前缀，与订单中的 body 值拼接
    pub body_option_prefix: String,
    /// 腿部输入框（没有稳定 id，只能按结构定位）
    pub legs: Locator,
    pub address: Locator,
    pub preview: Locator,
    pub submit: Locator,
    /// 提交失败时出现的红色提示
    pub failure_banner: Locator,
    pub robot_preview: Locator,
    pub receipt: Locator,
    /// "再下一单" 的可见文本
    pub order_another_text: Locator,
    pub order_another: Locator,
}

impl SiteLocators {
    /// 某个 body 值对应的单选项
    pub fn body_option(&self, body: &str) -> Locator {
        Locator::Css(format!("{}{}", self.body_option_prefix, body))
    }
}

impl Default for SiteLocators {
    fn default() -> Self {
        Self {
            modal_confirm: Locator::xpath(
                r#"//*[@id="root"]/div/div[2]/div/div/div/div/div/button[1]"#,
            ),
            head: Locator::css("#head"),
            body_option_prefix: "#id-body-".to_string(),
            legs: Locator::xpath(
                "//div[@id='root']/div[1]/div[1]/div[1]/div[1]/form[1]/div[3]/input[1]",
            ),
            address: Locator::css("#address"),
            preview: Locator::css("#preview"),
            submit: Locator::css("#order"),
            failure_banner: Locator::css(".alert-danger"),
            robot_preview: Locator::css("#robot-preview-image"),
            receipt: Locator::css("#receipt"),
            order_another_text: Locator::text("Order another robot"),
            order_another: Locator::css("#order-another"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_option_combines_prefix_and_value() {
        let locators = SiteLocators::default();
        assert_eq!(locators.body_option("3"), Locator::css("#id-body-3"));
    }

    #[test]
    fn test_js_expr_escapes_selectors() {
        let css = Locator::css(r#"input[name="x"]"#).js_expr();
        assert_eq!(css, r#"document.querySelector("input[name=\"x\"]")"#);

        let text = Locator::text("Order another robot").js_expr();
        assert!(text.starts_with("document.evaluate("));
        assert!(text.contains(r#"normalize-space(text())=\"Order another robot\""#));
    }

    #[test]
    fn test_query_maps_text_to_xpath() {
        let (is_xpath, expr) = Locator::text("Order another robot").query();
        assert!(is_xpath);
        assert_eq!(expr, r#"//*[normalize-space(text())="Order another robot"]"#);

        let (is_xpath, expr) = Locator::css("#order").query();
        assert!(!is_xpath);
        assert_eq!(expr, "#order");
    }

    #[test]
    fn test_text_with_both_quotes_uses_concat() {
        let (_, expr) = Locator::text(r#"Bob's "robot""#).query();
        assert_eq!(
            expr,
            r#"//*[normalize-space(text())=concat('Bob', "'", 's "robot"')]"#
        );

        let (_, expr) = Locator::text(r#"say "hi""#).query();
        assert_eq!(expr, r#"//*[normalize-space(text())='say "hi"']"#);
    }

    #[test]
    fn test_locators_override_from_toml() {
        let toml_str = r##"
            body_option_prefix = "#body-"
            submit = { kind = "xpath", value = "//button[@id='go']" }
        "##;
        let locators: SiteLocators = toml::from_str(toml_str).unwrap();
        assert_eq!(locators.body_option("1"), Locator::css("#body-1"));
        assert_eq!(locators.submit, Locator::xpath("//button[@id='go']"));
        // 未覆盖的字段保持默认
        assert_eq!(locators.head, Locator::css("#head"));
    }
}
