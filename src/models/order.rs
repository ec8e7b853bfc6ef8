use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};

/// CSV 中必须存在的列
pub const REQUIRED_COLUMNS: [&str; 5] = ["Order number", "Head", "Body", "Legs", "Address"];

/// 一行订单数据
///
/// 所有字段保持字符串，不做数值转换（`legs` 也是字符串）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order number")]
    pub order_number: String,
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Legs")]
    pub legs: String,
    #[serde(rename = "Address")]
    pub address: String,
}

fn order_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("静态正则"))
}

impl OrderRecord {
    /// 校验字段
    ///
    /// 订单号会拼进输出文件名，只允许字母、数字、`_` 和 `-`。
    pub fn validate(&self) -> AppResult<()> {
        if !order_number_pattern().is_match(&self.order_number) {
            return Err(AppError::MalformedInput(format!(
                "订单号不合法: {:?}",
                self.order_number
            )));
        }
        if self.head.trim().is_empty() {
            return Err(AppError::MalformedInput(format!(
                "订单 {} 缺少 Head",
                self.order_number
            )));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::MalformedInput(format!(
                "订单 {} 缺少 Body",
                self.order_number
            )));
        }
        Ok(())
    }
}
