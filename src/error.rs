use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 订单文件下载失败（网络错误、非 2xx 状态码、本地写入失败）
    #[error("订单源不可用 ({url}): {reason}")]
    SourceUnavailable { url: String, reason: String },

    /// 订单 CSV 无法解析（无表头、缺列、行格式错误）
    #[error("订单文件格式错误: {0}")]
    MalformedInput(String),

    /// 页面元素在等待超时后仍未出现
    #[error("页面元素未找到: {element} ({locator})")]
    ElementNotFound { element: String, locator: String },

    /// 提交按钮点击达到上限后失败提示仍然可见
    #[error("订单 {order_number} 提交失败，已尝试 {attempts} 次")]
    SubmissionRetriesExhausted { order_number: String, attempts: u32 },

    /// 回执生成失败
    #[error("订单 {order_number} 回执生成失败: {reason}")]
    RenderError { order_number: String, reason: String },

    /// 浏览器 / CDP 错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// PDF 读写错误
    #[error("PDF 处理失败: {0}")]
    Pdf(#[from] lopdf::Error),

    /// 截图解码错误
    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),

    /// 压缩包写入错误
    #[error("归档失败: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建订单源不可用错误
    pub fn source_unavailable(url: impl Into<String>, reason: impl ToString) -> Self {
        AppError::SourceUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建元素未找到错误
    pub fn element_not_found(element: impl Into<String>, locator: impl ToString) -> Self {
        AppError::ElementNotFound {
            element: element.into(),
            locator: locator.to_string(),
        }
    }

    /// 创建回执生成错误
    pub fn render_failed(order_number: impl Into<String>, reason: impl ToString) -> Self {
        AppError::RenderError {
            order_number: order_number.into(),
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = AppError::SubmissionRetriesExhausted {
            order_number: "17".to_string(),
            attempts: 4,
        };
        assert_eq!(err.to_string(), "订单 17 提交失败，已尝试 4 次");

        let err = AppError::element_not_found("submit", "css:#order");
        assert!(err.to_string().contains("css:#order"));
    }
}
