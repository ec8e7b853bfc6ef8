use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::SiteLocators;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "robot_order.toml";

/// 每个页面动作的等待参数
///
/// 替代全局的 slowmo：动作前等待元素可见，点击后短暂等待页面稳定。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// 等待元素出现的最长时间
    pub action_timeout_ms: u64,
    /// 轮询间隔
    pub poll_interval_ms: u64,
    /// 点击后等待页面重新渲染的时间
    pub settle_delay_ms: u64,
    /// 等待首屏弹窗的最长时间（弹窗不一定出现）
    pub interstitial_timeout_ms: u64,
}

impl WaitConfig {
    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn interstitial_timeout(&self) -> Duration {
        Duration::from_millis(self.interstitial_timeout_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            action_timeout_ms: 10_000,
            poll_interval_ms: 100,
            settle_delay_ms: 500,
            interstitial_timeout_ms: 3_000,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下单页面
    pub order_site_url: String,
    /// 订单 CSV 地址
    pub orders_csv_url: String,
    /// CSV 下载到本地的文件
    pub orders_file: PathBuf,
    /// 机器人截图目录
    pub images_dir: PathBuf,
    /// PDF 回执目录
    pub receipts_dir: PathBuf,
    /// 最终压缩包
    pub archive_path: PathBuf,
    /// 失败订单日志
    pub failure_log_file: PathBuf,
    /// 中止时的整页截图目录
    pub failure_screenshot_dir: PathBuf,
    /// 订单处理出错中止前是否保存整页截图
    pub screenshot_on_failure: bool,
    /// 浏览器可执行文件，留空则由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 浏览器调试端口；设置后连接已有浏览器，否则启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    pub wait: WaitConfig,
    /// 提交失败后是否仍然生成回执
    pub receipt_on_failed_submit: bool,
    /// 压缩包是否同时包含截图目录
    pub archive_include_images: bool,
    pub locators: SiteLocators,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order_site_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            orders_csv_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            orders_file: PathBuf::from("orders.csv"),
            images_dir: PathBuf::from("output/images"),
            receipts_dir: PathBuf::from("output/receipts"),
            archive_path: PathBuf::from("output/receipts.zip"),
            failure_log_file: PathBuf::from("output/failed_orders.txt"),
            failure_screenshot_dir: PathBuf::from("output"),
            screenshot_on_failure: true,
            chrome_executable: None,
            browser_debug_port: None,
            verbose_logging: false,
            wait: WaitConfig::default(),
            receipt_on_failed_submit: true,
            archive_include_images: false,
            locators: SiteLocators::default(),
        }
    }
}

impl Config {
    /// 按 `ROBOT_ORDER_CONFIG` → `robot_order.toml` → 默认值 的顺序加载，再叠加环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("ROBOT_ORDER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| AppError::Config(format!("{} ({})", e, path.display())))
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("TOML解析失败: {}", e)))
    }

    /// 仅使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(self, var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            order_site_url: var("ORDER_SITE_URL").unwrap_or(self.order_site_url),
            orders_csv_url: var("ORDERS_CSV_URL").unwrap_or(self.orders_csv_url),
            orders_file: var("ORDERS_FILE").map(PathBuf::from).unwrap_or(self.orders_file),
            images_dir: var("IMAGES_DIR").map(PathBuf::from).unwrap_or(self.images_dir),
            receipts_dir: var("RECEIPTS_DIR").map(PathBuf::from).unwrap_or(self.receipts_dir),
            archive_path: var("ARCHIVE_PATH").map(PathBuf::from).unwrap_or(self.archive_path),
            failure_log_file: var("FAILURE_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(self.failure_log_file),
            failure_screenshot_dir: var("FAILURE_SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.failure_screenshot_dir),
            screenshot_on_failure: parsed(&var, "SCREENSHOT_ON_FAILURE")
                .unwrap_or(self.screenshot_on_failure),
            chrome_executable: var("CHROME_EXECUTABLE")
                .map(PathBuf::from)
                .or(self.chrome_executable),
            browser_debug_port: parsed(&var, "BROWSER_DEBUG_PORT").or(self.browser_debug_port),
            verbose_logging: parsed(&var, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            receipt_on_failed_submit: parsed(&var, "RECEIPT_ON_FAILED_SUBMIT")
                .unwrap_or(self.receipt_on_failed_submit),
            archive_include_images: parsed(&var, "ARCHIVE_INCLUDE_IMAGES")
                .unwrap_or(self.archive_include_images),
            wait: self.wait,
            locators: self.locators,
        }
    }
}

/// 读取并解析变量，解析失败视为未设置
fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_output_layout() {
        let config = Config::default();
        assert_eq!(config.images_dir, PathBuf::from("output/images"));
        assert_eq!(config.receipts_dir, PathBuf::from("output/receipts"));
        assert_eq!(config.archive_path, PathBuf::from("output/receipts.zip"));
        assert!(config.receipt_on_failed_submit);
        assert!(!config.archive_include_images);
        assert!(config.screenshot_on_failure);
        assert_eq!(config.failure_screenshot_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            archive_include_images = true

            [wait]
            settle_delay_ms = 50
            "#,
        )
        .unwrap();
        assert!(config.archive_include_images);
        assert_eq!(config.wait.settle_delay_ms, 50);
        assert_eq!(config.wait.action_timeout_ms, 10_000);
        assert_eq!(config.orders_file, PathBuf::from("orders.csv"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("verbose_logging = \"yes\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_overrides_ignore_unparsable_values() {
        let vars: HashMap<&str, &str> = [
            ("BROWSER_DEBUG_PORT", "9222"),
            ("VERBOSE_LOGGING", "not-a-bool"),
            ("ORDERS_CSV_URL", "http://localhost/orders.csv"),
            ("SCREENSHOT_ON_FAILURE", "false"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.browser_debug_port, Some(9222));
        assert!(!config.verbose_logging);
        assert_eq!(config.orders_csv_url, "http://localhost/orders.csv");
        assert!(!config.screenshot_on_failure);
    }
}
