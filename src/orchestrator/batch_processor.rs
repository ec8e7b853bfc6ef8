//! 批量订单处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量订单的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动或连接浏览器、创建页面驱动
//! 2. **准备输出目录**：截图目录、回执目录
//! 3. **加载订单**：下载并解析订单 CSV
//! 4. **逐单处理**：严格按文件顺序，一次只处理一单
//! 5. **归档**：全部订单结束后压缩回执目录
//! 6. **全局统计**：汇总成功/失败订单
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：单个订单交给 `OrderFlow`

use chromiumoxide::Browser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ChromiumPage, PageDriver, UiActions};
use crate::services::{Archiver, FailureLog, NavigationController, OrderSource};
use crate::utils::logging::{log_order_start, log_orders_loaded, log_startup, print_final_stats};
use crate::workflow::{OrderCtx, OrderFlow, SubmissionOutcome, SubmissionStatus};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    driver: ChromiumPage,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        // 有调试端口就连接已有浏览器，否则启动无头浏览器
        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser(port, "about:blank").await?,
            None => {
                browser::launch_headless_browser("about:blank", config.chrome_executable.as_deref())
                    .await?
            }
        };

        // 打印 PDF 用的草稿页面
        let render_page = browser.new_page("about:blank").await?;
        let driver = ChromiumPage::new(page, render_page);

        Ok(Self {
            config,
            _browser: browser,
            driver,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunSummary> {
        run_orders(&self.driver, &self.config).await
    }
}

/// 整批处理结果
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub submitted: usize,
    /// 提交失败的订单号（按处理顺序）
    pub failed: Vec<String>,
    pub outcomes: Vec<SubmissionOutcome>,
    pub archive_path: PathBuf,
    pub archived_entries: Vec<String>,
}

/// 用给定的页面驱动跑完整批订单
///
/// 订单源、填表、截图、回执阶段的错误会中止整批；提交失败只记录。
pub async fn run_orders(driver: &dyn PageDriver, config: &Config) -> AppResult<RunSummary> {
    prepare_output_dirs(config)?;

    let failure_log = FailureLog::new(&config.failure_log_file);
    failure_log.init()?;

    let ui = UiActions::new(driver, config.wait.clone());
    let navigation = NavigationController::new(&ui, &config.locators);
    navigation.open_site(&config.order_site_url).await?;

    // 加载订单
    info!("\n📁 正在下载订单文件...");
    let orders = OrderSource::from_config(config).fetch_orders().await?;
    if orders.is_empty() {
        warn!("⚠️ 订单文件中没有数据行");
    }
    log_orders_loaded(orders.len());

    let flow = OrderFlow::new(&ui, config);
    let mut summary = RunSummary {
        total: orders.len(),
        ..Default::default()
    };

    // ========== 逐单处理 ==========
    for (index, order) in orders.iter().enumerate() {
        let ctx = OrderCtx::new(&order.order_number, index + 1, orders.len());
        log_order_start(&ctx, order);

        let result = match navigation.dismiss_interstitial().await {
            Ok(_) => flow.run(order, &ctx).await,
            Err(e) => Err(e),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} ❌ 订单处理中止: {}", ctx, e);
                if config.screenshot_on_failure {
                    save_failure_screenshot(&ui, config, &order.order_number).await;
                }
                return Err(e);
            }
        };

        match &outcome.status {
            SubmissionStatus::Submitted { .. } => summary.submitted += 1,
            SubmissionStatus::Failed { reason } => {
                failure_log.record(&order.order_number, reason)?;
                summary.failed.push(order.order_number.clone());
            }
        }
        summary.outcomes.push(outcome);
    }

    // ========== 归档 ==========
    let extra = if config.archive_include_images {
        vec![(config.images_dir.clone(), "images".to_string())]
    } else {
        Vec::new()
    };
    summary.archived_entries =
        Archiver::new().archive_with_extra(&config.receipts_dir, &extra, &config.archive_path)?;
    summary.archive_path = config.archive_path.clone();

    print_final_stats(&summary, &config.failure_log_file.display().to_string());
    Ok(summary)
}

/// 保存出错现场的整页截图到 `failure_{订单号}.png`
///
/// 截图失败只记录警告，不覆盖原来的错误。
async fn save_failure_screenshot(
    ui: &UiActions<'_>,
    config: &Config,
    order_number: &str,
) -> Option<PathBuf> {
    let path = config
        .failure_screenshot_dir
        .join(format!("failure_{}.png", order_number));

    let saved = async {
        let bytes = ui.screenshot_page().await?;
        tokio::fs::create_dir_all(&config.failure_screenshot_dir).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok::<_, AppError>(())
    }
    .await;

    match saved {
        Ok(()) => {
            info!("📸 已保存出错截图: {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("⚠️ 保存出错截图失败: {}", e);
            None
        }
    }
}

/// 创建输出目录（已存在不报错）
pub fn prepare_output_dirs(config: &Config) -> AppResult<()> {
    std::fs::create_dir_all(&config.images_dir)?;
    std::fs::create_dir_all(&config.receipts_dir)?;
    Ok(())
}
