//! 集成测试公共工具：脚本化的假页面、本地 HTTP 服务、日志捕获
#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use robot_order::{AppError, AppResult, Config, Locator, PageDriver, SiteLocators, WaitConfig};

pub const CSV_HEADER: &str = "Order number,Head,Body,Legs,Address\n";

/// 假站点的行为脚本
#[derive(Debug, Clone)]
pub struct FakeSite {
    /// 每单前 N 次点击提交后都会出现错误提示
    pub failing_submits: usize,
    pub submit_present: bool,
    /// 打开页面和每次复位后是否弹窗
    pub modal_present: bool,
    /// 即使提交失败也显示回执元素
    pub receipt_always: bool,
    pub order_another_present: bool,
    /// 预览按钮是否存在
    pub preview_present: bool,
}

impl Default for FakeSite {
    fn default() -> Self {
        Self {
            failing_submits: 0,
            submit_present: true,
            modal_present: true,
            receipt_always: false,
            order_another_present: true,
            preview_present: true,
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    actions: Vec<String>,
    submit_clicks: usize,
    modal_visible: bool,
    visibility_checks: HashMap<String, usize>,
}

/// 按 [`FakeSite`] 脚本响应的页面驱动，记录所有动作
pub struct FakePage {
    site: FakeSite,
    locators: SiteLocators,
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            locators: SiteLocators::default(),
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    /// 某个动作出现的次数，例如 `"click:css:#order"`
    pub fn count(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| a.as_str() == action).count()
    }

    /// 某个元素被检查可见性的次数
    pub fn visibility_checks(&self, locator: &Locator) -> usize {
        let state = self.state.lock().unwrap();
        state
            .visibility_checks
            .get(&locator.to_string())
            .copied()
            .unwrap_or(0)
    }

    fn submitted(&self, state: &FakeState) -> bool {
        state.submit_clicks > self.site.failing_submits
    }

    fn banner_visible(&self, state: &FakeState) -> bool {
        state.submit_clicks > 0 && !self.submitted(state)
    }

    fn receipt_visible(&self, state: &FakeState) -> bool {
        self.submitted(state) || self.site.receipt_always
    }

    fn record(&self, action: String) {
        self.state.lock().unwrap().actions.push(action);
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(format!("goto:{}", url));
        state.modal_visible = self.site.modal_present;
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        *state
            .visibility_checks
            .entry(locator.to_string())
            .or_insert(0) += 1;
        let l = &self.locators;
        let visible = if *locator == l.modal_confirm {
            state.modal_visible
        } else if *locator == l.submit {
            self.site.submit_present
        } else if *locator == l.failure_banner {
            self.banner_visible(&state)
        } else if *locator == l.receipt {
            self.receipt_visible(&state)
        } else if *locator == l.preview {
            self.site.preview_present
        } else if *locator == l.order_another_text || *locator == l.order_another {
            self.site.order_another_present && self.submitted(&state)
        } else {
            true
        };
        Ok(visible)
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(format!("click:{}", locator));
        let l = &self.locators;
        if *locator == l.modal_confirm {
            state.modal_visible = false;
        } else if *locator == l.preview {
            state.submit_clicks = 0;
        } else if *locator == l.submit {
            state.submit_clicks += 1;
        } else if *locator == l.order_another {
            state.submit_clicks = 0;
            state.modal_visible = self.site.modal_present;
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.record(format!("fill:{}={}", locator, value));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.record(format!("select:{}={}", locator, value));
        Ok(())
    }

    async fn inner_html(&self, locator: &Locator) -> AppResult<Option<String>> {
        let state = self.state.lock().unwrap();
        if *locator == self.locators.receipt && self.receipt_visible(&state) {
            Ok(Some("<h3>Receipt</h3><p>Thank you for your order!</p>".to_string()))
        } else {
            Ok(None)
        }
    }

    async fn screenshot_element(&self, locator: &Locator) -> AppResult<Vec<u8>> {
        self.record(format!("screenshot:{}", locator));
        Ok(sample_png())
    }

    async fn screenshot_page(&self) -> AppResult<Vec<u8>> {
        self.record("screenshot_page".to_string());
        Ok(sample_png())
    }

    async fn html_to_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        if !html.contains("Receipt") {
            return Err(AppError::MalformedInput("unexpected receipt html".to_string()));
        }
        Ok(blank_pdf())
    }
}

/// 6x4 的纯色 PNG
pub fn sample_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(6, 4, Rgb([40, 120, 200]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// 只有一页空白页的 PDF
pub fn blank_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// PDF 中是否有图片 XObject
pub fn pdf_has_image(path: &Path) -> bool {
    let doc = Document::load(path).unwrap();
    doc.objects.values().any(|obj| match obj {
        Object::Stream(s) => s
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|n| n == b"Image")
            .unwrap_or(false),
        _ => false,
    })
}

/// 所有路径都落在 `root` 下、等待时间极短的配置
pub fn test_config(root: &Path, orders_csv_url: impl Into<String>) -> Config {
    Config {
        order_site_url: "http://robot.test/#/robot-order".to_string(),
        orders_csv_url: orders_csv_url.into(),
        orders_file: root.join("orders.csv"),
        images_dir: root.join("output/images"),
        receipts_dir: root.join("output/receipts"),
        archive_path: root.join("output/receipts.zip"),
        failure_log_file: root.join("output/failed_orders.txt"),
        failure_screenshot_dir: root.join("output"),
        wait: WaitConfig {
            action_timeout_ms: 50,
            poll_interval_ms: 1,
            settle_delay_ms: 0,
            interstitial_timeout_ms: 5,
        },
        ..Config::default()
    }
}

/// 启动一个本地 HTTP 服务，对任意请求返回固定的状态码和内容
///
/// 返回 `http://127.0.0.1:<port>/orders.csv`
pub async fn serve(status: u16, body: impl Into<String>) -> String {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/orders.csv", addr)
}

/// 捕获日志输出的缓冲区
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// 在当前线程安装捕获日志的 subscriber，guard 释放前有效
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
