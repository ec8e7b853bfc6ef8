//! 订单源 - 业务能力层
//!
//! 只负责"下载并解析订单 CSV"能力

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{OrderRecord, REQUIRED_COLUMNS};

/// 订单源
///
/// 每次调用都会重新下载并覆盖本地文件，可以安全重试。
pub struct OrderSource {
    client: reqwest::Client,
    url: String,
    local_file: PathBuf,
}

impl OrderSource {
    pub fn new(url: impl Into<String>, local_file: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            local_file: local_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.orders_csv_url.clone(), config.orders_file.clone())
    }

    /// 下载并解析，返回按文件顺序排列的订单
    pub async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
        let body = self.download_body().await?;
        let orders = parse_orders(body.as_slice())?;
        info!("✓ 从 {} 解析出 {} 个订单", self.local_file.display(), orders.len());
        Ok(orders)
    }

    /// 下载订单文件，覆盖本地同名文件
    pub async fn download(&self) -> AppResult<&Path> {
        self.download_body().await?;
        Ok(self.local_file.as_path())
    }

    /// 下载并落盘，返回内存中的内容
    async fn download_body(&self) -> AppResult<Vec<u8>> {
        debug!("下载订单文件: {} → {}", self.url, self.local_file.display());

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::source_unavailable(&self.url, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::source_unavailable(&self.url, e))?;

        if let Some(parent) = self.local_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::source_unavailable(&self.url, e))?;
        }
        tokio::fs::write(&self.local_file, &body)
            .await
            .map_err(|e| AppError::source_unavailable(&self.url, e))?;

        debug!("订单文件已保存 ({} 字节)", body.len());
        Ok(body.to_vec())
    }
}

/// 解析订单 CSV
///
/// 必须有表头且包含全部必需列；只有表头没有数据行时返回空列表。
pub fn parse_orders<R: Read>(reader: R) -> AppResult<Vec<OrderRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AppError::MalformedInput(format!("无法读取表头: {}", e)))?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::MalformedInput("缺少表头".to_string()));
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MalformedInput(format!(
            "缺少列: {}",
            missing.join(", ")
        )));
    }

    let mut orders = Vec::new();
    let mut seen = HashSet::new();
    for (index, row) in rdr.deserialize::<OrderRecord>().enumerate() {
        // 第 1 行是表头
        let line = index + 2;
        let order =
            row.map_err(|e| AppError::MalformedInput(format!("第 {} 行解析失败: {}", line, e)))?;
        order.validate()?;

        if !seen.insert(order.order_number.clone()) {
            warn!(
                "⚠️ 订单号 {} 重复 (第 {} 行)，输出文件将被覆盖",
                order.order_number, line
            );
        }
        orders.push(order);
    }

    Ok(orders)
}
