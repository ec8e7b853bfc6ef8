//! 失败订单记录 - 业务能力层
//!
//! 只负责"写 failed_orders.txt"能力，不关心流程

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AppResult;

/// 失败订单记录
///
/// 职责：
/// - 运行开始时写入带时间戳的表头
/// - 每个提交失败的订单追加一行
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 覆盖写入本次运行的表头
    pub fn init(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let header = format!(
            "{}\n失败订单记录 - {}\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.path, header)?;
        Ok(())
    }

    /// 追加一条失败记录
    pub fn record(&self, order_number: &str, reason: &str) -> AppResult<()> {
        debug!("记录失败订单: {} | {}", order_number, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "订单 {} | {}", order_number, reason)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_resets_and_record_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("out/failed_orders.txt"));

        log.init().unwrap();
        log.record("old", "上次运行").unwrap();
        log.init().unwrap();
        log.record("3", "提交失败").unwrap();
        log.record("9", "提交失败").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("失败订单记录"));
        assert!(!content.contains("old"));
        assert!(content.ends_with("订单 3 | 提交失败\n订单 9 | 提交失败\n"));
    }
}
