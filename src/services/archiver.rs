//! 归档 - 业务能力层
//!
//! 运行结束时把回执目录整体打成 zip

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AppResult;

/// 归档服务
#[derive(Debug, Default)]
pub struct Archiver;

impl Archiver {
    pub fn new() -> Self {
        Self
    }

    /// 递归压缩 `source_dir`，覆盖已有的 `dest`，返回写入的条目名
    pub fn archive(&self, source_dir: &Path, dest: &Path) -> AppResult<Vec<String>> {
        self.archive_with_extra(source_dir, &[], dest)
    }

    /// 压缩 `source_dir`，另外把 `extra` 中的目录放在各自前缀下
    pub fn archive_with_extra(
        &self,
        source_dir: &Path,
        extra: &[(PathBuf, String)],
        dest: &Path,
    ) -> AppResult<Vec<String>> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(dest)?;
        // 压缩包本身可能位于被压缩的目录中，遍历时排除
        let dest_abs = absolute(dest);
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut entries = Vec::new();
        add_dir(&mut zip, source_dir, "", &dest_abs, options, &mut entries)?;
        for (dir, prefix) in extra {
            let prefix = format!("{}/", prefix.trim_end_matches('/'));
            zip.add_directory(prefix.as_str(), options)?;
            entries.push(prefix.clone());
            add_dir(&mut zip, dir, &prefix, &dest_abs, options, &mut entries)?;
        }
        zip.finish()?;

        info!("📦 已生成压缩包 {} ({} 个条目)", dest.display(), entries.len());
        Ok(entries)
    }
}

fn add_dir(
    zip: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    exclude: &Path,
    options: SimpleFileOptions,
    entries: &mut Vec<String>,
) -> AppResult<()> {
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if absolute(path) == exclude {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let name = format!("{}{}", prefix, entry_name(relative));

        if entry.file_type().is_dir() {
            let name = format!("{}/", name);
            zip.add_directory(name.as_str(), options)?;
            entries.push(name);
        } else {
            debug!("压缩: {}", name);
            zip.start_file(name.as_str(), options)?;
            let mut file = File::open(path)?;
            io::copy(&mut file, zip)?;
            entries.push(name);
        }
    }
    Ok(())
}

/// zip 条目名统一使用 `/` 分隔
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}
