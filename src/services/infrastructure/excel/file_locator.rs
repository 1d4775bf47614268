//! 输入文件定位：按顺序尝试首选路径和候选路径，返回第一个存在的文件

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

pub struct FileLocator;

impl FileLocator {
    /// 全部不存在时返回 `FileNotFound`，错误中列出所有尝试过的路径
    pub fn locate(preferred: &Path, fallbacks: &[PathBuf]) -> AppResult<PathBuf> {
        let candidates = std::iter::once(preferred).chain(fallbacks.iter().map(PathBuf::as_path));

        let mut attempted = Vec::new();
        for candidate in candidates {
            if candidate.is_file() {
                log::info!("找到输入文件: {}", candidate.display());
                return Ok(candidate.to_path_buf());
            }
            log::debug!("候选文件不存在: {}", candidate.display());
            attempted.push(candidate.display().to_string());
        }

        Err(AppError::file_not_found(attempted))
    }
}
