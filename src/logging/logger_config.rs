//! 日志配置模块
//!
//! 基于 env_logger 初始化全局日志，统一时间戳格式，可选输出到文件

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

use crate::utils::config::LoggingConfig;
use crate::utils::error::{AppError, AppResult};

/// 解析日志级别字符串，无法识别时按 info 处理
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 实际生效的级别，verbose 至少为 debug
pub fn effective_level(config: &LoggingConfig, verbose: bool) -> LevelFilter {
    let level = parse_level(&config.log_level);
    if verbose {
        level.max(LevelFilter::Debug)
    } else {
        level
    }
}

/// 初始化全局日志
pub fn init_logger(config: &LoggingConfig, verbose: bool) -> AppResult<()> {
    let level = effective_level(config, verbose);

    let mut builder = Builder::new();
    builder
        .filter_level(level)
        // 第三方库只保留警告以上
        .filter_module("sqlx", LevelFilter::Warn)
        .filter_module("sea_orm", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = &config.log_file_path {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| AppError::generic(format!("初始化日志失败，全局日志已设置: {}", e)))
}
