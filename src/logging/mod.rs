//! # 日志记录模块 (Logging Module)
//!
//! ## 业务说明
//! 记录导入过程中的文件定位、Tab解析、批次写入等事件，
//! 为数据问题排查提供依据
//!
//! ## 日志策略
//! - **业务日志**: 记录导入的每个阶段
//! - **错误日志**: 文件解析失败、数据库写入失败单独打标签，便于检索
//!
//! ## Rust知识点
//! - **日志宏**: 使用log crate的宏系统
//! - **环境配置**: 通过env_logger进行初始化
//! - **格式化**: 自定义日志输出格式和时间戳

pub mod logger_config;

pub use logger_config::*;

/// 记录文件解析失败日志
#[macro_export]
macro_rules! log_file_parsing_failure {
    ($msg:expr) => {
        log::error!("[文件解析失败] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::error!("[文件解析失败] {}", format!($msg, $($arg)*));
    };
}

/// 记录数据库写入失败日志
#[macro_export]
macro_rules! log_database_failure {
    ($msg:expr) => {
        log::error!("[数据库写入失败] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::error!("[数据库写入失败] {}", format!($msg, $($arg)*));
    };
}

/// 记录导入操作日志
#[macro_export]
macro_rules! log_import_operation {
    ($msg:expr) => {
        log::info!("[导入操作] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::info!("[导入操作] {}", format!($msg, $($arg)*));
    };
}

/// 记录配置警告
#[macro_export]
macro_rules! log_config_warning {
    ($msg:expr) => {
        log::warn!("[配置警告] {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        log::warn!("[配置警告] {}", format!($msg, $($arg)*));
    };
}

// 重新导出宏
pub use log_config_warning;
pub use log_database_failure;
pub use log_file_parsing_failure;
pub use log_import_operation;
