use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序统一错误类型
/// 用于封装导入流程中可能出现的各种错误，提供统一的错误处理机制
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// 通用错误，包含错误消息
    #[error("通用错误: {message}")]
    Generic { message: String },

    /// 输入/输出错误
    #[error("IO错误: {message} (Kind: {kind})")]
    IoError { message: String, kind: String },

    /// 输入文件不存在
    ///
    /// **业务含义**: 首选路径和所有候选路径都不存在，整个导入任务中止
    #[error("文件不存在，已尝试路径: {}", .attempted.join(", "))]
    FileNotFound { attempted: Vec<String> },

    /// 工作表不存在（Tab级错误，记录后继续处理下一个Tab）
    #[error("工作表不存在: {sheet_name}")]
    SheetNotFound { sheet_name: String },

    /// 无法识别的Tab名称（Tab级错误）
    #[error("无法识别的Tab名称: {tab_name} - {reason}")]
    UnrecognizedTabName { tab_name: String, reason: String },

    /// 唯一约束冲突
    ///
    /// **业务含义**: 批量插入时自然键 (subject, grade, skill_number) 重复
    /// **错误恢复**: 批次降级为逐行插入，逐行的重复记录直接跳过
    #[error("唯一约束冲突: {message}")]
    DuplicateKey { message: String },

    /// 数据库相关错误（非重复键）
    #[error("数据库错误: {message}")]
    DatabaseError { message: String },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    ConfigurationError { message: String },

    /// Excel读取错误
    #[error("Excel读取错误: {message}")]
    ExcelError { message: String },

    /// 网络相关错误
    #[error("网络错误: {message}")]
    NetworkError { message: String },

    /// JSON序列化/反序列化错误
    #[error("JSON序列化/反序列化错误: {message}")]
    JsonError { message: String },
}

impl AppError {
    /// 创建通用错误
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// 创建IO错误
    pub fn io_error(message: impl Into<String>, kind_str: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
            kind: kind_str.into(),
        }
    }

    /// 创建文件不存在错误
    pub fn file_not_found(attempted: Vec<String>) -> Self {
        Self::FileNotFound { attempted }
    }

    /// 创建工作表不存在错误
    pub fn sheet_not_found(sheet_name: impl Into<String>) -> Self {
        Self::SheetNotFound {
            sheet_name: sheet_name.into(),
        }
    }

    /// 创建无法识别的Tab名称错误
    pub fn unrecognized_tab_name(tab_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedTabName {
            tab_name: tab_name.into(),
            reason: reason.into(),
        }
    }

    /// 创建唯一约束冲突错误
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::DuplicateKey {
            message: message.into(),
        }
    }

    /// 创建数据库错误
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 创建Excel读取错误
    pub fn excel_error(message: impl Into<String>) -> Self {
        Self::ExcelError {
            message: message.into(),
        }
    }

    /// 创建网络错误
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// 创建JSON序列化错误
    pub fn json_error(message: impl Into<String>) -> Self {
        Self::JsonError {
            message: message.into(),
        }
    }

    /// 是否为唯一约束冲突
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, AppError::DuplicateKey { .. })
    }

    /// 是否为Tab级错误（记录后继续处理下一个Tab）
    pub fn is_tab_level(&self) -> bool {
        matches!(
            self,
            AppError::SheetNotFound { .. } | AppError::UnrecognizedTabName { .. }
        )
    }

    /// 获取错误的简短描述
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Generic { .. } => "GENERIC",
            AppError::IoError { .. } => "IO_ERROR",
            AppError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AppError::SheetNotFound { .. } => "SHEET_NOT_FOUND",
            AppError::UnrecognizedTabName { .. } => "UNRECOGNIZED_TAB_NAME",
            AppError::DuplicateKey { .. } => "DUPLICATE_KEY",
            AppError::DatabaseError { .. } => "DATABASE_ERROR",
            AppError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            AppError::ExcelError { .. } => "EXCEL_ERROR",
            AppError::NetworkError { .. } => "NETWORK_ERROR",
            AppError::JsonError { .. } => "JSON_ERROR",
        }
    }
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 从标准IO错误转换
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::io_error(error.to_string(), error.kind().to_string())
    }
}

/// 从JSON错误转换
impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::json_error(error.to_string())
    }
}

/// 从calamine错误转换
impl From<calamine::Error> for AppError {
    fn from(error: calamine::Error) -> Self {
        AppError::excel_error(error.to_string())
    }
}

/// 从网络请求错误转换
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::network_error(error.to_string())
    }
}
