use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::services::domain::heuristics::OrdinalSource;
use crate::utils::error::{AppError, AppResult};

/// 数据存储地址的环境变量（两套命名方案互为后备）
pub const ENV_STORE_URL: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
/// 数据存储密钥的环境变量
pub const ENV_STORE_KEY: [&str; 2] = ["SUPABASE_SERVICE_ROLE_KEY", "VITE_SUPABASE_ANON_KEY"];

/// 应用程序主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 导入流程配置
    #[serde(default)]
    pub importer_config: ImporterConfig,
    /// 数据存储配置
    #[serde(default)]
    pub datastore_config: DatastoreConfig,
    /// 日志配置
    #[serde(default)]
    pub logging_config: LoggingConfig,
}

/// 导入流程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// 首选的Excel文件路径
    pub input_file: PathBuf,
    /// 首选路径不存在时依次尝试的候选路径
    pub fallback_files: Vec<PathBuf>,
    /// 以行级 Subject/Grade 列组织数据的工作表名称
    pub consolidated_sheets: Vec<String>,
    /// 每批插入的记录数
    pub batch_size: usize,
    /// 批次请求之间的固定间隔（毫秒），0表示不等待
    pub batch_delay_ms: u64,
    /// 难度计算时从技能编号提取序号的方式
    pub ordinal_source: OrdinalSource,
}

/// 数据存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST 风格的远程存储
    Rest,
    /// 本地SQLite（SeaORM）
    Sqlite,
}

/// 数据存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    pub backend: StoreBackend,
    /// 远程存储地址
    pub url: Option<String>,
    /// 远程存储访问密钥
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// 目标表名
    pub table_name: String,
    /// 本地SQLite文件路径
    pub sqlite_path: PathBuf,
    /// 单次请求超时时间（毫秒）
    pub request_timeout_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 日志文件路径，None 时只输出到控制台
    pub log_file_path: Option<PathBuf>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("data/skills_master.xlsx"),
            fallback_files: vec![
                PathBuf::from("skills_master.xlsx"),
                PathBuf::from("data/Skills_Master.xlsx"),
            ],
            consolidated_sheets: vec!["Sheet1".to_string()],
            batch_size: 50,
            batch_delay_ms: 0,
            ordinal_source: OrdinalSource::default(),
        }
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Rest,
            url: None,
            api_key: None,
            table_name: "skills_master".to_string(),
            sqlite_path: PathBuf::from("skills_master.sqlite"),
            request_timeout_ms: 30000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file_path: None,
        }
    }
}

/// 配置管理器
/// 负责加载和校验应用程序配置
pub struct ConfigManager {
    config: AppConfig,
    config_file_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建新的配置管理器，未指定文件时使用默认配置
    pub fn new(config_file_path: Option<PathBuf>) -> Self {
        Self {
            config: AppConfig::default(),
            config_file_path,
        }
    }

    /// 从文件加载配置
    pub async fn load_from_file(&mut self) -> AppResult<()> {
        let path = match &self.config_file_path {
            Some(path) => path.clone(),
            None => return Ok(()),
        };

        if !path.exists() {
            return Err(AppError::configuration_error(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::io_error(format!("读取配置文件失败: {}", e), e.kind().to_string()))?;

        self.config = Self::parse(&content, &path)?;
        log::info!("已加载配置文件: {}", path.display());
        Ok(())
    }

    fn parse(content: &str, path: &Path) -> AppResult<AppConfig> {
        serde_json::from_str(content).map_err(|e| {
            AppError::configuration_error(format!("解析配置文件失败 {}: {}", path.display(), e))
        })
    }

    /// 从进程环境变量覆盖配置
    pub fn override_from_env(&mut self) {
        self.override_from(|key| std::env::var(key).ok());
    }

    /// 从任意键值来源覆盖配置
    pub fn override_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_of = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(url) = first_of(&ENV_STORE_URL[..]) {
            self.config.datastore_config.url = Some(url);
        }
        if let Some(key) = first_of(&ENV_STORE_KEY[..]) {
            self.config.datastore_config.api_key = Some(key);
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.config.logging_config.log_level = log_level.to_lowercase();
        }
        if let Some(batch_size) = lookup("SKILLS_IMPORT_BATCH_SIZE") {
            match batch_size.parse::<usize>() {
                Ok(size) => self.config.importer_config.batch_size = size,
                Err(_) => {
                    crate::log_config_warning!("忽略无效的 SKILLS_IMPORT_BATCH_SIZE: {}", batch_size);
                }
            }
        }
    }

    /// 获取配置的只读引用
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取配置的可变引用
    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// 验证配置的有效性
    pub fn validate_config(&self) -> AppResult<()> {
        if self.config.importer_config.batch_size == 0 {
            return Err(AppError::configuration_error("批次大小必须大于0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging_config.log_level.as_str()) {
            return Err(AppError::configuration_error(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.config.logging_config.log_level, valid_log_levels
            )));
        }

        if self.config.datastore_config.table_name.trim().is_empty() {
            return Err(AppError::configuration_error("目标表名不能为空"));
        }

        Ok(())
    }

    /// 验证远程存储凭据，缺失时启动即失败（dry-run 不需要）
    pub fn validate_credentials(&self) -> AppResult<()> {
        let datastore = &self.config.datastore_config;
        if datastore.backend != StoreBackend::Rest {
            return Ok(());
        }
        if datastore.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(AppError::configuration_error(format!(
                "缺少数据存储地址，请设置 {} 或 {}",
                ENV_STORE_URL[0], ENV_STORE_URL[1]
            )));
        }
        if datastore.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(AppError::configuration_error(format!(
                "缺少数据存储密钥，请设置 {} 或 {}",
                ENV_STORE_KEY[0], ENV_STORE_KEY[1]
            )));
        }
        Ok(())
    }
}
