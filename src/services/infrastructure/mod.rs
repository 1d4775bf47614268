/// 基础设施层服务模块
/// 负责与外部系统的交互，如Excel文件读取、数据存储等

/// Excel文件定位与读取
pub mod excel;

/// 数据持久化相关模块
pub mod persistence;

// 重新导出常用实现
pub use excel::{ExcelImporter, FileLocator};
pub use persistence::{RestSkillStore, SqliteOrmSkillStore};
