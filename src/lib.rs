/// 技能库Excel导入器 - 核心库
///
/// 导入流程：定位文件 → 读取工作簿 → 逐Tab解析/归一化/校验 → 批次写入 → 汇总报告
pub mod models;
pub mod utils;
pub mod error;
pub mod services;
pub mod logging;
pub mod database_migration;

// 重新导出常用类型，方便使用
pub use models::*;
pub use utils::{AppConfig, AppError, AppResult, ConfigManager};
pub use services::*;
