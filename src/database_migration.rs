//! # 数据库迁移模块 (Database Migration Module)
//!
//! ## 业务说明
//! 负责创建本地SQLite技能库的表结构和自然键唯一索引。
//! 导入器依赖该唯一索引识别重复记录，索引缺失时重复导入会产生重复行。
//!
//! ## 幂等性设计
//! - 建表和建索引都带 `IF NOT EXISTS`，每次启动都可以安全执行
//!
//! ## 调用链路
//! ```text
//! 导入启动 → SqliteOrmSkillStore::new() → DatabaseMigration::migrate()
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, Schema, Statement};

use crate::error::AppError;
use crate::models::entities::skill;

/// 自然键唯一索引名称
pub const NATURAL_KEY_INDEX: &str = "idx_skills_master_natural_key";

/// 数据库迁移管理器
///
/// 纯工具类，没有实例字段，所有方法都是关联函数
pub struct DatabaseMigration;

impl DatabaseMigration {
    /// 执行全部迁移
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
        log::info!("开始执行数据库迁移...");

        Self::migrate_skills_master(db).await?;
        Self::create_natural_key_index(db).await?;

        log::info!("数据库迁移完成");
        Ok(())
    }

    /// 根据实体定义创建 skills_master 表
    async fn migrate_skills_master(db: &DatabaseConnection) -> Result<(), AppError> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let stmt = schema
            .create_table_from_entity(skill::Entity)
            .if_not_exists()
            .to_owned();
        db.execute(backend.build(&stmt))
            .await
            .map_err(|e| AppError::database_error(format!("创建 skills_master 表失败: {}", e)))?;

        log::debug!("skills_master 表已就绪");
        Ok(())
    }

    /// 创建 (subject, grade, skill_number) 唯一索引
    async fn create_natural_key_index(db: &DatabaseConnection) -> Result<(), AppError> {
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON skills_master (subject, grade, skill_number)",
            NATURAL_KEY_INDEX
        );
        db.execute(Statement::from_string(db.get_database_backend(), sql))
            .await
            .map_err(|e| AppError::database_error(format!("创建自然键唯一索引失败: {}", e)))?;
        Ok(())
    }

    /// 检查表是否存在
    pub async fn check_table_exists(db: &DatabaseConnection, table_name: &str) -> Result<bool, AppError> {
        Self::check_schema_object_exists(db, "table", table_name).await
    }

    /// 检查索引是否存在
    pub async fn check_index_exists(db: &DatabaseConnection, index_name: &str) -> Result<bool, AppError> {
        Self::check_schema_object_exists(db, "index", index_name).await
    }

    async fn check_schema_object_exists(
        db: &DatabaseConnection,
        object_type: &str,
        name: &str,
    ) -> Result<bool, AppError> {
        // 参数化查询 sqlite_master
        let sql = "SELECT name FROM sqlite_master WHERE type=? AND name=?";
        let result = db
            .query_all(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Sqlite,
                sql,
                vec![object_type.into(), name.into()],
            ))
            .await
            .map_err(|e| AppError::database_error(format!("检查{}是否存在失败: {}", object_type, e)))?;

        Ok(!result.is_empty())
    }
}
