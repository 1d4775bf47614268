// 文件: src/services/infrastructure/persistence/sqlite_orm_skill_store.rs
// 详细注释：使用SeaORM和SQLite实现技能存储，唯一索引冲突映射为 DuplicateKey

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder, SqlErr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database_migration::DatabaseMigration;
use crate::models::entities::skill;
use crate::models::structs::SkillRecord;
use crate::services::traits::{BaseService, SkillStore};
use crate::utils::error::{AppError, AppResult};

// 默认的SQLite数据库文件名
const DEFAULT_DB_FILE: &str = "skills_master.sqlite";
// 数据库URL前缀
const SQLITE_URL_PREFIX: &str = "sqlite://";

/// 基于SeaORM和SQLite的技能存储实现
pub struct SqliteOrmSkillStore {
    db_conn: Arc<DatabaseConnection>,
    db_file_path: Option<PathBuf>, // 内存数据库时为None
}

impl SqliteOrmSkillStore {
    /// 打开（必要时创建）SQLite文件并执行迁移
    ///
    /// # Arguments
    ///
    /// * `db_path_opt` - SQLite数据库文件的可选路径。如果为None，则使用当前目录下的默认文件。
    pub async fn new(db_path_opt: Option<&Path>) -> AppResult<Self> {
        let db_file_path = db_path_opt
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join(DEFAULT_DB_FILE));

        // 确保数据库文件的父目录存在
        if let Some(parent_dir) = db_file_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                tokio::fs::create_dir_all(parent_dir).await.map_err(|e| {
                    AppError::io_error(format!("创建数据库目录失败: {:?}", parent_dir), e.kind().to_string())
                })?;
            }
        }

        let db_url = format!("{}{}?mode=rwc", SQLITE_URL_PREFIX, db_file_path.to_string_lossy());
        let conn = Database::connect(&db_url)
            .await
            .map_err(|e| AppError::database_error(format!("连接数据库失败 {}: {}", db_url, e)))?;

        Self::from_connection(conn, Some(db_file_path)).await
    }

    /// 内存数据库，测试和演练使用
    pub async fn new_in_memory() -> AppResult<Self> {
        let conn = Database::connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::database_error(format!("连接内存数据库失败: {}", e)))?;
        Self::from_connection(conn, None).await
    }

    async fn from_connection(conn: DatabaseConnection, db_file_path: Option<PathBuf>) -> AppResult<Self> {
        DatabaseMigration::migrate(&conn).await?;
        Ok(Self {
            db_conn: Arc::new(conn),
            db_file_path,
        })
    }

    pub fn db_file_path(&self) -> Option<&Path> {
        self.db_file_path.as_deref()
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db_conn.as_ref()
    }

    /// 已存储的技能数量
    pub async fn count_skills(&self) -> AppResult<u64> {
        skill::Entity::find()
            .count(self.db_conn.as_ref())
            .await
            .map_err(|e| AppError::database_error(format!("统计技能数量失败: {}", e)))
    }

    /// 按插入顺序加载所有技能
    pub async fn load_all_skills(&self) -> AppResult<Vec<SkillRecord>> {
        let models = skill::Entity::find()
            .order_by_asc(skill::Column::CreatedTime)
            .all(self.db_conn.as_ref())
            .await
            .map_err(|e| AppError::database_error(format!("加载技能失败: {}", e)))?;
        models.iter().map(SkillRecord::try_from).collect()
    }
}

/// 把SeaORM错误分类为重复键或一般数据库错误
pub(crate) fn classify_db_error(err: DbErr, context: &str) -> AppError {
    let is_unique_violation = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("UNIQUE constraint failed");

    if is_unique_violation {
        AppError::duplicate_key(format!("{}: {}", context, err))
    } else {
        AppError::database_error(format!("{}: {}", context, err))
    }
}

#[async_trait]
impl BaseService for SqliteOrmSkillStore {
    fn service_name(&self) -> &'static str {
        "SqliteOrmSkillStore"
    }

    async fn initialize(&mut self) -> AppResult<()> {
        // 迁移在构造时已执行，这里重复执行也是幂等的
        DatabaseMigration::migrate(self.db_conn.as_ref()).await?;
        log::info!("{} 已初始化。", self.service_name());
        Ok(())
    }

    async fn shutdown(&mut self) -> AppResult<()> {
        log::info!("{} 已关闭。", self.service_name());
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        self.db_conn
            .ping()
            .await
            .map_err(|e| AppError::database_error(format!("数据库健康检查失败: {}", e)))?;
        log::debug!("数据库连接健康。");
        Ok(())
    }
}

#[async_trait]
impl SkillStore for SqliteOrmSkillStore {
    async fn insert_batch(&self, records: &[SkillRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let models: Vec<skill::ActiveModel> = records.iter().map(skill::ActiveModel::from).collect();
        // 单条INSERT语句，唯一约束冲突时整批回滚
        let rows_affected = skill::Entity::insert_many(models)
            .exec_without_returning(self.db_conn.as_ref())
            .await
            .map_err(|e| classify_db_error(e, "批量插入技能失败"))?;

        Ok(rows_affected as usize)
    }

    async fn insert_one(&self, record: &SkillRecord) -> AppResult<()> {
        skill::Entity::insert(skill::ActiveModel::from(record))
            .exec_without_returning(self.db_conn.as_ref())
            .await
            .map_err(|e| classify_db_error(e, &format!("插入技能 {} 失败", record.natural_key())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Grade, Subject};

    fn record(skill_number: &str) -> SkillRecord {
        SkillRecord {
            subject: Subject::Math,
            grade: Grade::K,
            skills_area: "Numbers".to_string(),
            skills_cluster: "A".to_string(),
            skill_number: skill_number.to_string(),
            skill_name: format!("Skill {}", skill_number),
            skill_description: None,
            difficulty_level: 3,
            estimated_time_minutes: 15,
            prerequisites: Vec::new(),
            source_row: 2,
        }
    }

    #[tokio::test]
    async fn test_batch_insert_and_load() {
        let store = SqliteOrmSkillStore::new_in_memory().await.unwrap();
        let inserted = store.insert_batch(&[record("1.1"), record("1.2")]).await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.count_skills().await.unwrap(), 2);

        let loaded = store.load_all_skills().await.unwrap();
        assert!(loaded.iter().any(|r| r.skill_number == "1.2" && r.subject == Subject::Math));
    }

    #[tokio::test]
    async fn test_duplicate_batch_is_rejected_as_duplicate_key() {
        let store = SqliteOrmSkillStore::new_in_memory().await.unwrap();
        store.insert_one(&record("1.1")).await.unwrap();

        let err = store.insert_batch(&[record("1.1"), record("1.2")]).await.unwrap_err();
        assert!(err.is_duplicate_key(), "{:?}", err);
        // 整批回滚
        assert_eq!(store.count_skills().await.unwrap(), 1);

        let err = store.insert_one(&record("1.1")).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_initialize_keeps_natural_key_index() {
        let mut store = SqliteOrmSkillStore::new_in_memory().await.unwrap();
        store.initialize().await.unwrap();

        let db = store.connection();
        assert!(DatabaseMigration::check_table_exists(db, "skills_master").await.unwrap());
        assert!(DatabaseMigration::check_index_exists(db, crate::database_migration::NATURAL_KEY_INDEX)
            .await
            .unwrap());
        assert!(store.db_file_path().is_none());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skills.sqlite");
        {
            let store = SqliteOrmSkillStore::new(Some(&path)).await.unwrap();
            store.insert_one(&record("2.1")).await.unwrap();
            store.health_check().await.unwrap();
        }
        let reopened = SqliteOrmSkillStore::new(Some(&path)).await.unwrap();
        assert_eq!(reopened.count_skills().await.unwrap(), 1);
        assert_eq!(reopened.db_file_path(), Some(path.as_path()));
    }
}
