/// 技能数据存储实现
pub mod sqlite_orm_skill_store;
pub mod rest_skill_store;

pub use rest_skill_store::RestSkillStore;
pub use sqlite_orm_skill_store::SqliteOrmSkillStore;
