// 文件: src/models/entities/skill.rs
// 详细注释：SkillRecord实体的SeaORM定义

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::structs::{default_id, SkillRecord};
use crate::utils::error::AppError;

/// 技能表实体
///
/// (subject, grade, skill_number) 上有唯一索引，由 `DatabaseMigration` 创建
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skills_master")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,

    pub subject: String,                    // Math/ELA/Science/...
    pub grade: String,                      // Pre-K/K/1..12/Algebra1/Precalculus
    pub skills_area: String,                // 技能领域，如 "Numbers"
    pub skills_cluster: String,             // 技能簇，如 "A"
    pub skill_number: String,               // 技能编号，如 "A.1"
    pub skill_name: String,
    #[sea_orm(nullable)]
    pub skill_description: Option<String>,

    pub difficulty_level: i32,              // 1-10
    pub estimated_time_minutes: i32,        // >=5，5的倍数

    #[sea_orm(column_type = "Text")]
    pub prerequisites: String,              // JSON数组

    pub created_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(default_id()),
            created_time: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

// 业务结构体 -> ActiveModel，批量插入时使用
impl From<&SkillRecord> for ActiveModel {
    fn from(record: &SkillRecord) -> Self {
        Self {
            id: Set(default_id()),
            subject: Set(record.subject.to_string()),
            grade: Set(record.grade.to_string()),
            skills_area: Set(record.skills_area.clone()),
            skills_cluster: Set(record.skills_cluster.clone()),
            skill_number: Set(record.skill_number.clone()),
            skill_name: Set(record.skill_name.clone()),
            skill_description: Set(record.skill_description.clone()),
            difficulty_level: Set(record.difficulty_level),
            estimated_time_minutes: Set(record.estimated_time_minutes),
            prerequisites: Set(serde_json::to_string(&record.prerequisites).unwrap_or_else(|_| "[]".to_string())),
            created_time: Set(Utc::now()),
        }
    }
}

// Model -> 业务结构体，数据库中的学科/年级必须仍是合法值
impl TryFrom<&Model> for SkillRecord {
    type Error = AppError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        Ok(SkillRecord {
            subject: model.subject.parse().map_err(AppError::database_error)?,
            grade: model.grade.parse().map_err(AppError::database_error)?,
            skills_area: model.skills_area.clone(),
            skills_cluster: model.skills_cluster.clone(),
            skill_number: model.skill_number.clone(),
            skill_name: model.skill_name.clone(),
            skill_description: model.skill_description.clone(),
            difficulty_level: model.difficulty_level,
            estimated_time_minutes: model.estimated_time_minutes,
            prerequisites: serde_json::from_str(&model.prerequisites)?,
            source_row: 0,
        })
    }
}
