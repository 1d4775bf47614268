use std::sync::Arc;

use super::column_mapping::ColumnTemplate;
use super::heuristics::HeuristicTables;
use crate::models::structs::{RawRow, SkillDraft};

pub const DEFAULT_SKILLS_AREA: &str = "General";
pub const DEFAULT_SKILLS_CLUSTER: &str = "A";

/// 技能归一化器
///
/// 把原始行加上已解析的学科年级转换为技能草稿，并计算派生的难度和时长
#[derive(Debug, Clone)]
pub struct SkillNormalizer {
    tables: Arc<HeuristicTables>,
}

impl SkillNormalizer {
    pub fn new(tables: Arc<HeuristicTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &HeuristicTables {
        &self.tables
    }

    /// 没有技能名称的行返回 `None`（静默跳过，不计为错误）
    pub fn normalize(
        &self,
        row: &RawRow,
        template: &ColumnTemplate,
        subject: &str,
        grade: &str,
    ) -> Option<SkillDraft> {
        let skill_name = row.text(template.skill_name)?;

        let skills_area = row
            .text(template.skills_area)
            .unwrap_or_else(|| DEFAULT_SKILLS_AREA.to_string());
        let skills_cluster = row
            .text(template.skills_cluster)
            .unwrap_or_else(|| DEFAULT_SKILLS_CLUSTER.to_string());
        let skill_number = row
            .text(template.skill_number)
            .unwrap_or_else(|| format!("{}.{}", skills_cluster, row.row_number));
        let skill_description = row.text(template.skill_description);

        let difficulty_level = self.tables.calculate_difficulty(grade, &skill_number, &skill_name);
        let estimated_time_minutes = self.tables.estimate_minutes(grade, subject, difficulty_level);

        Some(SkillDraft {
            subject: subject.to_string(),
            grade: grade.to_string(),
            skills_area,
            skills_cluster,
            skill_number,
            skill_name,
            skill_description,
            difficulty_level,
            estimated_time_minutes,
            row_number: row.row_number,
        })
    }
}
