//! 列映射模板
//!
//! 按声明顺序尝试每个模板，第一个必需列全部出现在首行中的模板胜出；
//! 都不匹配时退回标准模板，缺失的字段由下游校验暴露。

use crate::models::structs::RawRow;

/// 一种列布局：规范字段 → 表头名称
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnTemplate {
    pub name: &'static str,
    pub skills_area: &'static str,
    pub skills_cluster: &'static str,
    pub skill_number: &'static str,
    pub skill_name: &'static str,
    pub skill_description: &'static str,
}

pub const STANDARD_TEMPLATE: ColumnTemplate = ColumnTemplate {
    name: "standard",
    skills_area: "SkillsArea",
    skills_cluster: "SkillsCluster",
    skill_number: "SkillNumber",
    skill_name: "SkillName",
    skill_description: "SkillDescription",
};

pub const ALTERNATE_TEMPLATE: ColumnTemplate = ColumnTemplate {
    name: "alternate",
    skills_area: "Skills Area",
    skills_cluster: "Cluster",
    skill_number: "Skill #",
    skill_name: "Skill Name",
    skill_description: "Description",
};

/// 按优先级排列的模板
pub static TEMPLATES: [ColumnTemplate; 2] = [STANDARD_TEMPLATE, ALTERNATE_TEMPLATE];

impl ColumnTemplate {
    /// 必需列（其余列都有默认值）
    pub fn required_columns(&self) -> [&'static str; 1] {
        [self.skill_name]
    }

    pub fn matches(&self, row: &RawRow) -> bool {
        self.required_columns().iter().all(|column| row.has_column(column))
    }

    /// 技能名称列在所有行中都不存在（空单元格不会被保留，整列缺失时所有行都会被静默丢弃）
    pub fn name_column_absent(&self, rows: &[RawRow]) -> bool {
        !rows.is_empty() && rows.iter().all(|row| !row.has_column(self.skill_name))
    }
}

/// 根据首行选择列模板
pub fn select_template(first_row: Option<&RawRow>) -> &'static ColumnTemplate {
    let selected = first_row.and_then(|row| TEMPLATES.iter().find(|template| template.matches(row)));

    match selected {
        Some(template) => {
            log::debug!("使用列映射模板: {}", template.name);
            template
        }
        None => {
            log::warn!("首行未匹配任何列映射模板，使用标准模板");
            &TEMPLATES[0]
        }
    }
}
