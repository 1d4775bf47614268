use crate::models::enums::{Grade, Subject};
use crate::models::structs::{SkillDraft, SkillRecord, ValidationError};
use crate::services::domain::heuristics::{MAX_DIFFICULTY, MIN_DIFFICULTY, MIN_MINUTES};

/// 技能记录校验器
///
/// 所有检查都会执行，失败项全部收集后一起返回
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillValidator;

impl SkillValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, draft: SkillDraft) -> Result<SkillRecord, Vec<ValidationError>> {
        let row = draft.row_number;
        let mut errors = Vec::new();

        if draft.skill_name.trim().is_empty() {
            errors.push(ValidationError::new("skill_name", &draft.skill_name, row));
        }

        let subject = draft.subject.parse::<Subject>();
        if subject.is_err() {
            errors.push(ValidationError::new("subject", &draft.subject, row));
        }

        let grade = draft.grade.parse::<Grade>();
        if grade.is_err() {
            errors.push(ValidationError::new("grade", &draft.grade, row));
        }

        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&draft.difficulty_level) {
            errors.push(ValidationError::new(
                "difficulty_level",
                draft.difficulty_level.to_string(),
                row,
            ));
        }

        let minutes = draft.estimated_time_minutes;
        if minutes < MIN_MINUTES || minutes % 5 != 0 {
            errors.push(ValidationError::new("estimated_time_minutes", minutes.to_string(), row));
        }

        match (subject, grade) {
            (Ok(subject), Ok(grade)) if errors.is_empty() => Ok(SkillRecord {
                subject,
                grade,
                skills_area: draft.skills_area,
                skills_cluster: draft.skills_cluster,
                skill_number: draft.skill_number,
                skill_name: draft.skill_name,
                skill_description: draft.skill_description,
                difficulty_level: draft.difficulty_level,
                estimated_time_minutes: draft.estimated_time_minutes,
                prerequisites: Vec::new(),
                source_row: row,
            }),
            _ => Err(errors),
        }
    }
}
