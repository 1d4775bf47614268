//! # Tab名称解析
//!
//! 工作表有两种组织方式：
//! - **模式Tab**: 名称形如 `Subject_Grade`（如 `Math_K`、`Social Studies_3`），
//!   或高中学科的裸名称（`Algebra1`、`Precalculus`），学科和年级从名称得出
//! - **汇总Tab**: 名称在配置的汇总表列表中（默认 `Sheet1`），每行自带 `Subject`/`Grade` 列
//!
//! 别名归一化只在这里发生：`PreK`/`Pre K` → `Pre-K`，`Kindergarten` → `K`，
//! `Grade7`/`7th` → `7`，`Social Studies` → `SocialStudies` 等。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::enums::{Grade, Subject};
use crate::models::structs::RawRow;
use crate::utils::error::{AppError, AppResult};

/// 汇总Tab中的学科列
pub const SUBJECT_COLUMN: &str = "Subject";
/// 汇总Tab中的年级列
pub const GRADE_COLUMN: &str = "Grade";

static TAB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z ]*?)\s*_\s*([A-Za-z0-9][A-Za-z0-9 \-]*?)\s*$").expect("valid regex")
});

static NUMBERED_GRADE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:grade|gr|g)?(\d{1,2})(?:st|nd|rd|th)?(?:grade)?$").expect("valid regex")
});

/// Tab的解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabMode {
    /// 学科年级由Tab名称决定
    Pattern { subject: Subject, grade: Grade },
    /// 学科年级由每行的列决定
    Consolidated,
}

/// Tab名称解析器
#[derive(Debug, Clone)]
pub struct TabInterpreter {
    consolidated_sheets: Vec<String>,
}

impl TabInterpreter {
    pub fn new(consolidated_sheets: Vec<String>) -> Self {
        Self { consolidated_sheets }
    }

    pub fn is_consolidated(&self, tab_name: &str) -> bool {
        self.consolidated_sheets.iter().any(|s| s == tab_name.trim())
    }

    /// 解析Tab名称
    ///
    /// 名称不匹配任何模式，或学科/年级无法识别时返回 `UnrecognizedTabName`
    pub fn interpret(&self, tab_name: &str) -> AppResult<TabMode> {
        if self.is_consolidated(tab_name) {
            return Ok(TabMode::Consolidated);
        }

        // 高中学科的裸名称：年级与学科同名
        if let Some(subject) = normalize_subject(tab_name).filter(Subject::is_high_school) {
            return Ok(TabMode::Pattern { subject, grade: high_school_grade(subject) });
        }

        let captures = TAB_PATTERN.captures(tab_name).ok_or_else(|| {
            AppError::unrecognized_tab_name(tab_name, "名称不符合 Subject_Grade 格式")
        })?;
        let subject_token = captures.get(1).map_or("", |m| m.as_str());
        let grade_token = captures.get(2).map_or("", |m| m.as_str());

        let subject = normalize_subject(subject_token).ok_or_else(|| {
            AppError::unrecognized_tab_name(tab_name, format!("无法识别的学科: {}", subject_token))
        })?;
        let grade = normalize_grade(grade_token).ok_or_else(|| {
            AppError::unrecognized_tab_name(tab_name, format!("无法识别的年级: {}", grade_token))
        })?;

        Ok(TabMode::Pattern { subject, grade })
    }
}

fn high_school_grade(subject: Subject) -> Grade {
    match subject {
        Subject::Precalculus => Grade::Precalculus,
        _ => Grade::Algebra1,
    }
}

/// 比较用的紧凑形式：小写并去掉空格、连字符、下划线
fn compact(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// 学科别名归一化
pub fn normalize_subject(token: &str) -> Option<Subject> {
    let subject = match compact(token).as_str() {
        "math" | "maths" | "mathematics" => Subject::Math,
        "ela" | "english" | "englishlanguagearts" | "languagearts" | "reading" => Subject::Ela,
        "science" => Subject::Science,
        "socialstudies" | "social" => Subject::SocialStudies,
        "algebra1" | "algebrai" => Subject::Algebra1,
        "precalculus" | "precalc" => Subject::Precalculus,
        _ => return None,
    };
    Some(subject)
}

/// 年级别名归一化
pub fn normalize_grade(token: &str) -> Option<Grade> {
    let compacted = compact(token);
    let grade = match compacted.as_str() {
        "prek" | "prekindergarten" | "pk" => Grade::PreK,
        "k" | "kg" | "kindergarten" => Grade::K,
        "algebra1" | "algebrai" => Grade::Algebra1,
        "precalculus" | "precalc" => Grade::Precalculus,
        other => {
            let digits = NUMBERED_GRADE.captures(other)?.get(1)?.as_str();
            let n = digits.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            Grade::Numbered(n)
        }
    };
    Some(grade)
}

/// 读取汇总Tab行的学科和年级
///
/// 能识别的别名转换为规范字符串，无法识别的原样保留交给校验器拒绝，缺失时为空串
pub fn consolidated_subject_grade(row: &RawRow) -> (String, String) {
    let subject = row
        .text(SUBJECT_COLUMN)
        .map(|raw| normalize_subject(&raw).map(|s| s.to_string()).unwrap_or(raw))
        .unwrap_or_default();
    let grade = row
        .text(GRADE_COLUMN)
        .map(|raw| normalize_grade(&raw).map(|g| g.to_string()).unwrap_or(raw))
        .unwrap_or_default();
    (subject, grade)
}
