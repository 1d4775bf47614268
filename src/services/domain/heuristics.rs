//! # 难度与时长启发式规则表
//!
//! 按年级维护三类不可变查找表，由导入服务在启动时构建后注入归一化器：
//! - 难度规则：基础难度、序号乘数、关键字调整（按声明顺序首个命中生效）
//! - 时长规则：基础分钟数、每难度点分钟数
//! - 学科系数：时长的乘性调整
//!
//! 计算结果始终满足：难度 ∈ [1,10]；时长 ≥ 5 且为 5 的倍数。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 10;
pub const MIN_MINUTES: i32 = 5;
const MINUTE_STEP: f64 = 5.0;

static FIRST_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static LAST_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\D*$").expect("valid regex"));

/// 从技能编号中提取序号的方式
///
/// 编号形如 `"3.12"`：`FirstDigitRun` 取到簇前缀 3，`LastSegment` 取到序号 12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalSource {
    /// 最后一段数字（默认）
    #[default]
    LastSegment,
    /// 第一段连续数字，兼容旧版导入结果
    FirstDigitRun,
}

/// 提取技能编号中的序号，没有数字时为0
pub fn extract_ordinal(skill_number: &str, source: OrdinalSource) -> u32 {
    let digits = match source {
        OrdinalSource::FirstDigitRun => FIRST_DIGIT_RUN.find(skill_number).map(|m| m.as_str()),
        OrdinalSource::LastSegment => LAST_DIGIT_RUN
            .captures(skill_number)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
    };
    // 超长数字串按上限处理，结果最终会被截断到难度上限
    digits.map(|d| d.parse::<u32>().unwrap_or(u32::MAX)).unwrap_or(0)
}

/// 单个年级的难度规则
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRule {
    pub base: i32,
    pub multiplier: f64,
    /// (关键字, 调整值)，关键字为小写
    pub keywords: Vec<(&'static str, i32)>,
}

/// 单个年级的时长规则
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationRule {
    pub base_minutes: f64,
    pub minutes_per_difficulty: f64,
}

/// 启发式规则表集合
#[derive(Debug, Clone)]
pub struct HeuristicTables {
    difficulty: HashMap<String, DifficultyRule>,
    duration: HashMap<String, DurationRule>,
    subject_factors: HashMap<String, f64>,
    fallback_difficulty: DifficultyRule,
    fallback_duration: DurationRule,
    ordinal_source: OrdinalSource,
}

const ELEMENTARY_KEYWORDS: &[(&str, i32)] = &[
    ("word problem", 2),
    ("multi-step", 2),
    ("compare", 1),
    ("explain", 1),
    ("identify", -1),
    ("recognize", -1),
];

const MIDDLE_KEYWORDS: &[(&str, i32)] = &[
    ("analyze", 2),
    ("multi-step", 2),
    ("evaluate", 2),
    ("compare", 1),
    ("identify", -1),
];

const HIGH_KEYWORDS: &[(&str, i32)] = &[
    ("prove", 2),
    ("analyze", 2),
    ("model", 1),
    ("review", -2),
    ("identify", -1),
];

impl HeuristicTables {
    /// 标准规则表
    pub fn standard() -> Self {
        let mut difficulty = HashMap::new();
        let mut duration = HashMap::new();

        let early: &[(&str, i32, f64, f64, f64)] = &[
            // (年级, 基础难度, 序号乘数, 基础分钟, 每难度点分钟)
            ("Pre-K", 1, 0.5, 10.0, 1.0),
            ("K", 3, 0.7, 10.0, 1.5),
        ];
        for &(grade, base, multiplier, base_minutes, per_point) in early {
            difficulty.insert(
                grade.to_string(),
                DifficultyRule {
                    base,
                    multiplier,
                    keywords: vec![("compare", 1), ("write", 1), ("recognize", -1)],
                },
            );
            duration.insert(
                grade.to_string(),
                DurationRule { base_minutes, minutes_per_difficulty: per_point },
            );
        }

        let numbered: &[(u8, i32, f64, f64, f64)] = &[
            (1, 4, 0.8, 15.0, 1.5),
            (2, 4, 0.9, 15.0, 1.5),
            (3, 5, 0.9, 15.0, 2.0),
            (4, 5, 1.0, 15.0, 2.0),
            (5, 6, 1.0, 15.0, 2.0),
            (6, 6, 1.1, 20.0, 2.5),
            (7, 7, 1.2, 20.0, 2.5),
            (8, 7, 1.2, 20.0, 2.5),
            (9, 8, 1.3, 25.0, 3.0),
            (10, 8, 1.3, 25.0, 3.0),
            (11, 9, 1.4, 25.0, 3.0),
            (12, 9, 1.4, 25.0, 3.0),
        ];
        for &(grade, base, multiplier, base_minutes, per_point) in numbered {
            let keywords = match grade {
                1..=5 => ELEMENTARY_KEYWORDS,
                6..=8 => MIDDLE_KEYWORDS,
                _ => HIGH_KEYWORDS,
            };
            difficulty.insert(
                grade.to_string(),
                DifficultyRule { base, multiplier, keywords: keywords.to_vec() },
            );
            duration.insert(
                grade.to_string(),
                DurationRule { base_minutes, minutes_per_difficulty: per_point },
            );
        }

        for &(grade, base, multiplier, base_minutes) in
            &[("Algebra1", 8, 1.3, 25.0), ("Precalculus", 9, 1.5, 30.0)]
        {
            difficulty.insert(
                grade.to_string(),
                DifficultyRule { base, multiplier, keywords: HIGH_KEYWORDS.to_vec() },
            );
            duration.insert(
                grade.to_string(),
                DurationRule { base_minutes, minutes_per_difficulty: 3.0 },
            );
        }

        let subject_factors = [
            ("Math", 1.0),
            ("ELA", 1.1),
            ("Science", 1.2),
            ("SocialStudies", 1.0),
            ("Algebra1", 1.2),
            ("Precalculus", 1.3),
        ]
        .into_iter()
        .map(|(subject, factor)| (subject.to_string(), factor))
        .collect();

        Self {
            difficulty,
            duration,
            subject_factors,
            fallback_difficulty: DifficultyRule { base: 5, multiplier: 1.0, keywords: Vec::new() },
            fallback_duration: DurationRule { base_minutes: 20.0, minutes_per_difficulty: 2.0 },
            ordinal_source: OrdinalSource::default(),
        }
    }

    pub fn with_ordinal_source(mut self, ordinal_source: OrdinalSource) -> Self {
        self.ordinal_source = ordinal_source;
        self
    }

    pub fn ordinal_source(&self) -> OrdinalSource {
        self.ordinal_source
    }

    /// 年级对应的难度规则，未知年级使用后备规则
    pub fn difficulty_rule(&self, grade: &str) -> &DifficultyRule {
        self.difficulty.get(grade).unwrap_or(&self.fallback_difficulty)
    }

    pub fn duration_rule(&self, grade: &str) -> &DurationRule {
        self.duration.get(grade).unwrap_or(&self.fallback_duration)
    }

    pub fn subject_factor(&self, subject: &str) -> f64 {
        self.subject_factors.get(subject).copied().unwrap_or(1.0)
    }

    /// 计算难度：基础值 + floor(序号 × 乘数) + 首个命中关键字的调整值，截断到 [1,10]
    pub fn calculate_difficulty(&self, grade: &str, skill_number: &str, skill_name: &str) -> i32 {
        let rule = self.difficulty_rule(grade);
        let ordinal = extract_ordinal(skill_number, self.ordinal_source);

        let ordinal_bonus = (ordinal as f64 * rule.multiplier).floor();
        let ordinal_bonus = ordinal_bonus.min(MAX_DIFFICULTY as f64) as i32;

        let name = skill_name.to_lowercase();
        let keyword_adjustment = rule
            .keywords
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map(|(_, adjustment)| *adjustment)
            .unwrap_or(0);

        (rule.base + ordinal_bonus + keyword_adjustment).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    /// 估算时长：(基础分钟 + 难度 × 每点分钟) × 学科系数，四舍五入到5分钟，下限5分钟
    pub fn estimate_minutes(&self, grade: &str, subject: &str, difficulty: i32) -> i32 {
        let rule = self.duration_rule(grade);
        let raw = (rule.base_minutes + difficulty as f64 * rule.minutes_per_difficulty)
            * self.subject_factor(subject);

        let rounded = ((raw / MINUTE_STEP).round() * MINUTE_STEP) as i32;
        rounded.max(MIN_MINUTES)
    }
}

impl Default for HeuristicTables {
    fn default() -> Self {
        Self::standard()
    }
}
