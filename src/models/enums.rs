//! # 模型枚举类型模块
//!
//! ## 业务作用
//! 定义技能记录中两个封闭枚举：
//! - **学科枚举** `Subject`: Math、ELA、Science、SocialStudies 以及高中学科
//! - **年级枚举** `Grade`: Pre-K、K、1-12 以及高中课程年级
//!
//! ## 设计原则
//! - **类型安全**: 学科和年级在进入校验器之前就是强类型
//! - **字符串转换**: `Display` 输出数据库中的规范字符串，`FromStr` 只接受规范字符串
//! - 别名（如 `PreK`、`Kindergarten`）的归一化在Tab解析器中完成，不在这里

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 学科枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Math,
    #[serde(rename = "ELA")]
    Ela,
    Science,
    SocialStudies,
    Algebra1,
    Precalculus,
}

impl Subject {
    /// 所有合法学科（声明顺序）
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::Ela,
        Subject::Science,
        Subject::SocialStudies,
        Subject::Algebra1,
        Subject::Precalculus,
    ];

    /// 规范字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Ela => "ELA",
            Subject::Science => "Science",
            Subject::SocialStudies => "SocialStudies",
            Subject::Algebra1 => "Algebra1",
            Subject::Precalculus => "Precalculus",
        }
    }

    /// 高中学科的Tab名称不带年级后缀，年级与学科同名
    pub fn is_high_school(&self) -> bool {
        matches!(self, Subject::Algebra1 | Subject::Precalculus)
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .iter()
            .find(|subject| subject.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid Subject: {}", s))
    }
}

/// 年级枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    PreK,
    K,
    /// 1-12年级
    Numbered(u8),
    Algebra1,
    Precalculus,
}

impl Grade {
    /// 是否为学前/幼儿园年级（`--all-prek-k` 使用）
    pub fn is_early_childhood(&self) -> bool {
        matches!(self, Grade::PreK | Grade::K)
    }

    /// 所有合法年级
    pub fn all() -> Vec<Grade> {
        let mut grades = vec![Grade::PreK, Grade::K];
        grades.extend((1..=12).map(Grade::Numbered));
        grades.push(Grade::Algebra1);
        grades.push(Grade::Precalculus);
        grades
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::PreK => write!(f, "Pre-K"),
            Grade::K => write!(f, "K"),
            Grade::Numbered(n) => write!(f, "{}", n),
            Grade::Algebra1 => write!(f, "Algebra1"),
            Grade::Precalculus => write!(f, "Precalculus"),
        }
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pre-K" => Ok(Grade::PreK),
            "K" => Ok(Grade::K),
            "Algebra1" => Ok(Grade::Algebra1),
            "Precalculus" => Ok(Grade::Precalculus),
            other => match other.parse::<u8>() {
                Ok(n) if (1..=12).contains(&n) && !other.starts_with('0') => Ok(Grade::Numbered(n)),
                _ => Err(format!("Invalid Grade: {}", s)),
            },
        }
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_round_trips_through_canonical_string() {
        for subject in Subject::ALL {
            assert_eq!(subject.as_str().parse::<Subject>().unwrap(), subject);
        }
        assert!("Social Studies".parse::<Subject>().is_err());
        assert!("math".parse::<Subject>().is_err());
    }

    #[test]
    fn test_grade_parsing() {
        assert_eq!("Pre-K".parse::<Grade>().unwrap(), Grade::PreK);
        assert_eq!("K".parse::<Grade>().unwrap(), Grade::K);
        assert_eq!("7".parse::<Grade>().unwrap(), Grade::Numbered(7));
        assert_eq!("Algebra1".parse::<Grade>().unwrap(), Grade::Algebra1);

        assert!("PreK".parse::<Grade>().is_err());
        assert!("0".parse::<Grade>().is_err());
        assert!("13".parse::<Grade>().is_err());
        assert!("07".parse::<Grade>().is_err());
    }

    #[test]
    fn test_grade_serializes_as_canonical_string() {
        let json = serde_json::to_string(&Grade::PreK).unwrap();
        assert_eq!(json, "\"Pre-K\"");
        let grade: Grade = serde_json::from_str("\"10\"").unwrap();
        assert_eq!(grade, Grade::Numbered(10));
    }

    #[test]
    fn test_all_grades_count() {
        assert_eq!(Grade::all().len(), 16);
        assert!(Grade::PreK.is_early_childhood());
        assert!(!Grade::Numbered(1).is_early_childhood());
    }
}
