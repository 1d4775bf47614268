use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::enums::{Grade, Subject};

/// 生成默认的唯一ID
pub fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// Excel单元格值
///
/// 空单元格不会被物化，因此这里没有 `Empty` 变体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// 转换为去除首尾空白的文本
    ///
    /// 整数值的数字不带小数部分（`7.0` → `"7"`），其余按原样输出（`1.1` → `"1.1"`）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// 值是否为"空"：空字符串、0 或 false
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => *n == 0.0,
            CellValue::Bool(b) => !*b,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 原始数据行
///
/// 表头（已trim）到单元格值的映射，外加该行在工作表中的实际行号（表头为第1行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub row_number: usize,
    pub values: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            values: HashMap::new(),
        }
    }

    /// 链式插入，测试和构造数据时使用
    pub fn with(mut self, header: impl Into<String>, value: CellValue) -> Self {
        self.values.insert(header.into(), value);
        self
    }

    /// 读取文本值，空白视为不存在
    pub fn text(&self, header: &str) -> Option<String> {
        self.values
            .get(header)
            .map(CellValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn has_column(&self, header: &str) -> bool {
        self.values.contains_key(header)
    }

    /// 所有映射值都为空时整行丢弃
    pub fn is_blank(&self) -> bool {
        self.values.values().all(CellValue::is_blank)
    }
}

/// 归一化后、校验前的技能草稿
///
/// 学科和年级仍为字符串，由校验器负责确认它们属于封闭枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDraft {
    pub subject: String,
    pub grade: String,
    pub skills_area: String,
    pub skills_cluster: String,
    pub skill_number: String,
    pub skill_name: String,
    pub skill_description: Option<String>,
    pub difficulty_level: i32,
    pub estimated_time_minutes: i32,
    pub row_number: usize,
}

/// 技能记录（持久化实体）
///
/// 自然键为 (subject, grade, skill_number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub subject: Subject,
    pub grade: Grade,
    pub skills_area: String,
    pub skills_cluster: String,
    pub skill_number: String,
    pub skill_name: String,
    pub skill_description: Option<String>,
    pub difficulty_level: i32,
    pub estimated_time_minutes: i32,
    /// 先修技能，目前始终为空
    pub prerequisites: Vec<String>,
    /// 来源行号，仅用于报告
    #[serde(skip)]
    pub source_row: usize,
}

impl SkillRecord {
    /// 自然键的可读形式，用于日志
    pub fn natural_key(&self) -> String {
        format!("{}/{}/{}", self.subject, self.grade, self.skill_number)
    }
}

/// 记录级校验错误，累积到最终报告中，不会中止批次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub row: usize,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, row: usize) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            row,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "第{}行字段'{}'无效: '{}'", self.row, self.field, self.value)
    }
}
