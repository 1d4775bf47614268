/// 领域服务层模块
/// 包含Tab解析、列映射、归一化、校验等纯业务逻辑，不依赖IO

/// 难度与时长启发式规则表
pub mod heuristics;

/// Tab名称解析
pub mod tab_interpreter;

/// 列映射模板
pub mod column_mapping;

/// 原始行 → 技能草稿
pub mod skill_normalizer;

/// 技能草稿 → 技能记录
pub mod skill_validator;

// 重新导出常用类型
pub use column_mapping::{select_template, ColumnTemplate};
pub use heuristics::{HeuristicTables, OrdinalSource};
pub use skill_normalizer::SkillNormalizer;
pub use skill_validator::SkillValidator;
pub use tab_interpreter::{TabInterpreter, TabMode};
