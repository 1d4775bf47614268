// 文件: src/models/entities/mod.rs
// 详细注释：声明 entities 模块下的所有实体

pub mod skill;
