/// 服务层基础trait定义
/// 提供各层服务的接口规范，支持依赖注入和测试

use async_trait::async_trait;
use crate::utils::error::AppResult;
use crate::models::structs::SkillRecord;

/// 基础服务trait，所有服务都应实现
#[async_trait]
pub trait BaseService: Send + Sync {
    /// 服务名称
    fn service_name(&self) -> &'static str;

    /// 初始化服务
    async fn initialize(&mut self) -> AppResult<()>;

    /// 关闭服务
    async fn shutdown(&mut self) -> AppResult<()>;

    /// 健康检查
    async fn health_check(&self) -> AppResult<()>;
}

/// 技能数据存储trait
///
/// 存储端以 (subject, grade, skill_number) 唯一约束识别重复，
/// 冲突时必须返回 `AppError::DuplicateKey`，批次写入器依赖它降级为逐行插入
#[async_trait]
pub trait SkillStore: BaseService {
    /// 一次请求插入整批记录，返回插入条数
    async fn insert_batch(&self, records: &[SkillRecord]) -> AppResult<usize>;

    /// 插入单条记录
    async fn insert_one(&self, record: &SkillRecord) -> AppResult<()>;
}
