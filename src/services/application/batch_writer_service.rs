//! # 批次写入服务
//!
//! 把校验通过的记录按固定大小分块写入技能存储：
//! - 整块成功：计入插入数
//! - 整块因唯一约束失败：对该块逐行重试，重复行单独计数，不算错误
//! - 整块因其它原因失败：整块计为跳过并记录一条数据库错误，继续下一块
//! - 演练模式：不调用存储，只统计将要插入的数量

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::models::structs::SkillRecord;
use crate::services::traits::SkillStore;
use crate::utils::error::AppError;

/// 单次写入的统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchWriteOutcome {
    pub inserted: usize,
    pub duplicates: usize,
    /// 非重复原因导致未写入的行
    pub skipped: usize,
    pub would_insert: usize,
    pub errors: Vec<String>,
}

impl BatchWriteOutcome {
    pub fn merge(&mut self, other: BatchWriteOutcome) {
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
        self.would_insert += other.would_insert;
        self.errors.extend(other.errors);
    }
}

/// 批次写入服务
pub struct BatchWriterService {
    /// None 表示演练模式
    store: Option<Arc<dyn SkillStore>>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchWriterService {
    pub fn new(store: Arc<dyn SkillStore>, batch_size: usize) -> Self {
        Self {
            store: Some(store),
            batch_size: batch_size.max(1),
            batch_delay: Duration::ZERO,
        }
    }

    /// 演练模式，不需要存储
    pub fn dry_run(batch_size: usize) -> Self {
        Self {
            store: None,
            batch_size: batch_size.max(1),
            batch_delay: Duration::ZERO,
        }
    }

    /// 批次之间的固定间隔
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.store.is_none()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 写入一组记录，失败不会中断，全部反映在返回的统计中
    pub async fn write(&self, records: &[SkillRecord]) -> BatchWriteOutcome {
        let mut outcome = BatchWriteOutcome::default();

        let store = match &self.store {
            Some(store) => store,
            None => {
                outcome.would_insert = records.len();
                log::info!("[DRY RUN] 将插入 {} 条记录", records.len());
                return outcome;
            }
        };

        let total_batches = records.len().div_ceil(self.batch_size);
        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            log::debug!("写入第 {}/{} 批，共 {} 条", index + 1, total_batches, chunk.len());
            match store.insert_batch(chunk).await {
                Ok(count) => {
                    outcome.inserted += count;
                }
                Err(e) if e.is_duplicate_key() => {
                    log::warn!("第 {} 批存在重复记录，改为逐行插入: {}", index + 1, e);
                    outcome.merge(Self::insert_row_by_row(store.as_ref(), chunk).await);
                }
                Err(e) => {
                    crate::log_database_failure!("第 {} 批插入失败，跳过 {} 条记录: {}", index + 1, chunk.len(), e);
                    outcome.skipped += chunk.len();
                    outcome.errors.push(
                        AppError::database_error(format!("第 {} 批插入失败: {}", index + 1, e)).to_string(),
                    );
                }
            }
        }

        log::info!(
            "写入完成: 插入 {} 条, 重复 {} 条, 跳过 {} 条",
            outcome.inserted,
            outcome.duplicates,
            outcome.skipped
        );
        outcome
    }

    async fn insert_row_by_row(store: &dyn SkillStore, chunk: &[SkillRecord]) -> BatchWriteOutcome {
        let mut outcome = BatchWriteOutcome::default();
        for record in chunk {
            match store.insert_one(record).await {
                Ok(()) => outcome.inserted += 1,
                Err(e) if e.is_duplicate_key() => {
                    log::debug!("跳过重复记录 {}", record.natural_key());
                    outcome.duplicates += 1;
                }
                Err(e) => {
                    crate::log_database_failure!("插入记录 {} (第{}行) 失败: {}", record.natural_key(), record.source_row, e);
                    outcome.skipped += 1;
                    outcome.errors.push(
                        AppError::database_error(format!(
                            "第{}行 {} 插入失败: {}",
                            record.source_row,
                            record.natural_key(),
                            e
                        ))
                        .to_string(),
                    );
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Grade, Subject};
    use crate::services::traits::BaseService;
    use crate::utils::error::AppResult;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Store {}

        #[async_trait]
        impl BaseService for Store {
            fn service_name(&self) -> &'static str;
            async fn initialize(&mut self) -> AppResult<()>;
            async fn shutdown(&mut self) -> AppResult<()>;
            async fn health_check(&self) -> AppResult<()>;
        }

        #[async_trait]
        impl SkillStore for Store {
            async fn insert_batch(&self, records: &[SkillRecord]) -> AppResult<usize>;
            async fn insert_one(&self, record: &SkillRecord) -> AppResult<()>;
        }
    }

    fn records(count: usize) -> Vec<SkillRecord> {
        (1..=count)
            .map(|i| SkillRecord {
                subject: Subject::Math,
                grade: Grade::K,
                skills_area: "Numbers".to_string(),
                skills_cluster: "A".to_string(),
                skill_number: format!("A.{}", i),
                skill_name: format!("Skill {}", i),
                skill_description: None,
                difficulty_level: 3,
                estimated_time_minutes: 15,
                prerequisites: Vec::new(),
                source_row: i + 1,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_chunks_by_batch_size() {
        let mut store = MockStore::new();
        store
            .expect_insert_batch()
            .times(3)
            .returning(|chunk| Ok(chunk.len()));
        store.expect_insert_one().never();

        let writer = BatchWriterService::new(Arc::new(store), 50);
        let outcome = writer.write(&records(120)).await;
        assert_eq!(outcome.inserted, 120);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_fallback_counts_duplicates_separately() {
        let mut store = MockStore::new();
        store
            .expect_insert_batch()
            .times(1)
            .returning(|_| Err(AppError::duplicate_key("duplicate key value")));
        store.expect_insert_one().times(50).returning(|record| {
            if ["A.7", "A.21", "A.48"].contains(&record.skill_number.as_str()) {
                Err(AppError::duplicate_key("duplicate key value"))
            } else {
                Ok(())
            }
        });

        let writer = BatchWriterService::new(Arc::new(store), 50);
        let outcome = writer.write(&records(50)).await;
        assert_eq!(outcome.inserted, 47);
        assert_eq!(outcome.duplicates, 3);
        assert_eq!(outcome.skipped, 0);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_non_duplicate_failure_skips_whole_chunk() {
        let mut store = MockStore::new();
        let mut call = 0;
        store.expect_insert_batch().times(2).returning(move |chunk| {
            call += 1;
            if call == 1 {
                Err(AppError::network_error("connection reset"))
            } else {
                Ok(chunk.len())
            }
        });
        store.expect_insert_one().never();

        let writer = BatchWriterService::new(Arc::new(store), 50);
        let outcome = writer.write(&records(60)).await;
        assert_eq!(outcome.skipped, 50);
        assert_eq!(outcome.inserted, 10);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_row_fallback_records_hard_failures() {
        let mut store = MockStore::new();
        store
            .expect_insert_batch()
            .returning(|_| Err(AppError::duplicate_key("conflict")));
        store.expect_insert_one().returning(|record| match record.skill_number.as_str() {
            "A.1" => Err(AppError::duplicate_key("conflict")),
            "A.2" => Err(AppError::database_error("value too long")),
            _ => Ok(()),
        });

        let writer = BatchWriterService::new(Arc::new(store), 10);
        let outcome = writer.write(&records(3)).await;
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_delay_only_between_chunks() {
        use std::sync::Mutex;
        use tokio::time::Instant;

        let calls: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let mut store = MockStore::new();
        store.expect_insert_batch().times(3).returning(move |chunk| {
            seen.lock().unwrap().push(Instant::now());
            Ok(chunk.len())
        });

        let delay = Duration::from_millis(250);
        let writer = BatchWriterService::new(Arc::new(store), 50).with_batch_delay(delay);
        let started = Instant::now();
        let outcome = writer.write(&records(110)).await;
        assert_eq!(outcome.inserted, 110);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        // 第一批不等待
        assert_eq!(calls[0].duration_since(started), Duration::ZERO);
        assert!(calls[1].duration_since(calls[0]) >= delay);
        assert!(calls[2].duration_since(calls[1]) >= delay);
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_store() {
        let writer = BatchWriterService::dry_run(50);
        assert!(writer.is_dry_run());
        let outcome = writer.write(&records(7)).await;
        assert_eq!(outcome.would_insert, 7);
        assert_eq!(outcome.inserted, 0);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let writer = BatchWriterService::dry_run(0);
        assert_eq!(writer.batch_size(), 1);
    }
}
