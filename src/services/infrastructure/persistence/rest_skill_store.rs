//! # PostgREST风格的远程技能存储
//!
//! 通过 `POST {url}/rest/v1/{table}` 批量插入记录。
//! 冲突通过 HTTP 409 或 PostgreSQL 错误码 `23505` 识别，映射为 `DuplicateKey`。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::models::structs::SkillRecord;
use crate::services::traits::{BaseService, SkillStore};
use crate::utils::config::DatastoreConfig;
use crate::utils::error::{AppError, AppResult};

/// PostgreSQL 唯一约束冲突错误码
const UNIQUE_VIOLATION_CODE: &str = "23505";

pub struct RestSkillStore {
    client: Client,
    base_url: String,
    api_key: String,
    table_name: String,
}

impl RestSkillStore {
    pub fn new(config: &DatastoreConfig) -> AppResult<Self> {
        let base_url = config
            .url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::configuration_error("缺少数据存储地址"))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::configuration_error("缺少数据存储密钥"))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AppError::network_error(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            table_name: config.table_name.clone(),
        })
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table_name)
    }

    async fn post_rows<T: serde::Serialize + ?Sized>(&self, rows: &T) -> AppResult<()> {
        let res = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| AppError::network_error(format!("请求数据存储失败: {}", e)))?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        classify_response(status, &body)
    }
}

/// 根据响应状态和响应体分类结果
pub fn classify_response(status: StatusCode, body: &str) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }
    // 409 也可能是外键冲突(23503)，只按唯一约束错误码判断
    if body.contains(UNIQUE_VIOLATION_CODE) {
        return Err(AppError::duplicate_key(format!("唯一约束冲突 ({}): {}", status, body)));
    }
    Err(AppError::database_error(format!("数据存储返回错误 ({}): {}", status, body)))
}

#[async_trait]
impl BaseService for RestSkillStore {
    fn service_name(&self) -> &'static str {
        "RestSkillStore"
    }

    async fn initialize(&mut self) -> AppResult<()> {
        log::info!("{} 已初始化，目标: {}", self.service_name(), self.table_url());
        Ok(())
    }

    async fn shutdown(&mut self) -> AppResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        let res = self
            .client
            .get(self.table_url())
            .query(&[("select", "id"), ("limit", "1")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::network_error(format!("数据存储健康检查失败: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::database_error(format!(
                "数据存储健康检查失败 ({}): {}",
                status, body
            )));
        }
        log::debug!("数据存储连接健康。");
        Ok(())
    }
}

#[async_trait]
impl SkillStore for RestSkillStore {
    async fn insert_batch(&self, records: &[SkillRecord]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.post_rows(records).await?;
        Ok(records.len())
    }

    async fn insert_one(&self, record: &SkillRecord) -> AppResult<()> {
        self.post_rows(std::slice::from_ref(record)).await
    }
}
