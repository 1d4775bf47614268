/// 报告生成服务
///
/// 汇总每个Tab的处理结果，输出固定格式的文本摘要，并可导出JSON报告

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use super::batch_writer_service::BatchWriteOutcome;
use crate::models::structs::ValidationError;
use crate::utils::error::{AppError, AppResult};

/// Tab处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    Processed,
    /// 名称无法识别，未处理也不计为错误
    Skipped,
    Failed,
}

/// 单个Tab的统计
#[derive(Debug, Clone, Serialize)]
pub struct TabReport {
    pub tab_name: String,
    pub status: TabStatus,
    pub rows_read: usize,
    /// 缺少技能名称而静默跳过的行
    pub rows_without_name: usize,
    pub rows_valid: usize,
    pub inserted: usize,
    pub would_insert: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub validation_errors: Vec<ValidationError>,
    /// Tab级错误和数据库错误
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl TabReport {
    pub fn new(tab_name: impl Into<String>) -> Self {
        Self {
            tab_name: tab_name.into(),
            status: TabStatus::Processed,
            rows_read: 0,
            rows_without_name: 0,
            rows_valid: 0,
            inserted: 0,
            would_insert: 0,
            duplicates: 0,
            skipped: 0,
            validation_errors: Vec::new(),
            errors: Vec::new(),
            skip_reason: None,
        }
    }

    /// 名称无法识别而跳过的Tab
    pub fn skipped(tab_name: impl Into<String>, error: &AppError) -> Self {
        let mut report = Self::new(tab_name);
        report.status = TabStatus::Skipped;
        report.skip_reason = Some(error.to_string());
        report
    }

    /// Tab级失败（工作表不存在、读取失败）
    pub fn failed(tab_name: impl Into<String>, error: &AppError) -> Self {
        let mut report = Self::new(tab_name);
        report.status = TabStatus::Failed;
        report.errors.push(error.to_string());
        report
    }

    pub fn apply_write_outcome(&mut self, outcome: BatchWriteOutcome) {
        self.inserted += outcome.inserted;
        self.would_insert += outcome.would_insert;
        self.duplicates += outcome.duplicates;
        self.skipped += outcome.skipped;
        self.errors.extend(outcome.errors);
    }

    pub fn error_count(&self) -> usize {
        self.validation_errors.len() + self.errors.len()
    }
}

/// 整次运行的合计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportTotals {
    pub tabs_processed: usize,
    pub tabs_total: usize,
    pub rows_read: usize,
    pub rows_valid: usize,
    pub inserted: usize,
    pub would_insert: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// 导入报告
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub file: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub tabs: Vec<TabReport>,
    pub totals: ImportTotals,
}

impl ImportReport {
    pub fn new(file: impl Into<String>, dry_run: bool) -> Self {
        Self {
            file: file.into(),
            dry_run,
            started_at: Utc::now(),
            elapsed_ms: 0,
            tabs: Vec::new(),
            totals: ImportTotals::default(),
        }
    }

    pub fn push_tab(&mut self, tab: TabReport) {
        self.tabs.push(tab);
        self.recompute_totals();
    }

    /// 记录耗时，结束本次运行
    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis().min(u64::MAX as u128) as u64;
        self.recompute_totals();
    }

    fn recompute_totals(&mut self) {
        let mut totals = ImportTotals {
            tabs_total: self.tabs.len(),
            ..ImportTotals::default()
        };
        for tab in &self.tabs {
            if tab.status == TabStatus::Processed {
                totals.tabs_processed += 1;
            }
            totals.rows_read += tab.rows_read;
            totals.rows_valid += tab.rows_valid;
            totals.inserted += tab.inserted;
            totals.would_insert += tab.would_insert;
            totals.duplicates += tab.duplicates;
            totals.skipped += tab.skipped;
            totals.errors += tab.error_count();
        }
        self.totals = totals;
    }

    /// 退出码：没有错误且至少插入（演练模式下为将插入）一行时为0，否则为1
    pub fn exit_code(&self) -> i32 {
        let written = if self.dry_run {
            self.totals.would_insert
        } else {
            self.totals.inserted
        };
        if self.totals.errors == 0 && written > 0 {
            0
        } else {
            1
        }
    }
}

/// 报告输出
pub struct ReportGenerationService;

impl ReportGenerationService {
    /// 生成文本摘要，verbose 时附带逐条错误
    pub fn render_summary(report: &ImportReport, verbose: bool) -> String {
        let totals = &report.totals;
        let mut out = String::new();

        let _ = writeln!(out, "==================== 导入摘要 ====================");
        let _ = writeln!(out, "文件:         {}", report.file);
        let _ = writeln!(out, "模式:         {}", if report.dry_run { "演练 (dry-run)" } else { "写入" });
        let _ = writeln!(out, "Tab处理:      {}/{}", totals.tabs_processed, totals.tabs_total);
        let _ = writeln!(out, "读取行数:     {}", totals.rows_read);
        let _ = writeln!(out, "有效行数:     {}", totals.rows_valid);
        if report.dry_run {
            let _ = writeln!(out, "将插入行数:   {}", totals.would_insert);
        } else {
            let _ = writeln!(out, "插入行数:     {}", totals.inserted);
        }
        let _ = writeln!(out, "跳过行数:     {} (重复 {}, 失败 {})", totals.duplicates + totals.skipped, totals.duplicates, totals.skipped);
        let _ = writeln!(out, "错误数:       {}", totals.errors);
        let _ = writeln!(out, "耗时:         {:.2}s", report.elapsed_ms as f64 / 1000.0);

        let _ = writeln!(out, "-------------------- 分Tab统计 --------------------");
        let _ = writeln!(
            out,
            "{:<24} {:<6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
            "Tab", "状态", "读取", "有效", "插入", "重复", "跳过", "错误"
        );
        for tab in &report.tabs {
            let status = match tab.status {
                TabStatus::Processed => "成功",
                TabStatus::Skipped => "跳过",
                TabStatus::Failed => "失败",
            };
            let written = if report.dry_run { tab.would_insert } else { tab.inserted };
            let _ = writeln!(
                out,
                "{:<24} {:<6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
                tab.tab_name,
                status,
                tab.rows_read,
                tab.rows_valid,
                written,
                tab.duplicates,
                tab.skipped,
                tab.error_count()
            );

            if verbose {
                if let Some(reason) = &tab.skip_reason {
                    let _ = writeln!(out, "    - {}", reason);
                }
                for error in &tab.validation_errors {
                    let _ = writeln!(out, "    - {}", error);
                }
                for error in &tab.errors {
                    let _ = writeln!(out, "    - {}", error);
                }
            }
        }
        let _ = writeln!(out, "==================================================");
        out
    }

    pub fn print_summary(report: &ImportReport, verbose: bool) {
        println!("{}", Self::render_summary(report, verbose));
    }

    /// 导出JSON报告
    pub async fn write_json(report: &ImportReport, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| AppError::io_error(format!("写入报告文件失败: {}", path.display()), e.kind().to_string()))?;
        log::info!("报告已写入: {}", path.display());
        Ok(())
    }
}
