/// 数据导入服务
///
/// 负责协调一次完整的技能导入：打开工作簿 → 逐个Tab读取、解析、归一化、校验 → 批次写入 → 汇总报告。
/// Tab级错误只影响当前Tab：名称无法识别的Tab记为跳过，工作表不存在或读取失败记为失败，流程继续处理下一个Tab。
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};

use super::batch_writer_service::BatchWriterService;
use super::report_generation_service::{ImportReport, TabReport};
use crate::models::enums::Grade;
use crate::models::structs::RawRow;
use crate::services::domain::column_mapping::{select_template, ColumnTemplate, TEMPLATES};
use crate::services::domain::skill_normalizer::SkillNormalizer;
use crate::services::domain::skill_validator::SkillValidator;
use crate::services::domain::tab_interpreter::{consolidated_subject_grade, TabInterpreter, TabMode};
use crate::services::infrastructure::excel::ExcelImporter;
use crate::utils::error::{AppError, AppResult};

/// 要处理的Tab范围
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TabSelection {
    /// 显式指定的Tab名称
    Explicit(Vec<String>),
    /// 所有 Pre-K / K 的Tab（汇总Tab中只取 Pre-K / K 的行）
    PreKAndK,
    /// 工作簿中的全部Tab
    #[default]
    AllGrades,
}

impl TabSelection {
    fn early_childhood_only(&self) -> bool {
        matches!(self, TabSelection::PreKAndK)
    }
}

/// 数据导入服务
pub struct DataImportService {
    interpreter: TabInterpreter,
    normalizer: SkillNormalizer,
    validator: SkillValidator,
    writer: BatchWriterService,
}

impl DataImportService {
    /// 创建新的数据导入服务实例
    pub fn new(interpreter: TabInterpreter, normalizer: SkillNormalizer, writer: BatchWriterService) -> Self {
        Self {
            interpreter,
            normalizer,
            validator: SkillValidator::new(),
            writer,
        }
    }

    /// 导入工作簿
    ///
    /// 只有工作簿无法打开时返回错误，其余问题都体现在报告中
    pub async fn import_workbook(&self, file_path: &Path, selection: &TabSelection) -> AppResult<ImportReport> {
        let started = Instant::now();
        crate::log_import_operation!("开始导入: {} ({:?})", file_path.display(), selection);

        let mut importer = ExcelImporter::open(file_path)?;
        let mut report = ImportReport::new(importer.path().display().to_string(), self.writer.is_dry_run());

        let tabs = self.plan_tabs(&importer.sheet_names(), selection);
        info!("计划处理 {} 个Tab: {:?}", tabs.len(), tabs);
        debug!(
            "批次大小 {}，技能序号提取方式 {:?}",
            self.writer.batch_size(),
            self.normalizer.tables().ordinal_source()
        );

        // 列映射模板在整次运行中只确定一次
        let mut column_template: Option<&'static ColumnTemplate> = None;

        for tab_name in &tabs {
            let tab_report = match self
                .process_tab(&mut importer, tab_name, selection, &mut column_template)
                .await
            {
                Ok(tab_report) => tab_report,
                Err(e @ AppError::UnrecognizedTabName { .. }) => {
                    warn!("Tab {} 名称无法识别，跳过: {}", tab_name, e);
                    TabReport::skipped(tab_name.clone(), &e)
                }
                Err(e) => {
                    warn!("Tab {} 处理失败，继续下一个Tab: {}", tab_name, e);
                    TabReport::failed(tab_name.clone(), &e)
                }
            };
            report.push_tab(tab_report);
        }

        report.finish(started.elapsed());
        crate::log_import_operation!(
            "导入结束: Tab {}/{}，插入 {} 条，错误 {} 个",
            report.totals.tabs_processed,
            report.totals.tabs_total,
            report.totals.inserted,
            report.totals.errors
        );
        Ok(report)
    }

    /// 根据选择范围确定要处理的Tab
    fn plan_tabs(&self, sheet_names: &[String], selection: &TabSelection) -> Vec<String> {
        match selection {
            TabSelection::Explicit(names) => names.clone(),
            TabSelection::AllGrades => sheet_names.to_vec(),
            TabSelection::PreKAndK => sheet_names
                .iter()
                .filter(|name| match self.interpreter.interpret(name) {
                    Ok(TabMode::Consolidated) => true,
                    Ok(TabMode::Pattern { grade, .. }) => grade.is_early_childhood(),
                    Err(_) => {
                        debug!("Tab {} 名称无法识别，不在 Pre-K/K 范围内", name);
                        false
                    }
                })
                .cloned()
                .collect(),
        }
    }

    async fn process_tab(
        &self,
        importer: &mut ExcelImporter,
        tab_name: &str,
        selection: &TabSelection,
        column_template: &mut Option<&'static ColumnTemplate>,
    ) -> AppResult<TabReport> {
        // 先读取工作表，不存在的Tab记为失败
        let rows = importer.read_sheet(tab_name).map_err(|e| {
            crate::log_file_parsing_failure!("读取Tab {} 失败: {}", tab_name, e);
            e
        })?;
        let mode = self.interpreter.interpret(tab_name)?;

        if column_template.is_none() && !rows.is_empty() {
            *column_template = Some(select_template(rows.first()));
        }
        let template = column_template.unwrap_or(&TEMPLATES[0]);
        if template.name_column_absent(&rows) {
            warn!(
                "Tab {} 中没有列映射模板 {} 的技能名称列 '{}'，该Tab所有行都会被跳过",
                tab_name, template.name, template.skill_name
            );
        }

        info!("处理Tab {} ({:?})，共 {} 行", tab_name, mode, rows.len());
        let mut tab_report = TabReport::new(tab_name);
        let mut records = Vec::new();

        for row in &rows {
            let (subject, grade) = Self::resolve_subject_grade(mode, row);
            if selection.early_childhood_only() && mode == TabMode::Consolidated && !is_early_childhood(&grade) {
                continue;
            }
            tab_report.rows_read += 1;

            let draft = match self.normalizer.normalize(row, template, &subject, &grade) {
                Some(draft) => draft,
                None => {
                    debug!("Tab {} 第{}行缺少技能名称，跳过", tab_name, row.row_number);
                    tab_report.rows_without_name += 1;
                    continue;
                }
            };

            match self.validator.validate(draft) {
                Ok(record) => records.push(record),
                Err(errors) => {
                    for error in &errors {
                        warn!("Tab {}: {}", tab_name, error);
                    }
                    tab_report.validation_errors.extend(errors);
                }
            }
        }

        tab_report.rows_valid = records.len();
        let outcome = self.writer.write(&records).await;
        tab_report.apply_write_outcome(outcome);
        Ok(tab_report)
    }

    fn resolve_subject_grade(mode: TabMode, row: &RawRow) -> (String, String) {
        match mode {
            TabMode::Pattern { subject, grade } => (subject.to_string(), grade.to_string()),
            TabMode::Consolidated => consolidated_subject_grade(row),
        }
    }
}

fn is_early_childhood(grade: &str) -> bool {
    grade.parse::<Grade>().map_or(false, |g| g.is_early_childhood())
}
