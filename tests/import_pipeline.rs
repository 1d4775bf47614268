use std::path::Path;
use std::sync::Arc;

use importer_lib::models::{Grade, Subject};
use importer_lib::services::application::TabStatus;
use importer_lib::services::domain::{HeuristicTables, SkillNormalizer, TabInterpreter};
use importer_lib::services::{
    BatchWriterService, DataImportService, ExcelImporter, SkillStore, SqliteOrmSkillStore, TabSelection,
};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

enum Cell {
    Text(&'static str),
    Number(f64),
    Empty,
}

use Cell::{Empty, Number, Text};

/// 生成测试用工作簿
fn build_workbook(path: &Path, sheets: Vec<(&str, Vec<Vec<Cell>>)>) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Text(value) => {
                        sheet.write_string(r as u32, c as u16, *value).unwrap();
                    }
                    Number(value) => {
                        sheet.write_number(r as u32, c as u16, *value).unwrap();
                    }
                    Empty => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn standard_header() -> Vec<Cell> {
    vec![Text("SkillsArea"), Text("SkillNumber"), Text("SkillName")]
}

fn math_k_rows() -> Vec<Vec<Cell>> {
    vec![
        standard_header(),
        vec![Text("Numbers"), Text("1.1"), Text("Count to 10")],
        vec![Text("Numbers"), Text("1.2"), Text("Compare groups")],
        vec![Text("Shapes"), Empty, Text("Name shapes")],
    ]
}

fn service(store: Option<Arc<dyn SkillStore>>) -> DataImportService {
    let writer = match store {
        Some(store) => BatchWriterService::new(store, 50),
        None => BatchWriterService::dry_run(50),
    };
    DataImportService::new(
        TabInterpreter::new(vec!["Sheet1".to_string()]),
        SkillNormalizer::new(Arc::new(HeuristicTables::standard())),
        writer,
    )
}

async fn sqlite_store() -> (Arc<SqliteOrmSkillStore>, Arc<dyn SkillStore>) {
    let store = Arc::new(SqliteOrmSkillStore::new_in_memory().await.unwrap());
    let dyn_store: Arc<dyn SkillStore> = store.clone();
    (store, dyn_store)
}

fn workbook_in(dir: &TempDir, sheets: Vec<(&str, Vec<Vec<Cell>>)>) -> std::path::PathBuf {
    let path = dir.path().join("skills_master.xlsx");
    build_workbook(&path, sheets);
    path
}

#[tokio::test]
async fn test_math_k_rows_imported() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Math_K", math_k_rows())]);
    let (store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();

    assert_eq!(report.totals.tabs_processed, 1);
    assert_eq!(report.totals.rows_read, 3);
    assert_eq!(report.totals.inserted, 3);
    assert_eq!(report.totals.errors, 0);
    assert_eq!(report.exit_code(), 0);

    let records = store.load_all_skills().await.unwrap();
    let count = records.iter().find(|r| r.skill_name == "Count to 10").unwrap();
    assert_eq!(count.subject, Subject::Math);
    assert_eq!(count.grade, Grade::K);
    assert_eq!(count.skills_area, "Numbers");
    assert_eq!(count.skills_cluster, "A");
    assert_eq!(count.skill_number, "1.1");
    assert_eq!(count.difficulty_level, 3);
    assert_eq!(count.estimated_time_minutes, 15);

    // 缺少编号时使用 "{簇}.{行号}"
    let shapes = records.iter().find(|r| r.skill_name == "Name shapes").unwrap();
    assert_eq!(shapes.skill_number, "A.4");

    for record in &records {
        assert!((1..=10).contains(&record.difficulty_level));
        assert!(record.estimated_time_minutes >= 5);
        assert_eq!(record.estimated_time_minutes % 5, 0);
    }
}

#[tokio::test]
async fn test_unrecognized_tab_is_skipped_and_run_continues() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(
        &dir,
        vec![("Foo_Bar", math_k_rows()), ("Math_K", math_k_rows())],
    );
    let (_store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();

    assert_eq!(report.tabs[0].tab_name, "Foo_Bar");
    assert_eq!(report.tabs[0].status, TabStatus::Skipped);
    assert!(report.tabs[0].skip_reason.as_deref().unwrap_or_default().contains("Foo_Bar"));
    assert_eq!(report.tabs[1].status, TabStatus::Processed);
    assert_eq!(report.totals.tabs_total, 2);
    assert_eq!(report.totals.tabs_processed, 1);
    assert_eq!(report.totals.inserted, 3);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_rerun_inserts_nothing_new() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Math_K", math_k_rows())]);
    let (store, dyn_store) = sqlite_store().await;
    let service = service(Some(dyn_store));

    let first = service.import_workbook(&path, &TabSelection::AllGrades).await.unwrap();
    assert_eq!(first.totals.inserted, 3);

    let second = service.import_workbook(&path, &TabSelection::AllGrades).await.unwrap();
    assert_eq!(second.totals.inserted, 0);
    assert_eq!(second.totals.duplicates, 3);
    assert_eq!(second.totals.errors, 0);
    // 没有新插入，退出码为1
    assert_eq!(second.exit_code(), 1);

    assert_eq!(store.count_skills().await.unwrap(), 3);
}

#[tokio::test]
async fn test_row_without_skill_name_is_silently_dropped() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        standard_header(),
        vec![Text("Numbers"), Text("1.1"), Text("Count to 10")],
        vec![Text("Numbers"), Text("1.2"), Empty],
    ];
    let path = workbook_in(&dir, vec![("Math_K", rows)]);
    let (_store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();

    let tab = &report.tabs[0];
    assert_eq!(tab.rows_read, 2);
    assert_eq!(tab.rows_without_name, 1);
    assert_eq!(tab.rows_valid, 1);
    assert_eq!(tab.error_count(), 0);
    assert_eq!(report.exit_code(), 0);
}

fn consolidated_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![Text("Subject"), Text("Grade"), Text("SkillsArea"), Text("SkillNumber"), Text("SkillName")],
        vec![Text("Mathematics"), Text("Kindergarten"), Text("Numbers"), Text("1.1"), Text("Count to 10")],
        vec![Text("Science"), Number(7.0), Text("Life"), Text("2.3"), Text("Analyze cells")],
        vec![Text("History"), Number(3.0), Text("Events"), Text("1.1"), Text("Timeline")],
    ]
}

#[tokio::test]
async fn test_consolidated_sheet_reads_subject_and_grade_per_row() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Sheet1", consolidated_rows())]);
    let (store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();

    let tab = &report.tabs[0];
    assert_eq!(tab.rows_read, 3);
    assert_eq!(tab.rows_valid, 2);
    assert_eq!(tab.inserted, 2);
    assert_eq!(tab.validation_errors.len(), 1);
    assert_eq!(tab.validation_errors[0].field, "subject");
    assert_eq!(tab.validation_errors[0].value, "History");
    assert_eq!(tab.validation_errors[0].row, 4);
    // 校验错误使退出码为1
    assert_eq!(report.exit_code(), 1);

    let records = store.load_all_skills().await.unwrap();
    let science = records.iter().find(|r| r.subject == Subject::Science).unwrap();
    assert_eq!(science.grade, Grade::Numbered(7));
    assert_eq!(science.difficulty_level, 10);
    assert_eq!(science.estimated_time_minutes, 55);

    let math = records.iter().find(|r| r.subject == Subject::Math).unwrap();
    assert_eq!(math.grade, Grade::K);
}

#[tokio::test]
async fn test_prek_k_selection_filters_tabs_and_consolidated_rows() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(
        &dir,
        vec![
            ("Sheet1", consolidated_rows()),
            ("Math_1", math_k_rows()),
            ("ELA_PreK", vec![standard_header(), vec![Text("Letters"), Text("A.1"), Text("Recognize letters")]]),
        ],
    );
    let (store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::PreKAndK)
        .await
        .unwrap();

    let names: Vec<&str> = report.tabs.iter().map(|t| t.tab_name.as_str()).collect();
    assert_eq!(names, vec!["Sheet1", "ELA_PreK"]);
    assert_eq!(report.totals.inserted, 2);
    assert_eq!(report.totals.errors, 0);
    assert_eq!(report.exit_code(), 0);

    let records = store.load_all_skills().await.unwrap();
    assert!(records.iter().all(|r| r.grade.is_early_childhood()));
}

#[tokio::test]
async fn test_dry_run_reports_would_insert_without_store() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Math_K", math_k_rows())]);

    let report = service(None)
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.file, path.display().to_string());
    assert_eq!(report.totals.would_insert, 3);
    assert_eq!(report.totals.inserted, 0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_explicit_missing_sheet_fails_that_tab_only() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Math_K", math_k_rows())]);
    let (_store, dyn_store) = sqlite_store().await;

    let selection = TabSelection::Explicit(vec!["Math_K".to_string(), "Math_9".to_string()]);
    let report = service(Some(dyn_store)).import_workbook(&path, &selection).await.unwrap();

    assert_eq!(report.tabs[0].status, TabStatus::Processed);
    assert_eq!(report.tabs[1].status, TabStatus::Failed);
    assert!(report.tabs[1].errors[0].contains("Math_9"));
    assert_eq!(report.totals.inserted, 3);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_misspelled_explicit_tab_fails_instead_of_skipping() {
    let dir = TempDir::new().unwrap();
    let path = workbook_in(&dir, vec![("Math_K", math_k_rows())]);

    let selection = TabSelection::Explicit(vec!["Math_K".to_string(), "Mth_K".to_string()]);
    let report = service(None).import_workbook(&path, &selection).await.unwrap();

    assert_eq!(report.tabs[0].status, TabStatus::Processed);
    assert_eq!(report.tabs[1].tab_name, "Mth_K");
    assert_eq!(report.tabs[1].status, TabStatus::Failed);
    assert!(report.tabs[1].skip_reason.is_none());
    assert!(report.tabs[1].errors[0].contains("工作表不存在"));
    assert_eq!(report.totals.errors, 1);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_alternate_columns_and_high_school_tab() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        vec![Text("Skills Area"), Text("Cluster"), Text("Skill #"), Text("Skill Name"), Text("Description")],
        vec![Text("Equations"), Text("B"), Number(1.0), Text("Solve linear equations"), Text("One variable")],
        vec![Text("Equations"), Text("B"), Empty, Text("Model with equations"), Empty],
    ];
    let path = workbook_in(&dir, vec![("Algebra1", rows)]);
    let (store, dyn_store) = sqlite_store().await;

    let report = service(Some(dyn_store))
        .import_workbook(&path, &TabSelection::AllGrades)
        .await
        .unwrap();
    assert_eq!(report.totals.inserted, 2);

    let records = store.load_all_skills().await.unwrap();
    let solve = records.iter().find(|r| r.skill_number == "1").unwrap();
    assert_eq!(solve.subject, Subject::Algebra1);
    assert_eq!(solve.grade, Grade::Algebra1);
    assert_eq!(solve.skills_cluster, "B");
    assert_eq!(solve.skill_description.as_deref(), Some("One variable"));
    assert!(records.iter().any(|r| r.skill_number == "B.3"));
}

#[tokio::test]
async fn test_sheet_reader_skips_blank_rows() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        standard_header(),
        vec![Text("Numbers"), Text("1.1"), Text("Count to 10")],
        vec![Empty, Empty, Empty],
        vec![Text("  "), Number(0.0), Empty],
        vec![Text("Numbers"), Text("1.5"), Text("Skip count")],
    ];
    let path = workbook_in(&dir, vec![("Math_K", rows)]);

    let mut importer = ExcelImporter::open(&path).unwrap();
    assert_eq!(importer.sheet_names(), vec!["Math_K".to_string()]);

    let raw = importer.read_sheet("Math_K").unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[1].row_number, 5);

    let err = importer.read_sheet("Math_9").unwrap_err();
    assert_eq!(err.error_code(), "SHEET_NOT_FOUND");
}

#[tokio::test]
async fn test_unreadable_workbook_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.xlsx");
    let result = service(None).import_workbook(&path, &TabSelection::AllGrades).await;
    assert!(result.is_err());
}
