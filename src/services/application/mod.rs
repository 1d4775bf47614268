/// 应用层服务模块
/// 协调领域服务和基础设施完成完整的导入流程

pub mod batch_writer_service;
pub mod data_import_service;
pub mod report_generation_service;

pub use batch_writer_service::{BatchWriteOutcome, BatchWriterService};
pub use data_import_service::{DataImportService, TabSelection};
pub use report_generation_service::{ImportReport, ImportTotals, ReportGenerationService, TabReport, TabStatus};
