/// Excel输入相关模块
pub mod excel_importer;
pub mod file_locator;

pub use excel_importer::ExcelImporter;
pub use file_locator::FileLocator;
