/// Excel工作表读取服务
///
/// 负责打开技能工作簿，并把指定工作表转换为以表头为键的原始行
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, DataType, Range, Reader, Sheets};
use log::{debug, info};

use crate::error::AppError;
use crate::models::structs::{CellValue, RawRow};
use crate::utils::error::AppResult;

/// Excel导入器，持有已打开的工作簿
pub struct ExcelImporter {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl ExcelImporter {
    /// 打开Excel文件（xlsx/xls/ods）
    pub fn open(path: &Path) -> AppResult<Self> {
        info!("打开Excel文件: {}", path.display());
        let workbook = open_workbook_auto(path)
            .map_err(|e| AppError::excel_error(format!("无法打开Excel文件 {}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 工作表名称，按工作簿中的顺序
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// 读取工作表的所有非空数据行
    pub fn read_sheet(&mut self, sheet_name: &str) -> AppResult<Vec<RawRow>> {
        let range = match self.workbook.worksheet_range(sheet_name) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return Err(AppError::excel_error(format!("无法读取工作表 {}: {}", sheet_name, e)))
            }
            None => return Err(AppError::sheet_not_found(sheet_name)),
        };

        let rows = Self::rows_from_range(&range);
        debug!("🔍 [EXCEL_PARSE] 工作表 {} 读取到 {} 行数据", sheet_name, rows.len());
        Ok(rows)
    }

    /// 把单元格区域转换为原始行
    ///
    /// 首行作为表头；无表头或空值的单元格不进入映射；所有值都为空的行整体丢弃
    pub fn rows_from_range(range: &Range<DataType>) -> Vec<RawRow> {
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows = range.rows();

        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(|cell| cell.to_string().trim().to_string()).collect(),
            None => return Vec::new(),
        };

        let mut result = Vec::new();
        for (idx, row) in rows.enumerate() {
            // 表头为第 first_row + 1 行，数据从下一行开始
            let row_number = first_row + idx + 2;
            let mut raw = RawRow::new(row_number);

            for (header, cell) in headers.iter().zip(row.iter()) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = Self::cell_value(cell) {
                    raw.values.insert(header.clone(), value);
                }
            }

            if raw.values.is_empty() || raw.is_blank() {
                continue;
            }
            result.push(raw);
        }
        result
    }

    /// 单元格转换，空值和错误单元格返回 `None`
    fn cell_value(cell: &DataType) -> Option<CellValue> {
        match cell {
            DataType::Empty | DataType::Error(_) => None,
            DataType::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
            }
            DataType::Float(f) => Some(CellValue::Number(*f)),
            DataType::Int(i) => Some(CellValue::Number(*i as f64)),
            DataType::Bool(b) => Some(CellValue::Bool(*b)),
            other => {
                let text = other.to_string();
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| CellValue::Text(trimmed.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> DataType {
        DataType::String(value.to_string())
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), text("SkillNumber"));
        range.set_value((0, 1), text(" SkillName "));
        range.set_value((1, 0), DataType::Float(1.1));
        range.set_value((1, 1), text("Count to 10"));
        // 第3行全空
        range.set_value((3, 0), DataType::Int(2));
        range.set_value((3, 2), text("no header"));

        let rows = ExcelImporter::rows_from_range(&range);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].text("SkillNumber").as_deref(), Some("1.1"));
        assert_eq!(rows[0].text("SkillName").as_deref(), Some("Count to 10"));

        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].values.len(), 1);
        assert_eq!(rows[1].text("SkillNumber").as_deref(), Some("2"));
    }

    #[test]
    fn test_zero_and_whitespace_rows_discarded() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), text("SkillNumber"));
        range.set_value((0, 1), text("SkillName"));
        range.set_value((1, 0), DataType::Float(0.0));
        range.set_value((1, 1), text("   "));

        assert!(ExcelImporter::rows_from_range(&range).is_empty());
    }

    #[test]
    fn test_empty_range() {
        let range: Range<DataType> = Range::empty();
        assert!(ExcelImporter::rows_from_range(&range).is_empty());
    }
}
