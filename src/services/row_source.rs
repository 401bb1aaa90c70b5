//! 输入行读取
//!
//! 每一行是若干单元格文本，流水线只使用第一个单元格。

use crate::error::{AppError, AppResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::PathBuf;
use tracing::debug;

/// 输入行来源
pub trait RowSource {
    /// 按原始顺序返回所有行
    fn get_rows(&self) -> AppResult<Vec<Vec<String>>>;
}

/// 内存中的行，主要用于测试和嵌入调用
impl RowSource for Vec<Vec<String>> {
    fn get_rows(&self) -> AppResult<Vec<Vec<String>>> {
        Ok(self.clone())
    }
}

/// 表格文件（xlsx / xls / ods）中的一个工作表
pub struct ExcelRowSource {
    path: PathBuf,
    sheet_name: String,
}

impl ExcelRowSource {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

impl RowSource for ExcelRowSource {
    fn get_rows(&self) -> AppResult<Vec<Vec<String>>> {
        let path_str = self.path.display().to_string();
        if !self.path.exists() {
            return Err(AppError::input(path_str, "文件不存在"));
        }

        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| AppError::input(&path_str, e))?;
        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| AppError::input(&path_str, format!("读取工作表 {} 失败: {}", self.sheet_name, e)))?;

        let rows = range_to_rows(&range);
        debug!("从 {} 读取到 {} 行", path_str, rows.len());
        Ok(rows)
    }
}

/// 把工作表区域转换成从 A1 开始对齐的行
///
/// 区域之前的空行保留为空行，行尾的空单元格会被去掉，因此整行为空时得到零个单元格。
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<String> = std::iter::repeat(String::new())
            .take(start_col as usize)
            .chain(row.iter().map(cell_to_string))
            .collect();
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        rows.push(cells);
    }
    rows
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_input_error() {
        let source = ExcelRowSource::new("does-not-exist.xlsx", "Sheet1");
        assert!(matches!(source.get_rows(), Err(AppError::Input { .. })));
    }

    #[test]
    fn test_reads_rows_from_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1").unwrap();
        sheet.write_string(0, 0, "hello").unwrap();
        sheet.write_string(2, 0, "world").unwrap();
        workbook.save(&path).unwrap();

        let rows = ExcelRowSource::new(&path, "Sheet1").get_rows().unwrap();
        assert_eq!(rows, vec![vec!["hello".to_string()], vec![], vec!["world".to_string()]]);
    }

    #[test]
    fn test_missing_sheet_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "x").unwrap();
        workbook.save(&path).unwrap();

        let source = ExcelRowSource::new(&path, "Other");
        assert!(matches!(source.get_rows(), Err(AppError::Input { .. })));
    }

    #[test]
    fn test_blank_row_has_no_cells() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("hello".to_string()));
        range.set_value((2, 0), Data::String("world".to_string()));
        range.set_value((2, 1), Data::Float(2.0));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["hello".to_string()]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["world".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_offset_range_aligned_to_first_column() {
        let mut range = Range::new((1, 1), (1, 1));
        range.set_value((1, 1), Data::String("x".to_string()));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec![String::new(), "x".to_string()]);
    }
}
