//! 结果导出
//!
//! 流水线按索引升序对每条结果调用一次 `write_result`，最后调用一次 `save`。

use crate::error::{AppError, AppResult};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// 结果导出器
pub trait ResultExporter {
    /// 写入一条结果
    fn write_result(&mut self, index: usize, input: &str, output: &str) -> AppResult<()>;

    /// 保存输出文件
    fn save(&mut self, path: &Path) -> AppResult<()>;
}

/// 写入 xlsx 文件：A 列为输入，B 列为输出，行号即任务索引
pub struct ExcelExporter {
    worksheet: Worksheet,
    sheet_name: String,
    written: usize,
}

impl ExcelExporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            worksheet: Worksheet::new(),
            sheet_name: sheet_name.into(),
            written: 0,
        }
    }

    /// 已写入的结果数量
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ResultExporter for ExcelExporter {
    fn write_result(&mut self, index: usize, input: &str, output: &str) -> AppResult<()> {
        let row = u32::try_from(index)
            .map_err(|_| AppError::export(&self.sheet_name, format!("行号 {} 超出范围", index)))?;

        self.worksheet
            .write_string(row, 0, input)
            .and_then(|sheet| sheet.write_string(row, 1, output))
            .map_err(|e| AppError::export(&self.sheet_name, e))?;
        self.written += 1;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> AppResult<()> {
        let path_str = path.display().to_string();

        let mut worksheet = std::mem::replace(&mut self.worksheet, Worksheet::new());
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| AppError::export(&path_str, e))?;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        workbook
            .save(path)
            .map_err(|e| AppError::export(&path_str, e))?;

        debug!("已保存 {} 条结果到 {}", self.written, path_str);
        Ok(())
    }
}
