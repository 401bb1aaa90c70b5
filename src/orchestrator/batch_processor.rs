//! 批量处理入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：根据配置创建 LLM 客户端
//! 2. **资源准备**：打开输入表格、创建导出器、生成带时间戳的输出文件名
//! 3. **向下委托**：交给 `Pipeline` 完成并发处理和有序导出
//! 4. **全局统计**：输出本次运行的统计信息

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::pipeline::{Pipeline, PipelineReport};
use crate::services::{ExcelExporter, ExcelRowSource, RemoteProcessor, RowSource};
use crate::utils::logging::{log_startup, print_final_stats};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    processor: Arc<dyn RemoteProcessor>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(config.max_workers, &config.input_path);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，API 调用可能会失败");
        }

        let client = LlmClient::new(&config);
        info!("🤖 使用模型: {}", client.model_name());

        Ok(Self::with_processor(config, Arc::new(client)))
    }

    /// 使用自定义的远程处理器
    pub fn with_processor(config: Config, processor: Arc<dyn RemoteProcessor>) -> Self {
        Self { config, processor }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<PipelineReport> {
        info!("程序开始执行，正在打开输入文件 '{}'...", self.config.input_path);

        // 表格读取是阻塞 I/O，放到阻塞线程池里执行
        let source = ExcelRowSource::new(&self.config.input_path, &self.config.sheet_name);
        let rows = tokio::task::spawn_blocking(move || source.get_rows())
            .await
            .context("读取输入的线程异常退出")?
            .with_context(|| format!("读取 {} 失败", self.config.input_path))?;

        let mut exporter = ExcelExporter::new(&self.config.sheet_name);
        let output_path = timestamped_output_path(
            &self.config.output_dir,
            &self.config.output_prefix,
            Local::now(),
        );

        let pipeline = Pipeline::from_config(Arc::clone(&self.processor), &self.config);
        let result = pipeline.run_rows(rows, &mut exporter, &output_path).await;
        if let Err(AppError::ExportIncomplete { report, .. }) = &result {
            print_final_stats(report);
        }
        let report = result.with_context(|| format!("处理 {} 失败", self.config.input_path))?;

        print_final_stats(&report);
        Ok(report)
    }
}

/// 生成 `<dir>/<prefix>_<YYYY-MM-DD_HH-MM-SS>.xlsx`
pub fn timestamped_output_path(dir: impl AsRef<Path>, prefix: &str, now: DateTime<Local>) -> PathBuf {
    dir.as_ref()
        .join(format!("{}_{}.xlsx", prefix, now.format("%Y-%m-%d_%H-%M-%S")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamped_output_path() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let path = timestamped_output_path("out", "output", now);
        assert_eq!(path, Path::new("out").join("output_2024-03-05_14-07-09.xlsx"));
    }

    struct UpperProcessor;

    #[async_trait::async_trait]
    impl RemoteProcessor for UpperProcessor {
        async fn process(&self, input: &str) -> Result<String, crate::error::ProcessError> {
            Ok(input.to_uppercase())
        }
    }

    fn write_input(path: &Path, cells: &[&str]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1").unwrap();
        for (row, cell) in cells.iter().enumerate() {
            sheet.write_string(row as u32, 0, *cell).unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_unwritable_output_keeps_report() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.xlsx");
        write_input(&input_path, &["a", "b"]);

        let config = Config {
            input_path: input_path.display().to_string(),
            output_dir: dir.path().join("missing").display().to_string(),
            ..Config::default()
        };
        let app = App::with_processor(config, Arc::new(UpperProcessor));

        let err = app.run().await.unwrap_err();
        match err.downcast_ref::<AppError>() {
            Some(AppError::ExportIncomplete { report, source }) => {
                assert!(!report.saved);
                assert_eq!(report.submitted, 2);
                assert_eq!(report.results[1].output, "B");
                assert!(matches!(**source, AppError::Export { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_processing() {
        let config = Config {
            input_path: "no-such-input.xlsx".to_string(),
            ..Config::default()
        };
        let app = App::initialize(config).await.unwrap();

        let err = app.run().await.unwrap_err();
        assert!(err.to_string().contains("no-such-input.xlsx"));
    }
}
