//! 流水线驱动
//!
//! 负责把输入行变成任务、提交给工作池、等待全部完成，再按索引顺序导出。
//!
//! ```text
//! rows → Task(0..M) → WorkerPool → ResultSink → ResultCollector → 排序 → ResultExporter
//! ```

use crate::config::Config;
use crate::error::{AppError, AppResult, ProcessError};
use crate::models::{Task, TaskResult};
use crate::orchestrator::result_collector::{verify_indices, ResultCollector};
use crate::orchestrator::worker_pool::WorkerPool;
use crate::services::{RemoteProcessor, ResultExporter, RowSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 一次运行的统计
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// 原始行数（包括空行）
    pub total_rows: usize,
    /// 实际提交的任务数
    pub submitted: usize,
    /// 跳过的空行数
    pub skipped: usize,
    pub succeeded: usize,
    /// 失败任务的索引和原因
    pub failed: Vec<(usize, ProcessError)>,
    /// 所有结果，按索引升序排列
    pub results: Vec<TaskResult>,
    pub output_path: PathBuf,
    /// 输出文件是否保存成功
    pub saved: bool,
    pub elapsed: Duration,
}

impl PipelineReport {
    fn new(processed: ProcessedRows, output_path: &Path) -> Self {
        let failed: Vec<(usize, ProcessError)> = processed
            .results
            .iter()
            .filter_map(|r| r.error.clone().map(|e| (r.index, e)))
            .collect();

        Self {
            total_rows: processed.total_rows,
            submitted: processed.results.len(),
            skipped: processed.skipped,
            succeeded: processed.results.len() - failed.len(),
            failed,
            results: processed.results,
            output_path: output_path.to_path_buf(),
            saved: false,
            elapsed: Duration::ZERO,
        }
    }
}

/// 处理完但尚未导出的结果
#[derive(Debug)]
pub struct ProcessedRows {
    pub total_rows: usize,
    pub skipped: usize,
    /// 按索引升序排列
    pub results: Vec<TaskResult>,
}

/// 流水线驱动
pub struct Pipeline {
    processor: Arc<dyn RemoteProcessor>,
    max_workers: usize,
    request_timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(processor: Arc<dyn RemoteProcessor>, max_workers: usize) -> Self {
        Self {
            processor,
            max_workers,
            request_timeout: None,
        }
    }

    pub fn from_config(processor: Arc<dyn RemoteProcessor>, config: &Config) -> Self {
        Self::new(processor, config.max_workers).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 完整运行：读取 → 处理 → 导出
    ///
    /// `source.get_rows()` 在当前线程上同步执行，读取大文件时应先在
    /// `spawn_blocking` 中读出所有行，再调用 `run_rows`。读取失败时不会提交任何任务。
    pub async fn run(
        &self,
        source: &dyn RowSource,
        exporter: &mut dyn ResultExporter,
        output_path: &Path,
    ) -> AppResult<PipelineReport> {
        let rows = source.get_rows()?;
        self.run_rows(rows, exporter, output_path).await
    }

    /// 处理已经读出的行并导出
    ///
    /// 导出失败时返回 `AppError::ExportIncomplete`，其中带有完整的统计和所有结果。
    pub async fn run_rows(
        &self,
        rows: Vec<Vec<String>>,
        exporter: &mut dyn ResultExporter,
        output_path: &Path,
    ) -> AppResult<PipelineReport> {
        let start = Instant::now();
        info!("✅ 成功读取输入，共有 {} 行数据需要处理", rows.len());

        let processed = self.process_rows(rows).await?;
        let mut report = PipelineReport::new(processed, output_path);

        let exported = export_results(&report.results, exporter, output_path);
        report.elapsed = start.elapsed();

        match exported {
            Ok(()) => {
                report.saved = true;
                Ok(report)
            }
            Err(e) => {
                error!(
                    "❌ 保存文件失败: {} ({} 条结果已处理完成但未能保存)",
                    e, report.submitted
                );
                Err(AppError::ExportIncomplete {
                    report: Box::new(report),
                    source: Box::new(e),
                })
            }
        }
    }

    /// 提交所有非空行并等待结果
    ///
    /// 索引只分配给实际提交的任务，所以空行不会在结果中留下空位。
    pub async fn process_rows(&self, rows: Vec<Vec<String>>) -> AppResult<ProcessedRows> {
        let total_rows = rows.len();
        let (collector, sink) = ResultCollector::new();
        let mut pool = WorkerPool::new(self.max_workers, Arc::clone(&self.processor), sink)
            .with_timeout(self.request_timeout);

        info!("开始并发处理数据，并发数: {}", pool.size());

        let mut skipped = 0;
        for (row_number, row) in rows.into_iter().enumerate() {
            match first_cell(row) {
                Some(payload) => {
                    let index = pool.submitted();
                    pool.submit(Task::new(index, payload));
                }
                None => {
                    warn!("⚠️ 跳过第 {} 行：空行", row_number + 1);
                    skipped += 1;
                }
            }
        }

        let submitted = pool.submitted();
        pool.join().await;

        let mut results = collector.await_all(submitted).await?;
        verify_indices(&results, submitted)?;
        results.sort_by_key(|r| r.index);

        Ok(ProcessedRows {
            total_rows,
            skipped,
            results,
        })
    }
}

/// 按索引升序写入所有结果，然后保存
pub fn export_results(
    results: &[TaskResult],
    exporter: &mut dyn ResultExporter,
    output_path: &Path,
) -> AppResult<()> {
    let mut ordered: Vec<&TaskResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.index);

    for result in ordered {
        exporter.write_result(result.index, &result.input, &result.output)?;
    }
    exporter.save(output_path)
}

/// 取第一个单元格作为输入，没有任何单元格的行视为空行
fn first_cell(row: Vec<String>) -> Option<String> {
    row.into_iter().next()
}
