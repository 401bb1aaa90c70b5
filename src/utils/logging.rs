//! 日志工具模块
//!
//! 日志同时输出到终端和 `logs/<启动时间>.log`，由 `init_logging` 返回的
//! `LoggingGuard` 持有文件写入器，析构时刷新并关闭日志文件。

use crate::orchestrator::PipelineReport;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// 日志句柄，需要在程序运行期间一直持有
pub struct LoggingGuard {
    log_path: PathBuf,
    _file_guard: WorkerGuard,
}

impl LoggingGuard {
    /// 本次运行的日志文件
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// 初始化日志系统
///
/// # 参数
/// - `log_dir`: 日志目录，不存在时自动创建
///
/// # 返回
/// 返回日志句柄；通过 `RUST_LOG` 调整日志级别，默认 `info`
pub fn init_logging(log_dir: impl AsRef<Path>) -> io::Result<LoggingGuard> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let file_name = format!("{}.log", chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let log_path = log_dir.join(file_name);
    info!("日志系统初始化完成，日志文件：{}", log_path.display());

    Ok(LoggingGuard {
        log_path,
        _file_guard: file_guard,
    })
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_workers`: 最大并发数
/// - `input_path`: 输入文件
pub fn log_startup(max_workers: usize, input_path: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并发处理模式");
    info!("📊 最大并发数: {}", max_workers);
    info!("📄 输入文件: {}", input_path);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &PipelineReport) {
    info!("{}", "=".repeat(60));
    info!("✅ 处理完成！");
    info!("总行数: {}", report.total_rows);
    info!("已提交: {} / 跳过空行: {}", report.submitted, report.skipped);
    info!("成功: {} / 失败: {}", report.succeeded, report.failed.len());
    info!("总耗时: {:?}", report.elapsed);
    if report.saved {
        info!("结果已保存到 {}", report.output_path.display());
    } else {
        warn!("❌ 结果未能保存到 {}", report.output_path.display());
    }
    info!("{}", "=".repeat(60));

    for (index, error) in &report.failed {
        warn!("❌ 第 {} 条处理失败: {}", index + 1, error);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
