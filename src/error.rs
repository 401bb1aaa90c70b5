//! 错误类型
//!
//! - `AppError`：致命错误（输入、导出、配置、结果收集），会终止本次运行
//! - `ProcessError`：单条任务的远程调用失败，只会体现在该任务的结果里
//! - `CollectError`：结果收集阶段的错误

use crate::orchestrator::PipelineReport;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文件不可读、工作表不存在等
    #[error("输入错误 ({path}): {message}")]
    Input { path: String, message: String },

    /// 输出文件写入失败
    #[error("导出错误 ({path}): {message}")]
    Export { path: String, message: String },

    /// 所有任务已处理完成，但导出失败；带有本次运行的统计和全部结果
    #[error("导出失败 ({} 条结果已处理完成但未保存): {source}", .report.submitted)]
    ExportIncomplete {
        report: Box<PipelineReport>,
        source: Box<AppError>,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 结果收集失败
    #[error(transparent)]
    Collect(#[from] CollectError),
}

impl AppError {
    /// 创建输入错误
    pub fn input(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Input {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// 创建导出错误
    pub fn export(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Export {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

/// 单条任务处理失败的原因
///
/// 不会中断其他任务，只作为结果的一部分返回给调用方。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// 请求构造或网络调用失败，或返回了非成功状态
    #[error("API请求失败: {0}")]
    RequestFailed(String),

    /// 返回结果中没有可用内容
    #[error("API返回内容为空")]
    EmptyResponse,

    /// 单次调用超时
    #[error("API调用超时 ({secs}秒)")]
    Timeout { secs: u64 },

    /// 工作协程异常退出
    #[error("工作协程异常退出: {0}")]
    WorkerAborted(String),
}

/// 结果收集错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectError {
    /// 结果流在收齐之前关闭
    #[error("结果不完整: 期望 {expected} 条, 实际收到 {received} 条")]
    Incomplete { expected: usize, received: usize },

    /// 结果索引与提交的任务索引不一致
    #[error("结果索引不一致: 缺失 {missing:?}, 重复 {duplicated:?}")]
    IndexMismatch {
        missing: Vec<usize>,
        duplicated: Vec<usize>,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
