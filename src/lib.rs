//! # Batch LLM
//!
//! 把表格中的每一行发送给 LLM 接口，并发处理后按原顺序导出结果。
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - `Task`（索引 + 输入）与 `TaskResult`（索引 + 输入 + 输出 + 错误）
//!
//! ### ② 能力层（Services / Clients）
//! - `RemoteProcessor` - 远程处理能力，`LlmClient` 是基于 OpenAI 兼容接口的实现
//! - `RowSource` / `ResultExporter` - 表格读取与结果导出
//!
//! ### ③ 编排层（Orchestration）
//! - `WorkerPool` - 每个任务一个协程，Semaphore 限制同时进行的调用数
//! - `ResultCollector` - 收集每个任务恰好一条结果
//! - `Pipeline` - 提交、等待、校验、按索引导出
//! - `App` - 应用入口
//!
//! 单条任务失败只会得到一条输出为空、带错误信息的结果，不会影响其他任务。

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::LlmClient;
pub use config::Config;
pub use error::{AppError, AppResult, CollectError, ProcessError};
pub use models::{Task, TaskResult};
pub use orchestrator::{App, Pipeline, PipelineReport, ResultCollector, ResultSink, WorkerPool};
pub use services::{ExcelExporter, ExcelRowSource, RemoteProcessor, ResultExporter, RowSource};
