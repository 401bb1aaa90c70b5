//! 编排层
//!
//! ```text
//! batch_processor (App：读取配置、创建客户端、生成输出文件名)
//!     ↓
//! pipeline (Pipeline：行 → 任务 → 结果 → 导出)
//!     ↓
//! worker_pool (并发执行，Semaphore 限流) + result_collector (收集结果)
//!     ↓
//! services (能力层：远程处理 / 读取 / 导出)
//! ```

pub mod batch_processor;
pub mod pipeline;
pub mod result_collector;
pub mod worker_pool;

pub use batch_processor::App;
pub use pipeline::{export_results, Pipeline, PipelineReport, ProcessedRows};
pub use result_collector::{ResultCollector, ResultSink};
pub use worker_pool::WorkerPool;
