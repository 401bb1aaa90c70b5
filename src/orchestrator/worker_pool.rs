//! 工作池
//!
//! 每个任务对应一个独立的 tokio 任务，全部立即启动；共享的 `Semaphore` 限制
//! 同时进行的远程调用不超过 `size` 个。许可在作用域结束时自动归还，
//! 调用成功、失败、超时或者协程 panic 都不会泄漏许可。

use crate::error::ProcessError;
use crate::models::{Task, TaskResult};
use crate::orchestrator::result_collector::ResultSink;
use crate::services::RemoteProcessor;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 固定大小的工作池
pub struct WorkerPool {
    size: usize,
    semaphore: Arc<Semaphore>,
    processor: Arc<dyn RemoteProcessor>,
    sink: ResultSink,
    timeout: Option<Duration>,
    workers: Vec<(Task, JoinHandle<()>)>,
}

impl WorkerPool {
    /// 创建工作池，`size` 为最大并发调用数（至少为 1）
    pub fn new(size: usize, processor: Arc<dyn RemoteProcessor>, sink: ResultSink) -> Self {
        let size = size.max(1);
        Self {
            size,
            semaphore: Arc::new(Semaphore::new(size)),
            processor,
            sink,
            timeout: None,
            workers: Vec::new(),
        }
    }

    /// 设置单次调用超时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 已提交的任务数
    pub fn submitted(&self) -> usize {
        self.workers.len()
    }

    /// 提交任务，立即为其启动工作协程
    pub fn submit(&mut self, task: Task) {
        let semaphore = Arc::clone(&self.semaphore);
        let processor = Arc::clone(&self.processor);
        let sink = self.sink.clone();
        let timeout = self.timeout;
        let worker_task = task.clone();

        let handle = tokio::spawn(async move {
            let result = run_worker(worker_task, semaphore, processor, timeout).await;
            info!("已处理第 {} 条", result.index + 1);
            if !sink.accept(result) {
                warn!("结果收集器已关闭，结果被丢弃");
            }
        });

        self.workers.push((task, handle));
    }

    /// 等待所有工作协程结束，然后关闭结果流
    ///
    /// 异常退出的协程会在这里补上一条失败结果，保证每个任务都有且只有一条结果。
    /// 返回结束的工作协程数量。
    pub async fn join(self) -> usize {
        let WorkerPool { workers, sink, .. } = self;
        let (tasks, handles): (Vec<Task>, Vec<JoinHandle<()>>) = workers.into_iter().unzip();
        let total = handles.len();

        let outcomes = join_all(handles).await;
        for (task, outcome) in tasks.into_iter().zip(outcomes) {
            if let Err(e) = outcome {
                error!("[任务 {}] 工作协程异常退出: {}", task.index, e);
                sink.accept(TaskResult::failure(task, ProcessError::WorkerAborted(e.to_string())));
            }
        }

        debug!("{} 个工作协程全部结束", total);
        total
    }
}

/// 单个工作协程：获取许可 → 调用远程处理器 → 生成结果
async fn run_worker(
    task: Task,
    semaphore: Arc<Semaphore>,
    processor: Arc<dyn RemoteProcessor>,
    timeout: Option<Duration>,
) -> TaskResult {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return TaskResult::failure(task, ProcessError::WorkerAborted(e.to_string())),
    };

    let call = processor.process(&task.payload);
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(ProcessError::Timeout {
                secs: limit.as_secs(),
            })),
        None => call.await,
    };

    match outcome {
        Ok(output) => TaskResult::success(task, output),
        Err(e) => {
            warn!("[任务 {}] ❌ 处理失败: {}", task.index, e);
            TaskResult::failure(task, e)
        }
    }
}
