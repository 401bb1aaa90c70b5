//! 结果收集器
//!
//! 工作协程通过 `ResultSink` 提交结果，`ResultCollector::await_all` 等到结果数量
//! 达到期望值后一次性返回。内部是一个无界通道，提交方永远不会被阻塞。

use crate::error::CollectError;
use crate::models::TaskResult;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::debug;

/// 结果提交端，可以在多个工作协程之间克隆
#[derive(Debug, Clone)]
pub struct ResultSink {
    sender: mpsc::UnboundedSender<TaskResult>,
}

impl ResultSink {
    /// 记录一条结果
    ///
    /// 收集器已经被丢弃时返回 `false`。
    pub fn accept(&self, result: TaskResult) -> bool {
        self.sender.send(result).is_ok()
    }
}

/// 结果收集器
#[derive(Debug)]
pub struct ResultCollector {
    receiver: mpsc::UnboundedReceiver<TaskResult>,
}

impl ResultCollector {
    /// 创建收集器和对应的提交端
    pub fn new() -> (Self, ResultSink) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, ResultSink { sender })
    }

    /// 等待收齐 `expected` 条结果
    ///
    /// 返回顺序为到达顺序。所有提交端都已关闭但数量仍不足时返回
    /// `CollectError::Incomplete`，不会无限等待。收齐之后队列里若还有多余的结果，
    /// 也会一并返回，交给调用方校验。
    pub async fn await_all(mut self, expected: usize) -> Result<Vec<TaskResult>, CollectError> {
        let mut results = Vec::with_capacity(expected);

        while results.len() < expected {
            match self.receiver.recv().await {
                Some(result) => results.push(result),
                None => {
                    return Err(CollectError::Incomplete {
                        expected,
                        received: results.len(),
                    })
                }
            }
        }

        while let Ok(extra) = self.receiver.try_recv() {
            results.push(extra);
        }

        debug!("已收集 {} 条结果", results.len());
        Ok(results)
    }
}

/// 校验结果索引恰好是 `0..expected`，没有缺失也没有重复
pub fn verify_indices(results: &[TaskResult], expected: usize) -> Result<(), CollectError> {
    let mut seen = BTreeSet::new();
    let mut duplicated = Vec::new();
    for result in results {
        if !seen.insert(result.index) {
            duplicated.push(result.index);
        }
    }

    let missing: Vec<usize> = (0..expected).filter(|i| !seen.contains(i)).collect();
    let out_of_range = seen.iter().any(|&i| i >= expected);

    if missing.is_empty() && duplicated.is_empty() && !out_of_range {
        Ok(())
    } else {
        Err(CollectError::IndexMismatch { missing, duplicated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn ok(index: usize) -> TaskResult {
        TaskResult::success(Task::new(index, format!("in-{}", index)), format!("out-{}", index))
    }

    #[tokio::test]
    async fn test_await_all_from_concurrent_senders() {
        let (collector, sink) = ResultCollector::new();

        for index in (0..20).rev() {
            let sink = sink.clone();
            tokio::spawn(async move {
                assert!(sink.accept(ok(index)));
            });
        }
        drop(sink);

        let results = collector.await_all(20).await.unwrap();
        assert_eq!(results.len(), 20);
        assert!(verify_indices(&results, 20).is_ok());
    }

    #[tokio::test]
    async fn test_zero_expected_returns_immediately() {
        let (collector, _sink) = ResultCollector::new();
        let results = collector.await_all(0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_closed_stream_is_incomplete() {
        let (collector, sink) = ResultCollector::new();
        sink.accept(ok(0));
        drop(sink);

        let err = collector.await_all(2).await.unwrap_err();
        assert_eq!(
            err,
            CollectError::Incomplete {
                expected: 2,
                received: 1
            }
        );
    }

    #[test]
    fn test_verify_indices_reports_gaps_and_duplicates() {
        let results = vec![ok(0), ok(0), ok(2)];
        let err = verify_indices(&results, 3).unwrap_err();
        assert_eq!(
            err,
            CollectError::IndexMismatch {
                missing: vec![1],
                duplicated: vec![0],
            }
        );
    }

    #[test]
    fn test_accept_after_collector_dropped() {
        let (collector, sink) = ResultCollector::new();
        drop(collector);
        assert!(!sink.accept(ok(0)));
    }
}
