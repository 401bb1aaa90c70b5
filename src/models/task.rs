//! 任务与结果
//!
//! `Task` 在提交时创建，之后不再修改；`TaskResult` 由处理该任务的工作协程创建一次。

use crate::error::ProcessError;

/// 一个待处理的单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 按提交顺序分配的连续索引（从0开始）
    pub index: usize,
    /// 输入文本
    pub payload: String,
}

impl Task {
    pub fn new(index: usize, payload: impl Into<String>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }
}

/// 单个任务的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// 对应任务的索引
    pub index: usize,
    /// 原始输入
    pub input: String,
    /// 输出内容，失败时为空
    pub output: String,
    /// 失败原因
    pub error: Option<ProcessError>,
}

impl TaskResult {
    /// 成功的结果
    pub fn success(task: Task, output: String) -> Self {
        Self {
            index: task.index,
            input: task.payload,
            output,
            error: None,
        }
    }

    /// 失败的结果，输出为空
    pub fn failure(task: Task, error: ProcessError) -> Self {
        Self {
            index: task.index,
            input: task.payload,
            output: String::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_empty_output() {
        let result = TaskResult::failure(Task::new(3, "hello"), ProcessError::EmptyResponse);

        assert_eq!(result.index, 3);
        assert_eq!(result.input, "hello");
        assert!(result.output.is_empty());
        assert!(!result.is_success());
    }

    #[test]
    fn test_success_keeps_task_input() {
        let result = TaskResult::success(Task::new(0, "world"), "WORLD".to_string());

        assert_eq!(result.index, 0);
        assert_eq!(result.input, "world");
        assert_eq!(result.output, "WORLD");
        assert!(result.is_success());
    }
}
