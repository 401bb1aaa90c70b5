//! 远程处理能力
//!
//! 只描述"给一段文本，返回一段文本或失败"，不关心并发和顺序。

use crate::error::ProcessError;
use async_trait::async_trait;

/// 远程处理器
///
/// 实现方需要可以被多个工作协程同时调用。
#[async_trait]
pub trait RemoteProcessor: Send + Sync {
    /// 处理单条输入文本
    async fn process(&self, input: &str) -> Result<String, ProcessError>;
}
