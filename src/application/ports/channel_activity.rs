//! Channel Activity Port - 频道消息计数与近期历史
//!
//! 非命令消息按频道计数，每满 N 条提示调用方可以主动发言

use chrono::{DateTime, Utc};

/// 一条频道消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Channel Activity Port
pub trait ChannelActivityPort: Send + Sync {
    /// 记录一条消息；计数达到阈值时清零并返回 true
    fn record(&self, channel_id: &str, author: &str, content: &str) -> bool;

    /// 频道近期消息的副本，按时间从旧到新
    fn history(&self, channel_id: &str) -> Vec<ChatMessage>;
}
