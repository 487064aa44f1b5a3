//! In-Memory Channel Activity Tracker

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::application::ports::{ChannelActivityPort, ChatMessage, Clock};
use crate::infrastructure::adapters::SystemClock;

#[derive(Debug, Default)]
struct ChannelLog {
    since_last_trigger: u32,
    recent: VecDeque<ChatMessage>,
}

/// 内存频道活跃度跟踪
///
/// channel_id -> 计数与最近 `history_limit` 条消息
pub struct InMemoryChannelActivity {
    channels: DashMap<String, ChannelLog>,
    trigger_every: u32,
    history_limit: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryChannelActivity {
    pub fn new(trigger_every: u32, history_limit: usize) -> Self {
        Self::with_clock(trigger_every, history_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(trigger_every: u32, history_limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            channels: DashMap::new(),
            trigger_every: trigger_every.max(1),
            history_limit,
            clock,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl ChannelActivityPort for InMemoryChannelActivity {
    fn record(&self, channel_id: &str, author: &str, content: &str) -> bool {
        let mut log = self.channels.entry(channel_id.to_owned()).or_default();

        log.recent.push_back(ChatMessage {
            author: author.to_string(),
            content: content.to_string(),
            timestamp: self.clock.now(),
        });
        while log.recent.len() > self.history_limit {
            log.recent.pop_front();
        }

        log.since_last_trigger += 1;
        if log.since_last_trigger >= self.trigger_every {
            log.since_last_trigger = 0;
            tracing::debug!(channel_id = %channel_id, "Channel activity threshold reached");
            return true;
        }
        false
    }

    fn history(&self, channel_id: &str) -> Vec<ChatMessage> {
        self.channels
            .get(channel_id)
            .map(|log| log.recent.iter().cloned().collect())
            .unwrap_or_default()
    }
}
