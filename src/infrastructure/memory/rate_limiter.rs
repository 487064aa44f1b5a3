//! In-Memory Rate Limiter Implementation

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::application::ports::{Clock, RateLimitPolicy, RateLimiterPort};
use crate::infrastructure::adapters::SystemClock;

/// 内存滑动窗口限流器
///
/// actor -> 放行时间戳（从旧到新）。DashMap 分片加锁：
/// 同一 actor 的操作互斥，不同 actor 通常落在不同分片上互不阻塞。
/// 过期记录在访问时惰性清理，空闲的 actor 不会被移除。
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    history: DashMap<String, VecDeque<DateTime<Utc>>>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            history: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// 当前记录过的 actor 数量（只增不减）
    pub fn tracked_actors(&self) -> usize {
        self.history.len()
    }

    fn is_live(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - timestamp < self.window()
    }

    fn window(&self) -> Duration {
        self.policy.window()
    }

    fn prune(&self, timestamps: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
        timestamps.retain(|t| self.is_live(*t, now));
    }
}

impl RateLimiterPort for InMemoryRateLimiter {
    fn admit(&self, actor: &str) -> bool {
        let mut timestamps = self.history.entry(actor.to_owned()).or_default();
        // 持锁后再取时间，保证同一 actor 的记录按时间有序
        let now = self.clock.now();
        self.prune(&mut timestamps, now);

        if timestamps.len() >= self.policy.max_requests() as usize {
            tracing::debug!(
                actor = %actor,
                max_requests = self.policy.max_requests(),
                "Request rate limited"
            );
            return false;
        }

        timestamps.push_back(now);
        true
    }

    fn remaining(&self, actor: &str) -> u32 {
        let max_requests = self.policy.max_requests();
        match self.history.get_mut(actor) {
            Some(mut timestamps) => {
                let now = self.clock.now();
                self.prune(&mut timestamps, now);
                let used = u32::try_from(timestamps.len()).unwrap_or(u32::MAX);
                max_requests.saturating_sub(used)
            }
            None => max_requests,
        }
    }

    fn reset_at(&self, actor: &str) -> DateTime<Utc> {
        let now = self.clock.now();
        self.history
            .get(actor)
            .and_then(|timestamps| {
                timestamps
                    .iter()
                    .copied()
                    .find(|t| self.is_live(*t, now))
            })
            .map(|oldest| oldest + self.window())
            .unwrap_or(now)
    }
}
