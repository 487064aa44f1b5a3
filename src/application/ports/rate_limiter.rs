//! Rate Limiter Port - 按操作者限流
//!
//! 滑动窗口策略：任意长度为 `window` 的时间段内，同一操作者最多被放行
//! `max_requests` 次。具体实现在 infrastructure/memory 层

use chrono::{DateTime, Duration, Utc};
use std::num::NonZeroU32;

/// 限流策略，构造后不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: NonZeroU32,
    window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: NonZeroU32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// 每个窗口内允许的最大请求数
    pub fn max_requests(&self) -> u32 {
        self.max_requests.get()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Rate Limiter Port
///
/// 同一操作者的调用互斥，不同操作者之间可以并行。
/// 所有操作都不会失败，空字符串也是合法的操作者标识。
pub trait RateLimiterPort: Send + Sync {
    /// 尝试放行一次请求
    ///
    /// 放行时记录当前时间；被拒绝的请求不会被记录，不消耗配额
    fn admit(&self, actor: &str) -> bool;

    /// 当前窗口内剩余的配额，不会为负
    fn remaining(&self, actor: &str) -> u32;

    /// 最早一条仍在窗口内的记录过期的时刻；没有记录时返回当前时间
    ///
    /// 注意这是"下一个空位释放的时刻"，不是"何时允许请求"：
    /// 配额未用完时该时刻同样有意义，但操作者此刻已经可以被放行。
    fn reset_at(&self, actor: &str) -> DateTime<Utc>;
}
