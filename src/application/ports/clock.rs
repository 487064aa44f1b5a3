//! Clock Port - 时间来源
//!
//! 限流窗口依赖"当前时间"，抽象出来以便测试中手动推进

use chrono::{DateTime, Utc};

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
