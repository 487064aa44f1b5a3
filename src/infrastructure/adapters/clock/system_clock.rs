//! System Clock - 系统墙钟

use chrono::{DateTime, Utc};

use crate::application::ports::Clock;

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
