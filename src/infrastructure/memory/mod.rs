//! Memory Layer - In-Memory State Management
//!
//! 实现限流器、播放会话与频道活跃度的内存状态管理

mod channel_activity;
mod playback_session;
mod rate_limiter;
mod session_registry;

pub use channel_activity::InMemoryChannelActivity;
pub use playback_session::InMemoryPlaybackSession;
pub use rate_limiter::InMemoryRateLimiter;
pub use session_registry::InMemorySessionRegistry;
