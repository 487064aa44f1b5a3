//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod channel_activity;
mod clock;
mod playback_session;
mod rate_limiter;
mod session_registry;

pub use channel_activity::{ChannelActivityPort, ChatMessage};
pub use clock::Clock;
pub use playback_session::{PlaybackSessionPort, SessionError};
pub use rate_limiter::{RateLimitPolicy, RateLimiterPort};
pub use session_registry::SessionRegistryPort;
