//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（RateLimiter、PlaybackSession、SessionRegistry 等）
//! - commands: 聊天命令解析及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{CommandHandler, Reply},
    BotCommand, InboundMessage,
};

pub use error::ApplicationError;

pub use ports::{
    // Channel activity
    ChannelActivityPort,
    ChatMessage,
    // Clock
    Clock,
    // Playback session
    PlaybackSessionPort,
    SessionError,
    SessionRegistryPort,
    // Rate limiter
    RateLimitPolicy,
    RateLimiterPort,
};
