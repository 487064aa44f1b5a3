//! Cadence - 聊天机器人音乐播放核心
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Playback Context: 播放队列状态机
//! - Security: 权限与输入清洗
//!
//! 应用层 (application/):
//! - Ports: 端口定义（RateLimiter, PlaybackSession, SessionRegistry, ChannelActivity, Clock）
//! - Commands: 聊天命令解析与处理
//!
//! 基础设施层 (infrastructure/):
//! - Memory: 限流器、播放会话、会话注册表、频道活跃度的内存实现
//! - Adapters: 时钟

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
