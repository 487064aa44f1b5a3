//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Playback Context: 播放队列与传输状态
//! - Security Context: 输入清洗与权限

pub mod playback;
pub mod security;
