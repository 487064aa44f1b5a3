//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::num::NonZeroU32;

use crate::application::ports::RateLimitPolicy;
use crate::domain::playback::Volume;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 限流配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// 机器人配置
    #[serde(default)]
    pub bot: BotConfig,

    /// 播放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 限流配置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// 每个窗口内每个用户最多放行的命令数
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// 窗口长度（秒）
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    /// 转换为限流策略，max_requests 为 0 或窗口无法表示时返回 None
    pub fn policy(&self) -> Option<RateLimitPolicy> {
        let max_requests = NonZeroU32::new(self.max_requests)?;
        let secs = i64::try_from(self.window_secs).ok()?;
        let window = chrono::Duration::try_seconds(secs)?;
        Some(RateLimitPolicy::new(max_requests, window))
    }
}

/// 机器人配置
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// 命令前缀
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// 频道里每累计多少条普通消息触发一次主动发言
    #[serde(default = "default_proactive_every")]
    pub proactive_every: u32,

    /// 每个频道保留的近期消息条数
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_proactive_every() -> u32 {
    10
}

fn default_history_limit() -> usize {
    20
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            proactive_every: default_proactive_every(),
            history_limit: default_history_limit(),
        }
    }
}

/// 播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 新建会话的初始音量 (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub default_volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
        }
    }
}

impl PlaybackConfig {
    pub fn volume(&self) -> Volume {
        Volume::new(self.default_volume)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
