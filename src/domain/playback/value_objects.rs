//! Playback Context - Value Objects

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 曲目唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 来源没有提供 ID 时生成一个随机 ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 曲目 - 一个可播放条目
///
/// 构造完成后不可变；来源地址由调用方在入队前解析与校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    title: String,
    source_url: String,
    duration: Duration,
    thumbnail_url: Option<String>,
    uploader: Option<String>,
}

impl Track {
    pub fn new(id: TrackId, title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            source_url: source_url.into(),
            duration: Duration::ZERO,
            thumbnail_url: None,
            uploader: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    // Getters
    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn uploader(&self) -> Option<&str> {
        self.uploader.as_deref()
    }
}

/// 音量 (0.0 - 1.0)
///
/// 不变量: 值始终落在 [0.0, 1.0]，越界输入在写入时钳制而不是拒绝
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Volume(f64);

impl Volume {
    pub const MUTED: Volume = Volume(0.0);
    pub const FULL: Volume = Volume(1.0);

    /// NaN 视为静音
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MUTED;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// 百分比形式 (0 - 100)
    pub fn percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::FULL
    }
}

impl std::fmt::Display for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// 播放传输状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// 没有当前曲目
    Idle,
    /// 有当前曲目，未播放
    Paused,
    /// 有当前曲目，播放中
    Playing,
}

impl TransportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Paused => "paused",
            Self::Playing => "playing",
        }
    }
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
