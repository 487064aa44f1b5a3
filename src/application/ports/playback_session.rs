//! Playback Session Port - 单个播放上下文的并发安全访问
//!
//! 定义播放会话的抽象接口，具体实现在 infrastructure/memory 层

use thiserror::Error;

use crate::domain::playback::{
    EnqueueOutcome, PlaybackError, PlaybackSnapshot, Track, TransportState, Volume,
};

/// Session Registry 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Playback session not found: {0}")]
    NotFound(String),

    #[error("Playback session already exists: {0}")]
    AlreadyExists(String),
}

/// Playback Session Port
///
/// 每个会话一个临界区：所有读写操作相互串行；
/// 读操作返回独立副本，调用方遍历时不会观察到并发修改。
pub trait PlaybackSessionPort: Send + Sync {
    /// 播放上下文 ID（服务器/频道）
    fn context_id(&self) -> &str;

    /// 追加到队尾
    fn enqueue(&self, track: Track);

    /// 入队，空闲时在同一临界区内开始播放
    fn enqueue_and_start_if_idle(&self, track: Track) -> EnqueueOutcome;

    /// 开始或继续播放，返回当前曲目
    fn start_or_resume(&self) -> Result<Track, PlaybackError>;

    /// 暂停（幂等）
    fn pause(&self);

    /// 继续当前曲目而不出队，返回是否处于播放状态
    fn resume(&self) -> bool;

    /// 跳到下一首，返回新的当前曲目
    fn skip(&self) -> Result<Track, PlaybackError>;

    /// 停止并清空队列
    fn stop(&self);

    /// 设置音量（钳制到 [0, 1]），返回实际保存的值
    fn set_volume(&self, volume: f64) -> Volume;

    /// 移除指定位置的曲目并返回它
    fn remove_at(&self, index: usize) -> Result<Track, PlaybackError>;

    /// 移动队列中的曲目
    fn move_in_queue(&self, from: usize, to: usize) -> Result<(), PlaybackError>;

    /// 只清空队列
    fn clear_queue(&self);

    /// 记录已连接的播放通道
    fn connect(&self, channel_id: &str);

    fn disconnect(&self);

    // Snapshots
    fn queue(&self) -> Vec<Track>;

    fn queue_len(&self) -> usize;

    fn current(&self) -> Option<Track>;

    fn is_playing(&self) -> bool;

    fn volume(&self) -> Volume;

    fn is_connected(&self) -> bool;

    fn channel_id(&self) -> Option<String>;

    fn transport_state(&self) -> TransportState;

    /// 在同一个临界区内取得完整状态
    fn snapshot(&self) -> PlaybackSnapshot;
}
