//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 播放队列（FIFO）
//! - 传输状态: idle / paused / playing
//! - 音量与播放通道连接状态

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{EnqueueOutcome, PlaybackQueue, PlaybackSnapshot};
pub use errors::PlaybackError;
pub use value_objects::{Track, TrackId, TransportState, Volume};
