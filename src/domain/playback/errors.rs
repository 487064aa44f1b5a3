//! Playback Context - Errors

use thiserror::Error;

/// 播放队列错误
///
/// 两者都是可预期的结果，由调用方转成用户可见的提示，不是故障
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("queue is empty")]
    QueueEmpty,

    #[error("index out of range: {index} (queue length: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
