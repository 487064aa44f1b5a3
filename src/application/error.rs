//! 应用层错误定义
//!
//! 统一的命令处理错误类型

use thiserror::Error;

use crate::domain::playback::PlaybackError;
use crate::domain::security::Permission;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 命令格式或参数错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 播放队列状态不允许该操作
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// 未知命令
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// 缺少执行命令所需的权限
    #[error("Permission denied: requires {0}")]
    PermissionDenied(Permission),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}
