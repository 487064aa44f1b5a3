//! Session Registry Port - 播放上下文到播放会话的映射

use std::sync::Arc;

use super::{PlaybackSessionPort, SessionError};

/// Session Registry Port
///
/// 每个播放上下文对应唯一一个会话，会话在上下文存续期间一直存在
pub trait SessionRegistryPort: Send + Sync {
    /// 创建新会话，已存在时返回错误
    fn create(&self, context_id: &str) -> Result<Arc<dyn PlaybackSessionPort>, SessionError>;

    /// 获取会话，不存在时创建
    fn get_or_create(&self, context_id: &str) -> Arc<dyn PlaybackSessionPort>;

    /// 获取会话
    fn get(&self, context_id: &str) -> Result<Arc<dyn PlaybackSessionPort>, SessionError>;

    /// 移除会话
    fn remove(&self, context_id: &str) -> Result<(), SessionError>;

    /// 获取所有播放上下文 ID
    fn list_all(&self) -> Vec<String>;
}
