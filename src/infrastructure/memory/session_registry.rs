//! In-Memory Session Registry Implementation

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use super::InMemoryPlaybackSession;
use crate::application::ports::{PlaybackSessionPort, SessionError, SessionRegistryPort};
use crate::domain::playback::Volume;

/// 内存会话注册表
///
/// context_id -> 播放会话。新会话使用统一的初始音量
pub struct InMemorySessionRegistry {
    sessions: DashMap<String, Arc<InMemoryPlaybackSession>>,
    default_volume: Volume,
}

impl InMemorySessionRegistry {
    pub fn new(default_volume: Volume) -> Self {
        Self {
            sessions: DashMap::new(),
            default_volume,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn new_session(&self, context_id: &str) -> Arc<InMemoryPlaybackSession> {
        tracing::info!(context_id = %context_id, "Playback session created");
        InMemoryPlaybackSession::new(context_id, self.default_volume).arc()
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new(Volume::default())
    }
}

impl SessionRegistryPort for InMemorySessionRegistry {
    fn create(&self, context_id: &str) -> Result<Arc<dyn PlaybackSessionPort>, SessionError> {
        match self.sessions.entry(context_id.to_owned()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyExists(context_id.to_string())),
            Entry::Vacant(vacant) => {
                let session: Arc<dyn PlaybackSessionPort> =
                    vacant.insert(self.new_session(context_id)).clone();
                Ok(session)
            }
        }
    }

    fn get_or_create(&self, context_id: &str) -> Arc<dyn PlaybackSessionPort> {
        if let Some(session) = self.sessions.get(context_id) {
            return session.clone();
        }
        self.sessions
            .entry(context_id.to_owned())
            .or_insert_with(|| self.new_session(context_id))
            .clone()
    }

    fn get(&self, context_id: &str) -> Result<Arc<dyn PlaybackSessionPort>, SessionError> {
        self.sessions
            .get(context_id)
            .map(|s| s.clone() as Arc<dyn PlaybackSessionPort>)
            .ok_or_else(|| SessionError::NotFound(context_id.to_string()))
    }

    fn remove(&self, context_id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(context_id)
            .map(|_| {
                tracing::info!(context_id = %context_id, "Playback session removed");
            })
            .ok_or_else(|| SessionError::NotFound(context_id.to_string()))
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::{Track, TrackId};
    use std::thread;

    #[test]
    fn test_registry_lifecycle() {
        let registry = InMemorySessionRegistry::new(Volume::new(0.5));

        // Create
        let session = registry.create("guild-1").unwrap();
        assert_eq!(session.volume().value(), 0.5);
        assert!(matches!(
            registry.create("guild-1"),
            Err(SessionError::AlreadyExists(_))
        ));

        // Get returns the same session
        session.enqueue(Track::new(TrackId::new("a"), "A", "https://example.com/a"));
        assert_eq!(registry.get("guild-1").unwrap().queue_len(), 1);
        assert_eq!(registry.get_or_create("guild-1").queue_len(), 1);

        // Remove
        assert!(registry.remove("guild-1").is_ok());
        assert!(matches!(registry.get("guild-1"), Err(SessionError::NotFound(_))));
        assert!(matches!(registry.remove("guild-1"), Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_get_or_create_is_shared_across_threads() {
        let registry = InMemorySessionRegistry::default();

        thread::scope(|scope| {
            for i in 0..8 {
                let registry = &registry;
                scope.spawn(move || {
                    let session = registry.get_or_create("guild-1");
                    session.enqueue(Track::new(
                        TrackId::new(i.to_string()),
                        "T",
                        "https://example.com/t",
                    ));
                });
            }
        });

        assert_eq!(registry.list_all(), vec!["guild-1".to_string()]);
        assert_eq!(registry.get("guild-1").unwrap().queue_len(), 8);
    }
}
