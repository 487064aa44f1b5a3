//! In-Memory Playback Session Implementation

use parking_lot::Mutex;
use std::sync::Arc;

use crate::application::ports::PlaybackSessionPort;
use crate::domain::playback::{
    EnqueueOutcome, PlaybackError, PlaybackQueue, PlaybackSnapshot, Track, TransportState,
    Volume,
};

/// 内存播放会话
///
/// 一把互斥锁包住整个 `PlaybackQueue`，所有操作都在同一个临界区内完成。
/// 临界区里不做 I/O，也不回调外部代码。
pub struct InMemoryPlaybackSession {
    context_id: String,
    state: Mutex<PlaybackQueue>,
}

impl InMemoryPlaybackSession {
    pub fn new(context_id: impl Into<String>, volume: Volume) -> Self {
        Self {
            context_id: context_id.into(),
            state: Mutex::new(PlaybackQueue::new(volume)),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl PlaybackSessionPort for InMemoryPlaybackSession {
    fn context_id(&self) -> &str {
        &self.context_id
    }

    fn enqueue(&self, track: Track) {
        let mut state = self.state.lock();
        tracing::debug!(
            context_id = %self.context_id,
            track_id = %track.id(),
            position = state.queue_len(),
            "Track enqueued"
        );
        state.enqueue(track);
    }

    fn enqueue_and_start_if_idle(&self, track: Track) -> EnqueueOutcome {
        let track_id = track.id().clone();
        let outcome = self.state.lock().enqueue_and_start_if_idle(track);
        match &outcome {
            EnqueueOutcome::Started(_) => tracing::debug!(
                context_id = %self.context_id,
                track_id = %track_id,
                "Track enqueued and started"
            ),
            EnqueueOutcome::Queued { position } => tracing::debug!(
                context_id = %self.context_id,
                track_id = %track_id,
                position = *position,
                "Track enqueued"
            ),
        }
        outcome
    }

    fn start_or_resume(&self) -> Result<Track, PlaybackError> {
        let mut state = self.state.lock();
        let track = state.start_or_resume()?.clone();
        tracing::debug!(
            context_id = %self.context_id,
            track_id = %track.id(),
            "Playback started"
        );
        Ok(track)
    }

    fn pause(&self) {
        self.state.lock().pause();
        tracing::debug!(context_id = %self.context_id, "Playback paused");
    }

    fn resume(&self) -> bool {
        self.state.lock().resume()
    }

    fn skip(&self) -> Result<Track, PlaybackError> {
        let mut state = self.state.lock();
        match state.skip() {
            Ok(track) => {
                tracing::debug!(
                    context_id = %self.context_id,
                    track_id = %track.id(),
                    "Skipped to next track"
                );
                Ok(track.clone())
            }
            Err(e) => {
                tracing::debug!(context_id = %self.context_id, "Skipped past end of queue");
                Err(e)
            }
        }
    }

    fn stop(&self) {
        self.state.lock().stop();
        tracing::debug!(context_id = %self.context_id, "Playback stopped");
    }

    fn set_volume(&self, volume: f64) -> Volume {
        let stored = self.state.lock().set_volume(volume);
        tracing::debug!(
            context_id = %self.context_id,
            requested = volume,
            volume = stored.value(),
            "Volume changed"
        );
        stored
    }

    fn remove_at(&self, index: usize) -> Result<Track, PlaybackError> {
        self.state.lock().remove_at(index)
    }

    fn move_in_queue(&self, from: usize, to: usize) -> Result<(), PlaybackError> {
        self.state.lock().move_in_queue(from, to)
    }

    fn clear_queue(&self) {
        self.state.lock().clear_queue();
    }

    fn connect(&self, channel_id: &str) {
        self.state.lock().connect(channel_id);
        tracing::info!(
            context_id = %self.context_id,
            channel_id = %channel_id,
            "Playback sink connected"
        );
    }

    fn disconnect(&self) {
        self.state.lock().disconnect();
        tracing::info!(context_id = %self.context_id, "Playback sink disconnected");
    }

    fn queue(&self) -> Vec<Track> {
        self.state.lock().queue().cloned().collect()
    }

    fn queue_len(&self) -> usize {
        self.state.lock().queue_len()
    }

    fn current(&self) -> Option<Track> {
        self.state.lock().current().cloned()
    }

    fn is_playing(&self) -> bool {
        self.state.lock().is_playing()
    }

    fn volume(&self) -> Volume {
        self.state.lock().volume()
    }

    fn is_connected(&self) -> bool {
        self.state.lock().is_connected()
    }

    fn channel_id(&self) -> Option<String> {
        self.state.lock().channel_id().map(str::to_owned)
    }

    fn transport_state(&self) -> TransportState {
        self.state.lock().transport_state()
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        self.state.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::TrackId;
    use std::thread;

    fn track(id: &str) -> Track {
        Track::new(TrackId::new(id), format!("Track {}", id), format!("https://example.com/{}", id))
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id().as_str()).collect()
    }

    #[test]
    fn test_session_lifecycle() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::default());
        assert_eq!(session.context_id(), "guild-1");
        assert_eq!(session.start_or_resume(), Err(PlaybackError::QueueEmpty));
        assert!(!session.is_playing());
        assert!(session.current().is_none());

        session.enqueue(track("a"));
        session.enqueue(track("b"));
        assert_eq!(session.start_or_resume().unwrap().id().as_str(), "a");
        assert_eq!(ids(&session.queue()), vec!["b"]);

        assert_eq!(session.skip().unwrap().id().as_str(), "b");
        assert_eq!(session.queue_len(), 0);

        assert_eq!(session.skip(), Err(PlaybackError::QueueEmpty));
        assert!(session.current().is_none());
        assert!(!session.is_playing());
        assert_eq!(session.transport_state(), TransportState::Idle);
    }

    #[test]
    fn test_volume_and_connection() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::new(0.8));
        assert_eq!(session.volume().value(), 0.8);
        assert_eq!(session.set_volume(1.7).value(), 1.0);
        assert_eq!(session.set_volume(-0.3).value(), 0.0);

        session.connect("987654321098765432");
        assert!(session.is_connected());
        assert_eq!(session.channel_id().as_deref(), Some("987654321098765432"));
        session.disconnect();
        assert!(!session.is_connected());
    }

    #[test]
    fn test_queue_snapshot_unaffected_by_later_mutation() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::default());
        for id in ["a", "b", "c"] {
            session.enqueue(track(id));
        }

        let view = session.queue();
        session.remove_at(0).unwrap();
        session.move_in_queue(0, 1).unwrap();
        session.enqueue(track("d"));

        assert_eq!(ids(&view), vec!["a", "b", "c"]);
        assert_eq!(ids(&session.queue()), vec!["c", "b", "d"]);
    }

    #[test]
    fn test_remove_at_out_of_range_leaves_queue() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::default());
        session.enqueue(track("a"));
        assert_eq!(
            session.remove_at(1),
            Err(PlaybackError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(ids(&session.queue()), vec!["a"]);
    }

    #[test]
    fn test_concurrent_enqueue_keeps_paused_track() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::default());
        session.enqueue(track("paused"));
        session.start_or_resume().unwrap();

        thread::scope(|scope| {
            for worker in 0..8 {
                let session = &session;
                scope.spawn(move || {
                    for i in 0..50 {
                        session.pause();
                        let outcome =
                            session.enqueue_and_start_if_idle(track(&format!("{}-{}", worker, i)));
                        assert!(matches!(outcome, EnqueueOutcome::Queued { .. }));
                    }
                });
            }
        });

        assert_eq!(session.current().unwrap().id().as_str(), "paused");
        assert_eq!(session.transport_state(), TransportState::Paused);
        assert_eq!(session.queue_len(), 400);
    }

    #[test]
    fn test_concurrent_enqueue_and_playback() {
        let session = InMemoryPlaybackSession::new("guild-1", Volume::default());

        thread::scope(|scope| {
            for worker in 0..8 {
                let session = &session;
                scope.spawn(move || {
                    for i in 0..50 {
                        session.enqueue(track(&format!("{}-{}", worker, i)));
                    }
                });
            }
        });
        assert_eq!(session.queue_len(), 400);

        // 多个线程同时消费队列，每首曲目恰好成为一次 current
        let played = parking_lot::Mutex::new(Vec::new());
        session.start_or_resume().unwrap();
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    while let Ok(track) = session.skip() {
                        played.lock().push(track.id().clone());
                        let snapshot = session.snapshot();
                        if snapshot.playing {
                            assert!(snapshot.current.is_some());
                        }
                    }
                });
            }
        });

        let mut played = played.into_inner();
        played.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        played.dedup();
        assert_eq!(played.len(), 399);
        assert_eq!(session.transport_state(), TransportState::Idle);
    }
}
