//! Command Handler - 入站消息处理
//!
//! 处理顺序: 前缀判断 -> 限流 -> 清洗 -> 解析 -> 权限 -> 执行。
//! 队列为空、位置越界等情况都转换成给用户的提示文本，不会向上抛出。

use std::sync::Arc;

use crate::application::commands::{BotCommand, InboundMessage};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChannelActivityPort, ChatMessage, Clock, PlaybackSessionPort, RateLimiterPort,
    SessionRegistryPort,
};
use crate::domain::playback::{EnqueueOutcome, PlaybackError, Track, TrackId};
use crate::domain::security::{
    contains_profanity, has_permission, is_valid_discord_id, sanitize_input, validate_url,
};

/// 处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 不需要回复
    Ignored,
    /// 请求被限流，命令未执行
    RateLimited { retry_after_secs: u64 },
    /// 普通文本回复
    Text(String),
    /// 频道消息累计到阈值，调用方可以基于近期历史主动发言
    ProactiveDue {
        channel_id: String,
        history: Vec<ChatMessage>,
    },
}

impl Reply {
    fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }
}

/// Command Handler
///
/// 持有限流器与播放会话注册表，是它们唯一的调用方
pub struct CommandHandler {
    prefix: String,
    rate_limiter: Arc<dyn RateLimiterPort>,
    sessions: Arc<dyn SessionRegistryPort>,
    activity: Arc<dyn ChannelActivityPort>,
    clock: Arc<dyn Clock>,
}

impl CommandHandler {
    pub fn new(
        prefix: impl Into<String>,
        rate_limiter: Arc<dyn RateLimiterPort>,
        sessions: Arc<dyn SessionRegistryPort>,
        activity: Arc<dyn ChannelActivityPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            rate_limiter,
            sessions,
            activity,
            clock,
        }
    }

    pub fn handle(&self, message: &InboundMessage) -> Reply {
        let Some(body) = message.content.strip_prefix(self.prefix.as_str()) else {
            return self.handle_regular(message);
        };

        if !self.rate_limiter.admit(&message.author_id) {
            return Reply::RateLimited {
                retry_after_secs: self.seconds_until_reset(&message.author_id),
            };
        }

        let body = sanitize_input(body);
        if body.is_empty() {
            return Reply::Ignored;
        }

        let result = BotCommand::parse(&body).and_then(|command| {
            if let Some(required) = command.required_permission() {
                if !has_permission(&message.permissions, required) {
                    return Err(ApplicationError::PermissionDenied(required));
                }
            }
            tracing::debug!(
                author_id = %message.author_id,
                context_id = %message.context_id,
                command = ?command,
                "Executing command"
            );
            self.execute(message, command)
        });

        match result {
            Ok(text) => Reply::text(text),
            Err(e) => Reply::text(self.describe_error(&e)),
        }
    }

    fn handle_regular(&self, message: &InboundMessage) -> Reply {
        if self
            .activity
            .record(&message.channel_id, &message.author_id, &message.content)
        {
            return Reply::ProactiveDue {
                channel_id: message.channel_id.clone(),
                history: self.activity.history(&message.channel_id),
            };
        }
        Reply::Ignored
    }

    fn execute(
        &self,
        message: &InboundMessage,
        command: BotCommand,
    ) -> Result<String, ApplicationError> {
        let session = self.sessions.get_or_create(&message.context_id);

        match command {
            BotCommand::Help => Ok(self.help_text()),
            BotCommand::Play { url, title } => self.play(session.as_ref(), url, title),
            BotCommand::Pause => {
                session.pause();
                Ok("Playback paused.".to_string())
            }
            BotCommand::Resume => {
                if session.resume() {
                    return Ok("Playback resumed.".to_string());
                }
                let track = session.start_or_resume()?;
                Ok(format!("Now playing: {}", track.title()))
            }
            BotCommand::Skip => match session.skip() {
                Ok(track) => Ok(format!("Skipped. Now playing: {}", track.title())),
                Err(PlaybackError::QueueEmpty) => {
                    Ok("Skipped. The queue is empty, playback stopped.".to_string())
                }
                Err(e) => Err(e.into()),
            },
            BotCommand::Stop => {
                session.stop();
                Ok("Playback stopped and queue cleared.".to_string())
            }
            BotCommand::Queue => Ok(format_queue(&session.queue())),
            BotCommand::NowPlaying => {
                let snapshot = session.snapshot();
                Ok(match (&snapshot.current, snapshot.transport_state()) {
                    (Some(track), state) => format!(
                        "Now playing: {} [{}] | volume {} | {} in queue",
                        track.title(),
                        state,
                        snapshot.volume,
                        snapshot.queue.len()
                    ),
                    (None, _) => "Nothing is playing.".to_string(),
                })
            }
            BotCommand::Volume { percent: None } => {
                Ok(format!("Current volume: {}", session.volume()))
            }
            BotCommand::Volume {
                percent: Some(percent),
            } => {
                let volume = session.set_volume(f64::from(percent) / 100.0);
                Ok(format!("Volume set to {}", volume))
            }
            BotCommand::Remove { index } => {
                let track = session.remove_at(index)?;
                Ok(format!("Removed from queue: {}", track.title()))
            }
            BotCommand::Move { from, to } => {
                session.move_in_queue(from, to)?;
                Ok(format!(
                    "Moved track from position {} to {}.",
                    from + 1,
                    to + 1
                ))
            }
            BotCommand::Clear => {
                session.clear_queue();
                Ok("Queue cleared.".to_string())
            }
            BotCommand::Join { channel_id } => {
                if !is_valid_discord_id(&channel_id) {
                    return Err(ApplicationError::validation("Invalid voice channel ID."));
                }
                session.connect(&channel_id);
                Ok(format!("Connected to voice channel {}.", channel_id))
            }
            BotCommand::Leave => {
                session.disconnect();
                Ok("Disconnected from voice channel.".to_string())
            }
            BotCommand::RateLimit => {
                let remaining = self.rate_limiter.remaining(&message.author_id);
                let next_expiry = self.seconds_until_reset(&message.author_id);
                Ok(format!(
                    "{} commands remaining in the current window; oldest request expires in {}s.",
                    remaining, next_expiry
                ))
            }
        }
    }

    fn play(
        &self,
        session: &dyn PlaybackSessionPort,
        url: String,
        title: Option<String>,
    ) -> Result<String, ApplicationError> {
        if !validate_url(&url) {
            return Err(ApplicationError::validation("Invalid URL provided."));
        }
        let title = title.unwrap_or_else(|| url.clone());
        if contains_profanity(&title) {
            return Err(ApplicationError::validation(
                "That title contains words that are not allowed.",
            ));
        }

        let track = Track::new(TrackId::generate(), title, url);
        let title = track.title().to_string();

        // 暂停时只入队，避免跳过暂停中的曲目
        Ok(match session.enqueue_and_start_if_idle(track) {
            EnqueueOutcome::Started(_) => format!("Now playing: {}", title),
            EnqueueOutcome::Queued { position } => {
                format!("Added to queue: {} (position {})", title, position)
            }
        })
    }

    fn seconds_until_reset(&self, actor: &str) -> u64 {
        let wait = self.rate_limiter.reset_at(actor) - self.clock.now();
        // 向上取整到秒
        let millis = wait.num_milliseconds().max(0) as u64;
        millis.div_ceil(1000)
    }

    fn describe_error(&self, error: &ApplicationError) -> String {
        match error {
            ApplicationError::ValidationError(message) => message.clone(),
            ApplicationError::Playback(PlaybackError::QueueEmpty) => {
                "The queue is empty.".to_string()
            }
            ApplicationError::Playback(PlaybackError::IndexOutOfRange { len, .. }) => {
                format!("There is no track at that position (queue has {} tracks).", len)
            }
            ApplicationError::UnknownCommand(name) => format!(
                "Unknown command: {}. Type {}help for available commands.",
                name, self.prefix
            ),
            ApplicationError::PermissionDenied(permission) => format!(
                "You need the '{}' permission to use this command.",
                permission
            ),
        }
    }

    fn help_text(&self) -> String {
        let p = &self.prefix;
        [
            "Available commands:".to_string(),
            format!("{p}help - Show this help message"),
            format!("{p}play <url> [title] - Add a track to the queue"),
            format!("{p}pause - Pause playback"),
            format!("{p}resume - Resume playback"),
            format!("{p}skip - Skip to next track"),
            format!("{p}stop - Stop playback and clear queue"),
            format!("{p}queue - Show current queue"),
            format!("{p}np - Show the current track"),
            format!("{p}volume [level] - Show or set volume (0-100)"),
            format!("{p}remove <position> - Remove a track from the queue"),
            format!("{p}move <from> <to> - Move a track within the queue"),
            format!("{p}clear - Clear the queue"),
            format!("{p}join <channel id> - Connect to a voice channel"),
            format!("{p}leave - Disconnect from the voice channel"),
            format!("{p}ratelimit - Show your remaining command quota"),
        ]
        .join("\n")
    }
}

fn format_queue(queue: &[Track]) -> String {
    if queue.is_empty() {
        return "Queue is empty.".to_string();
    }
    let mut message = String::from("Current queue:");
    for (i, track) in queue.iter().enumerate() {
        message.push_str(&format!("\n{}. {}", i + 1, track.title()));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RateLimitPolicy;
    use crate::domain::playback::{TransportState, Volume};
    use crate::domain::security::Permission;
    use crate::infrastructure::adapters::ManualClock;
    use crate::infrastructure::memory::{
        InMemoryChannelActivity, InMemoryRateLimiter, InMemorySessionRegistry,
    };
    use chrono::Duration;
    use std::num::NonZeroU32;

    struct Fixture {
        handler: CommandHandler,
        sessions: Arc<InMemorySessionRegistry>,
        clock: Arc<ManualClock>,
    }

    fn fixture(max_requests: u32) -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let policy = RateLimitPolicy::new(
            NonZeroU32::new(max_requests).unwrap(),
            Duration::seconds(60),
        );
        let limiter = InMemoryRateLimiter::with_clock(policy, clock.clone()).arc();
        let sessions = InMemorySessionRegistry::new(Volume::default()).arc();
        let activity = InMemoryChannelActivity::with_clock(3, 20, clock.clone()).arc();
        let handler = CommandHandler::new("/", limiter, sessions.clone(), activity, clock.clone());
        Fixture {
            handler,
            sessions,
            clock,
        }
    }

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            author_id: "user-1".to_string(),
            channel_id: "channel-1".to_string(),
            context_id: "guild-1".to_string(),
            content: content.to_string(),
            permissions: vec![Permission::Music],
        }
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("expected text reply, got {:?}", other),
        }
    }

    #[test]
    fn test_play_starts_idle_session() {
        let f = fixture(20);
        let reply = text(f.handler.handle(&message("/play https://example.com/a Song A")));
        assert_eq!(reply, "Now playing: Song A");

        let reply = text(f.handler.handle(&message("/play https://example.com/b Song B")));
        assert_eq!(reply, "Added to queue: Song B (position 1)");

        let session = f.sessions.get("guild-1").unwrap();
        assert_eq!(session.current().unwrap().title(), "Song A");
        assert!(session.is_playing());
    }

    #[test]
    fn test_play_while_paused_only_enqueues() {
        let f = fixture(20);
        f.handler.handle(&message("/play https://example.com/a A"));
        f.handler.handle(&message("/pause"));
        f.handler.handle(&message("/play https://example.com/b B"));

        let session = f.sessions.get("guild-1").unwrap();
        assert_eq!(session.transport_state(), TransportState::Paused);
        assert_eq!(session.current().unwrap().title(), "A");
        assert_eq!(session.queue_len(), 1);

        assert_eq!(text(f.handler.handle(&message("/resume"))), "Playback resumed.");
        assert!(session.is_playing());
    }

    #[test]
    fn test_play_rejects_internal_url() {
        let f = fixture(20);
        let reply = text(f.handler.handle(&message("/play http://127.0.0.1/admin")));
        assert_eq!(reply, "Invalid URL provided.");
        assert_eq!(f.sessions.get("guild-1").unwrap().queue_len(), 0);
    }

    #[test]
    fn test_skip_and_queue_empty_messages() {
        let f = fixture(20);
        assert_eq!(text(f.handler.handle(&message("/resume"))), "The queue is empty.");

        f.handler.handle(&message("/play https://example.com/a A"));
        f.handler.handle(&message("/play https://example.com/b B"));
        assert_eq!(
            text(f.handler.handle(&message("/skip"))),
            "Skipped. Now playing: B"
        );
        assert_eq!(
            text(f.handler.handle(&message("/skip"))),
            "Skipped. The queue is empty, playback stopped."
        );
        assert_eq!(text(f.handler.handle(&message("/np"))), "Nothing is playing.");
    }

    #[test]
    fn test_queue_editing() {
        let f = fixture(20);
        for name in ["a", "b", "c", "d"] {
            f.handler
                .handle(&message(&format!("/play https://example.com/{} {}", name, name)));
        }
        assert_eq!(
            text(f.handler.handle(&message("/queue"))),
            "Current queue:\n1. b\n2. c\n3. d"
        );

        f.handler.handle(&message("/move 1 3"));
        assert_eq!(
            text(f.handler.handle(&message("/queue"))),
            "Current queue:\n1. c\n2. d\n3. b"
        );

        assert_eq!(text(f.handler.handle(&message("/remove 2"))), "Removed from queue: d");
        assert_eq!(
            text(f.handler.handle(&message("/remove 3"))),
            "There is no track at that position (queue has 2 tracks)."
        );

        f.handler.handle(&message("/clear"));
        assert_eq!(text(f.handler.handle(&message("/queue"))), "Queue is empty.");
    }

    #[test]
    fn test_volume_commands() {
        let f = fixture(20);
        assert_eq!(text(f.handler.handle(&message("/volume"))), "Current volume: 100%");
        assert_eq!(text(f.handler.handle(&message("/volume 42"))), "Volume set to 42%");
        assert_eq!(
            text(f.handler.handle(&message("/volume 300"))),
            "Please provide a valid volume level between 0 and 100."
        );
        assert_eq!(
            f.sessions.get("guild-1").unwrap().volume().value(),
            0.42
        );
    }

    #[test]
    fn test_join_and_leave() {
        let f = fixture(20);
        assert_eq!(
            text(f.handler.handle(&message("/join 123456789012345678"))),
            "Connected to voice channel 123456789012345678."
        );
        let session = f.sessions.get("guild-1").unwrap();
        assert!(session.is_connected());

        assert_eq!(
            text(f.handler.handle(&message("/join general"))),
            "Invalid voice channel ID."
        );
        f.handler.handle(&message("/leave"));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_rate_limited_command_is_not_executed() {
        let f = fixture(2);
        f.handler.handle(&message("/play https://example.com/a A"));
        f.clock.advance(Duration::seconds(15));
        f.handler.handle(&message("/play https://example.com/b B"));

        let reply = f.handler.handle(&message("/play https://example.com/c C"));
        assert_eq!(reply, Reply::RateLimited { retry_after_secs: 45 });
        assert_eq!(f.sessions.get("guild-1").unwrap().queue_len(), 1);

        // 其他用户不受影响
        let mut other = message("/queue");
        other.author_id = "user-2".to_string();
        assert!(matches!(f.handler.handle(&other), Reply::Text(_)));

        f.clock.advance(Duration::seconds(45));
        assert!(matches!(
            f.handler.handle(&message("/queue")),
            Reply::Text(_)
        ));
    }

    #[test]
    fn test_ratelimit_command() {
        let f = fixture(5);
        assert_eq!(
            text(f.handler.handle(&message("/ratelimit"))),
            "4 commands remaining in the current window; oldest request expires in 60s."
        );
    }

    #[test]
    fn test_permission_required() {
        let f = fixture(20);
        let mut guest = message("/skip");
        guest.permissions.clear();
        assert_eq!(
            text(f.handler.handle(&guest)),
            "You need the 'music' permission to use this command."
        );

        guest.content = "/queue".to_string();
        assert_eq!(text(f.handler.handle(&guest)), "Queue is empty.");

        let mut admin = message("/pause");
        admin.permissions = vec![Permission::Admin];
        assert_eq!(text(f.handler.handle(&admin)), "Playback paused.");
    }

    #[test]
    fn test_unknown_command() {
        let f = fixture(20);
        assert_eq!(
            text(f.handler.handle(&message("/dance"))),
            "Unknown command: dance. Type /help for available commands."
        );
        assert_eq!(f.handler.handle(&message("/")), Reply::Ignored);
    }

    #[test]
    fn test_regular_messages_trigger_proactive_reply() {
        let f = fixture(20);
        assert_eq!(f.handler.handle(&message("hello")), Reply::Ignored);
        assert_eq!(f.handler.handle(&message("anyone here?")), Reply::Ignored);

        match f.handler.handle(&message("quiet today")) {
            Reply::ProactiveDue {
                channel_id,
                history,
            } => {
                assert_eq!(channel_id, "channel-1");
                assert_eq!(history.len(), 3);
                assert_eq!(history[0].content, "hello");
                assert!(history.iter().all(|m| m.timestamp == f.clock.now()));
            }
            other => panic!("expected proactive reply, got {:?}", other),
        }
    }
}
