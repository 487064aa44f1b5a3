//! Bot Commands - 聊天命令
//!
//! 命令文本已去掉前缀并经过清洗，这里只负责拆分与参数解析

use crate::application::error::ApplicationError;
use crate::domain::security::Permission;

/// 一条入站聊天消息
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// 发送者 ID，同时作为限流的 actor
    pub author_id: String,
    /// 消息所在频道
    pub channel_id: String,
    /// 播放上下文（通常是服务器 ID），决定使用哪个播放会话
    pub context_id: String,
    pub content: String,
    /// 发送者拥有的权限
    pub permissions: Vec<Permission>,
}

/// 聊天命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Help,
    /// 入队；空闲时立即开始播放
    Play { url: String, title: Option<String> },
    Pause,
    Resume,
    Skip,
    Stop,
    Queue,
    NowPlaying,
    /// 无参数时查询音量
    Volume { percent: Option<u8> },
    /// 0-based 队列下标
    Remove { index: usize },
    /// 0-based 队列下标
    Move { from: usize, to: usize },
    Clear,
    Join { channel_id: String },
    Leave,
    RateLimit,
}

impl BotCommand {
    /// 解析命令文本（不含前缀）
    ///
    /// 用户输入的队列位置从 1 开始，解析后转换为 0-based 下标
    pub fn parse(input: &str) -> Result<Self, ApplicationError> {
        let mut parts = input.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| ApplicationError::validation("Empty command"))?
            .to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "help" => Self::Help,
            "play" => {
                let url = args
                    .first()
                    .ok_or_else(|| ApplicationError::validation("Please provide a URL to play."))?;
                let title = (args.len() > 1).then(|| args[1..].join(" "));
                Self::Play {
                    url: url.to_string(),
                    title,
                }
            }
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "skip" | "next" => Self::Skip,
            "stop" => Self::Stop,
            "queue" | "q" => Self::Queue,
            "nowplaying" | "np" => Self::NowPlaying,
            "volume" | "vol" => Self::Volume {
                percent: args.first().map(|raw| parse_percent(raw)).transpose()?,
            },
            "remove" => Self::Remove {
                index: parse_position(args.first().copied())?,
            },
            "move" => Self::Move {
                from: parse_position(args.first().copied())?,
                to: parse_position(args.get(1).copied())?,
            },
            "clear" => Self::Clear,
            "join" => {
                let channel_id = args.first().ok_or_else(|| {
                    ApplicationError::validation("Please provide a voice channel ID to join.")
                })?;
                Self::Join {
                    channel_id: channel_id.to_string(),
                }
            }
            "leave" => Self::Leave,
            "ratelimit" | "limits" => Self::RateLimit,
            other => return Err(ApplicationError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// 执行命令所需的权限，None 表示任何人都可以执行
    pub fn required_permission(&self) -> Option<Permission> {
        match self {
            Self::Help | Self::Queue | Self::NowPlaying | Self::RateLimit => None,
            Self::Volume { percent: None } => None,
            _ => Some(Permission::Music),
        }
    }
}

fn parse_percent(raw: &str) -> Result<u8, ApplicationError> {
    raw.parse::<u8>()
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            ApplicationError::validation("Please provide a valid volume level between 0 and 100.")
        })
}

fn parse_position(raw: Option<&str>) -> Result<usize, ApplicationError> {
    let raw = raw.ok_or_else(|| ApplicationError::validation("Please provide a queue position."))?;
    match raw.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => Err(ApplicationError::validation(format!(
            "Invalid queue position: {} (positions start at 1)",
            raw
        ))),
    }
}
