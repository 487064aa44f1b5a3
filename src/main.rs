//! Cadence - 聊天机器人音乐播放核心
//!
//! 控制台前端：从标准输入逐行读取消息，每行交给 CommandHandler 处理。
//! 行首写 `@名字` 可以切换发送者，用来观察按用户限流。

use std::future::Future;
use std::sync::Arc;

use cadence::application::commands::handlers::{CommandHandler, Reply};
use cadence::application::commands::InboundMessage;
use cadence::config::{load_config, print_config, AppConfig};
use cadence::domain::security::Permission;
use cadence::infrastructure::adapters::SystemClock;
use cadence::infrastructure::memory::{
    InMemoryChannelActivity, InMemoryRateLimiter, InMemorySessionRegistry,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

const CONSOLE_CONTEXT: &str = "console";
const CONSOLE_CHANNEL: &str = "console";
const DEFAULT_AUTHOR: &str = "console-user";

/// 回复输出
type ReplySink = Arc<dyn Fn(String) + Send + Sync>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Cadence - 聊天机器人音乐播放核心");
    print_config(&config);

    let handler = Arc::new(build_handler(&config)?);
    let stdout: ReplySink = Arc::new(|text: String| println!("{}", text));

    tracing::info!("Reading messages from stdin...");
    serve(
        BufReader::new(tokio::io::stdin()),
        handler,
        stdout,
        shutdown_signal(),
    )
    .await;

    tracing::info!("Shutdown complete");

    Ok(())
}

/// 逐行读取消息，每行一个任务；输入结束或收到关闭信号后等待所有任务完成
async fn serve<R, S>(reader: R, handler: Arc<CommandHandler>, sink: ReplySink, shutdown: S)
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut tasks = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read input");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let handler = handler.clone();
                let sink = sink.clone();
                tasks.spawn(async move {
                    let message = console_message(&line);
                    if let Some(text) = render_reply(&message.author_id, handler.handle(&message)) {
                        sink(text);
                    }
                });
            }
            _ = &mut shutdown => break,
        }
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Message task failed");
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},cadence={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_handler(config: &AppConfig) -> anyhow::Result<CommandHandler> {
    let policy = config
        .rate_limit
        .policy()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let clock = Arc::new(SystemClock);
    let rate_limiter = InMemoryRateLimiter::with_clock(policy, clock.clone()).arc();
    let sessions = InMemorySessionRegistry::new(config.playback.volume()).arc();
    let activity = InMemoryChannelActivity::with_clock(
        config.bot.proactive_every,
        config.bot.history_limit,
        clock.clone(),
    )
    .arc();

    Ok(CommandHandler::new(
        config.bot.prefix.clone(),
        rate_limiter,
        sessions,
        activity,
        clock,
    ))
}

fn console_message(line: &str) -> InboundMessage {
    let (author_id, content) = match line.strip_prefix('@') {
        Some(rest) => rest.split_once(' ').unwrap_or((rest, "")),
        None => (DEFAULT_AUTHOR, line),
    };

    InboundMessage {
        author_id: author_id.to_string(),
        channel_id: CONSOLE_CHANNEL.to_string(),
        context_id: CONSOLE_CONTEXT.to_string(),
        content: content.trim().to_string(),
        permissions: vec![Permission::Music],
    }
}

fn render_reply(author_id: &str, reply: Reply) -> Option<String> {
    match reply {
        Reply::Ignored => None,
        Reply::Text(text) => Some(text),
        Reply::RateLimited { retry_after_secs } => Some(format!(
            "{}: you're sending commands too fast. Try again in {}s.",
            author_id, retry_after_secs
        )),
        Reply::ProactiveDue {
            channel_id,
            history,
        } => Some(format!(
            "[{}] {} recent messages, time to say something.",
            channel_id,
            history.len()
        )),
    }
}
