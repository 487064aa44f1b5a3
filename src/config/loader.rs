//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `CADENCE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `CADENCE_RATE_LIMIT__MAX_REQUESTS=10`
/// - `CADENCE_RATE_LIMIT__WINDOW_SECS=30`
/// - `CADENCE_BOT__PREFIX=!`
/// - `CADENCE_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("rate_limit.max_requests", 5)?
        .set_default("rate_limit.window_secs", 60)?
        .set_default("bot.prefix", "/")?
        .set_default("bot.proactive_every", 10)?
        .set_default("bot.history_limit", 20)?
        .set_default("playback.default_volume", 1.0)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: CADENCE_BOT__PREFIX=!
    builder = builder.add_source(
        Environment::with_prefix("CADENCE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.rate_limit.max_requests == 0 {
        return Err(ConfigError::ValidationError(
            "rate_limit.max_requests must be at least 1".to_string(),
        ));
    }

    if config.rate_limit.window_secs == 0 || config.rate_limit.policy().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "rate_limit.window_secs out of range: {}",
            config.rate_limit.window_secs
        )));
    }

    if config.bot.prefix.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Command prefix cannot be empty".to_string(),
        ));
    }

    if config.bot.proactive_every == 0 {
        return Err(ConfigError::ValidationError(
            "bot.proactive_every cannot be 0".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.playback.default_volume) {
        return Err(ConfigError::ValidationError(format!(
            "playback.default_volume must be between 0.0 and 1.0, got {}",
            config.playback.default_volume
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!(
        "Rate Limit: {} commands per {}s",
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    );
    tracing::info!("Command Prefix: {}", config.bot.prefix);
    tracing::info!("History Limit: {} messages", config.bot.history_limit);
    tracing::info!("Proactive Reply Every: {} messages", config.bot.proactive_every);
    tracing::info!("Default Volume: {}", config.playback.volume());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
