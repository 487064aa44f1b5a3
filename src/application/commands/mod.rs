//! 应用层 - 命令
//!
//! 聊天命令的解析与执行

mod bot_commands;

pub mod handlers;

pub use bot_commands::*;
