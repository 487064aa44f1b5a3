//! Security Context - 输入安全与权限
//!
//! 职责:
//! - 用户输入清洗
//! - 标识符与 URL 校验
//! - 权限判断

mod input;
mod permissions;

pub use input::{
    contains_profanity, is_valid_discord_id, sanitize_input, validate_url, MAX_INPUT_LEN,
};
pub use permissions::{has_permission, Permission};
