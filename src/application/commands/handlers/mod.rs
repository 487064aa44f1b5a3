//! Command Handlers 实现

mod command_handler;

pub use command_handler::*;
