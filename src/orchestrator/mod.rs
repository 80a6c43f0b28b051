//! 编排层
//!
//! - `app` - 应用主结构，持有会话并逐条执行命令
//! - `command` - 交互命令解析

pub mod app;
pub mod command;

pub use app::{App, Reply};
pub use command::{Command, CommandError};
