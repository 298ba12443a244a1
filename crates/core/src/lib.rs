//! 核心类型和工具模块
//!
//! 包含 models, errors, frameworks, database, config 等基础功能

pub mod config;
pub mod database;
pub mod errors;
pub mod frameworks;
pub mod models;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
