//! 数据库模块
//!
//! SQLite 存储：建表语句与各实体的数据访问层（DAO）。
//!
//! ## 模块结构
//! - `schema`: 建表与索引
//! - `dao`: 各实体的 DAO

pub mod dao;
pub mod schema;
