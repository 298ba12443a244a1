//! 路由 handler 模块

pub mod auth;
pub mod consultation;
pub mod optional;
pub mod projects;
pub mod share;
pub mod steps;
pub mod tools;
