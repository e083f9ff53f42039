//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod activity_handler;

pub use activity_handler::*;
