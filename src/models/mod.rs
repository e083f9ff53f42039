//! 核心数据模型模块
//!
//! 定义 Wellog 的核心数据结构：ActivityRecord, NewActivity, DateRange。

pub mod activity;

pub use activity::*;
