//! Wellog - 健康活动记录服务
//!
//! 记录用户的饮水、睡眠、运动和冥想数据，并按日期范围读取。
//! 读路径采用 cache-aside：先查读缓存，未命中再查主存储并回填缓存。

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;
