//! 服务模块

pub mod activity;

pub use activity::{
    ActivityLookup, ActivityService, ActivityServiceImpl, CachePolicy, create_activity_service,
    require_records,
};
