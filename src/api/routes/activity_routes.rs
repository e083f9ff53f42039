//! Activity Routes
//!
//! 定义活动记录相关的 API 路由。

use crate::api::handlers::activity_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建活动路由器
pub fn create_activity_router() -> Router<AppState> {
    Router::new()
        .route("/activity", post(log_activity))
        .route("/activity/:user_id", get(get_activity_logs))
}
