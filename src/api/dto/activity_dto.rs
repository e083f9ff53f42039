//! 活动 DTO
//!
//! 定义活动记录相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::activity::{ActivityRecord, NewActivity};

/// 录入活动请求
#[derive(Debug, Clone, Deserialize)]
pub struct LogActivityRequest {
    /// 用户标识
    pub user_id: String,
    /// 日期
    pub date: String,
    /// 饮水量（升）
    pub hydration_liters: f64,
    /// 睡眠时长（小时）
    pub sleep_hours: f64,
    /// 运动时长（分钟）
    pub exercise_minutes: f64,
    /// 冥想时长（分钟）
    pub meditation_minutes: f64,
    /// 来源，缺省为 `manual`
    #[serde(default)]
    pub source: Option<String>,
}

impl From<LogActivityRequest> for NewActivity {
    fn from(req: LogActivityRequest) -> Self {
        NewActivity {
            user_id: req.user_id,
            date: req.date,
            hydration_liters: req.hydration_liters,
            sleep_hours: req.sleep_hours,
            exercise_minutes: req.exercise_minutes,
            meditation_minutes: req.meditation_minutes,
            source: req.source,
        }
    }
}

/// 日期范围查询参数
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActivityRangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ActivityRangeParams {
    /// Empty query values (`?start=`) count as absent.
    pub fn bounds(&self) -> (Option<&str>, Option<&str>) {
        (non_empty(&self.start), non_empty(&self.end))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// 活动记录响应
pub type ActivityResponse = ActivityRecord;

/// 活动列表响应头 `X-Cache` 的取值
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_are_absent() {
        let params = ActivityRangeParams {
            start: Some(String::new()),
            end: Some("2024-01-03".into()),
        };
        assert_eq!(params.bounds(), (None, Some("2024-01-03")));
    }

    #[test]
    fn test_request_without_source() {
        let req: LogActivityRequest = serde_json::from_str(
            r#"{"user_id":"u1","date":"2024-01-01","hydration_liters":2,
                "sleep_hours":8,"exercise_minutes":30,"meditation_minutes":10}"#,
        )
        .unwrap();
        let activity = NewActivity::from(req);
        assert_eq!(activity.source, None);
        assert_eq!(activity.hydration_liters, 2.0);
    }
}
