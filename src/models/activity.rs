use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 手动录入的来源标记
pub const SOURCE_MANUAL: &str = "manual";
/// 设备同步的来源标记
pub const SOURCE_DEVICE: &str = "device";

fn default_source() -> String {
    SOURCE_MANUAL.to_string()
}

/// 活动记录
///
/// 每个用户每天一条（语义上，不强制）。创建后不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    /// 存储分配的唯一标识
    pub id: String,

    /// 用户标识
    pub user_id: String,

    /// 日期，按字典序比较（如 `2024-01-01`）
    pub date: String,

    /// 饮水量（升）
    pub hydration_liters: f64,

    /// 睡眠时长（小时）
    pub sleep_hours: f64,

    /// 运动时长（分钟）
    pub exercise_minutes: f64,

    /// 冥想时长（分钟）
    pub meditation_minutes: f64,

    /// 来源：`manual` 或 `device`
    #[serde(default = "default_source")]
    pub source: String,

    /// 写入时间
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// 由录入请求生成新记录，分配 ID 和写入时间
    pub fn new(activity: NewActivity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: activity.user_id,
            date: activity.date,
            hydration_liters: activity.hydration_liters,
            sleep_hours: activity.sleep_hours,
            exercise_minutes: activity.exercise_minutes,
            meditation_minutes: activity.meditation_minutes,
            source: activity.source.unwrap_or_else(default_source),
            created_at: Utc::now(),
        }
    }

    /// 日期是否落在闭区间内
    pub fn within(&self, range: &DateRange) -> bool {
        range.contains(&self.date)
    }
}

/// 活动录入请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewActivity {
    pub user_id: String,
    pub date: String,
    pub hydration_liters: f64,
    pub sleep_hours: f64,
    pub exercise_minutes: f64,
    pub meditation_minutes: f64,
    #[serde(default)]
    pub source: Option<String>,
}

/// 闭区间日期范围，按字典序比较
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// 仅当两端都给出时才构造范围。
    ///
    /// 只给出一端时不做任何日期过滤，返回该用户的全部记录。
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

/// 主存储查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub user_id: String,
    pub range: Option<DateRange>,
}

impl ActivityQuery {
    pub fn new(user_id: impl Into<String>, start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            range: DateRange::from_bounds(start, end),
        }
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        record.user_id == self.user_id
            && self.range.as_ref().is_none_or(|range| record.within(range))
    }
}
