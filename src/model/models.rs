//! Consolidated database models

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// CALENDAR
// =============================================================================

#[derive(Debug, Clone, FromRow, Deserialize, Serialize, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub user: String,
    pub time: Option<String>,
}

/// Event as accepted by the store, before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub date: String,
    pub title: String,
    pub user: String,
    pub time: Option<String>,
}

// =============================================================================
// PUSH
// =============================================================================

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Subscription {
    pub id: i64,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Notification_Log {
    pub id: i64,
    pub event_id: i64,
    pub category: String,
    pub day: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    DailyDigest,
    Reminder,
    WeeklyLookAhead,
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationCategory::DailyDigest => write!(f, "daily_digest"),
            NotificationCategory::Reminder => write!(f, "reminder"),
            NotificationCategory::WeeklyLookAhead => {
                write!(f, "weekly_look_ahead")
            },
        }
    }
}
