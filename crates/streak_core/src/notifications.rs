use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotification {
    DayLogged { date: NaiveDate },
    DayUnlogged { date: NaiveDate },
    DayFrozen { date: NaiveDate, used: usize, max: usize },
    DayUnfrozen { date: NaiveDate, used: usize, max: usize },
    FreezeQuotaReached { date: NaiveDate, max: usize },
    WeekChanged { anchor: NaiveDate },
    TopicUpdated { topic: String },
}

impl SessionNotification {
    /// Short, user-facing line for a status bar.
    pub fn message(&self) -> String {
        match self {
            SessionNotification::DayLogged { date } => format!("Logged {}", date.format("%b %-d")),
            SessionNotification::DayUnlogged { date } => {
                format!("Removed {} from the streak", date.format("%b %-d"))
            }
            SessionNotification::DayFrozen { date, used, max } => {
                format!("Froze {} ({used}/{max})", date.format("%b %-d"))
            }
            SessionNotification::DayUnfrozen { date, used, max } => {
                format!("Unfroze {} ({used}/{max})", date.format("%b %-d"))
            }
            SessionNotification::FreezeQuotaReached { max, .. } => {
                format!("Cannot freeze more days. All {max} freezes are used.")
            }
            SessionNotification::WeekChanged { anchor } => {
                format!("Week of {}", anchor.format("%b %-d, %Y"))
            }
            SessionNotification::TopicUpdated { topic } => format!("Now learning {topic}"),
        }
    }
}

/// Receivers of tracker changes, e.g. a UI status line.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &SessionNotification);
}
