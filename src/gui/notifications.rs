//! Notification list shown in the corner overlay.

use crate::error::FlowError;
use chrono::{DateTime, Local};
use std::collections::VecDeque;

const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    /// The user backed out of something. Shown without alarm.
    Cancelled,
    Error,
}

#[derive(Clone, Debug)]
pub struct NotificationEntry {
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: DateTime<Local>,
}

impl NotificationEntry {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Local::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    /// Classify a failed job. Declined prompts become quiet `Cancelled`
    /// entries; everything else is an error prefixed with `context`.
    pub fn from_error(context: &str, err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FlowError>() {
            Some(flow) if flow.is_silent() => {
                Self::new(NotificationLevel::Cancelled, flow.user_message())
            }
            Some(flow) => Self::new(
                NotificationLevel::Error,
                format!("{}: {}", context, flow.user_message()),
            ),
            None => Self::new(NotificationLevel::Error, format!("{}: {}", context, err)),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self.level {
            NotificationLevel::Info => "[i]",
            NotificationLevel::Success => "[OK]",
            NotificationLevel::Cancelled => "[--]",
            NotificationLevel::Error => "[!!]",
        }
    }

    pub fn time_ago(&self) -> String {
        time_ago_at(self.timestamp, Local::now())
    }
}

fn time_ago_at(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        timestamp.format("%m/%d %H:%M").to_string()
    }
}

/// Bounded, oldest-first notification history.
#[derive(Default)]
pub struct Notifications {
    entries: VecDeque<NotificationEntry>,
}

impl Notifications {
    pub fn push(&mut self, entry: NotificationEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > MAX_NOTIFICATIONS {
            self.entries.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&NotificationEntry> {
        self.entries.back()
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &NotificationEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
