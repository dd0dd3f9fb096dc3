//! Short-lived user-visible messages.

use serde::Serialize;

/// How long the page shows a notice.
pub const NOTICE_DURATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration_ms: u64,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            duration_ms: NOTICE_DURATION_MS,
        }
    }

    /// Shown when a result stopped at the row cap.
    pub fn truncated(row_limit: u32) -> Self {
        Self::info(format!("Showing the first {} rows.", row_limit))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            duration_ms: NOTICE_DURATION_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_serializes_level_lowercase() {
        let json = serde_json::to_value(Notice::error("Error loading data: boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["duration_ms"], 3000);
        assert_eq!(json["message"], "Error loading data: boom");
    }
}
