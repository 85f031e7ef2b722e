//! "Results hidden" notification
//!
//! The notification is visible while at least one result is hidden. It is
//! created the first time it is needed and afterwards only toggled.

use crate::types::NotificationStatus;

/// Whether the notification should be visible.
#[inline]
pub fn is_visible(hidden_count: usize) -> bool {
    hidden_count > 0
}

/// Status the notification should move to, or `None` if it is already right.
pub fn next_status(current: NotificationStatus, hidden_count: usize) -> Option<NotificationStatus> {
    match (current, is_visible(hidden_count)) {
        (NotificationStatus::Absent | NotificationStatus::Collapsed, true) => Some(NotificationStatus::Shown),
        (NotificationStatus::Shown, false) => Some(NotificationStatus::Collapsed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_on_first_hidden_result() {
        assert_eq!(next_status(NotificationStatus::Absent, 1), Some(NotificationStatus::Shown));
        assert_eq!(next_status(NotificationStatus::Absent, 0), None);
    }

    #[test]
    fn test_collapsed_not_destroyed() {
        assert_eq!(next_status(NotificationStatus::Shown, 0), Some(NotificationStatus::Collapsed));
        assert_eq!(next_status(NotificationStatus::Collapsed, 0), None);
        assert_eq!(next_status(NotificationStatus::Collapsed, 3), Some(NotificationStatus::Shown));
    }

    #[test]
    fn test_no_write_when_settled() {
        assert_eq!(next_status(NotificationStatus::Shown, 2), None);
    }
}
