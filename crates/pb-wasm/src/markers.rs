//! Class and style markers written to result elements
//!
//! The classes are the durable record of a result's state between passes:
//! the content script reports an element's `className` back on every call
//! and [`state_from_classes`] turns it into the state the engine last wrote.

use pb_core::{Control, NotificationStatus, ResultState};

/// Result evaluated against the current blocklist epoch.
pub const PROCESSED_CLASS: &str = "pb";
pub const HIDDEN_CLASS: &str = "blocked";
pub const HIDDEN_SHOWN_CLASS: &str = "blockedVisible";
pub const EXEMPT_CLASS: &str = "pbExempt";
pub const CLEAR_CLASS: &str = "pbClear";

/// Every class that encodes a state; a state write removes all of them first.
pub const STATE_CLASSES: [&str; 4] = [HIDDEN_CLASS, HIDDEN_SHOWN_CLASS, EXEMPT_CLASS, CLEAR_CLASS];

pub const HIDDEN_STYLE: &str = "display:none;";
pub const HIDDEN_SHOWN_STYLE: &str = "display:block;background-color:#FFD2D2";
pub const CLEAR_STYLE: &str = "background-color:inherit;";

pub const BLOCK_LINK_CLASS: &str = "blockLink";
pub const UNBLOCK_LINK_CLASS: &str = "unblockLink";

pub const NOTIFICATION_STYLE: &str = "font-style:italic;margin-top:1em;margin-bottom:1em;";
pub const NOTIFICATION_HIDDEN_STYLE: &str = "display:none;";

/// Class and inline style for a state. `None` leaves the attribute as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMarkers {
    pub class_name: Option<&'static str>,
    pub style: Option<&'static str>,
}

pub fn state_markers(state: ResultState) -> StateMarkers {
    match state {
        ResultState::Unseen => StateMarkers { class_name: None, style: None },
        ResultState::Exempt => StateMarkers { class_name: Some(EXEMPT_CLASS), style: None },
        ResultState::Hidden => StateMarkers {
            class_name: Some(HIDDEN_CLASS),
            style: Some(HIDDEN_STYLE),
        },
        ResultState::HiddenShown => StateMarkers {
            class_name: Some(HIDDEN_SHOWN_CLASS),
            style: Some(HIDDEN_SHOWN_STYLE),
        },
        ResultState::Clear => StateMarkers {
            class_name: Some(CLEAR_CLASS),
            style: Some(CLEAR_STYLE),
        },
    }
}

/// Recover the state recorded in an element's class list.
pub fn state_from_classes(class_name: &str) -> ResultState {
    let has = |class: &str| class_name.split_whitespace().any(|c| c == class);

    if has(HIDDEN_SHOWN_CLASS) {
        ResultState::HiddenShown
    } else if has(HIDDEN_CLASS) {
        ResultState::Hidden
    } else if has(EXEMPT_CLASS) {
        ResultState::Exempt
    } else if has(CLEAR_CLASS) {
        ResultState::Clear
    } else {
        ResultState::Unseen
    }
}

pub fn is_processed(class_name: &str) -> bool {
    class_name.split_whitespace().any(|c| c == PROCESSED_CLASS)
}

/// Class of the element wrapping a control link.
pub fn control_class(control: &Control) -> &'static str {
    match control {
        Control::Block(_) => BLOCK_LINK_CLASS,
        Control::Unblock(_) => UNBLOCK_LINK_CLASS,
    }
}

pub fn notification_style(status: NotificationStatus) -> Option<&'static str> {
    match status {
        NotificationStatus::Absent => None,
        NotificationStatus::Shown => Some(NOTIFICATION_STYLE),
        NotificationStatus::Collapsed => Some(NOTIFICATION_HIDDEN_STYLE),
    }
}

pub fn parse_notification(status: &str) -> NotificationStatus {
    match status {
        "shown" => NotificationStatus::Shown,
        "collapsed" => NotificationStatus::Collapsed,
        _ => NotificationStatus::Absent,
    }
}

pub fn notification_name(status: NotificationStatus) -> &'static str {
    match status {
        NotificationStatus::Absent => "absent",
        NotificationStatus::Shown => "shown",
        NotificationStatus::Collapsed => "collapsed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_round_trip_through_classes() {
        for state in [
            ResultState::Exempt,
            ResultState::Hidden,
            ResultState::HiddenShown,
            ResultState::Clear,
        ] {
            let class = state_markers(state).class_name.unwrap();
            assert_eq!(state_from_classes(&format!("g {class} {PROCESSED_CLASS}")), state);
        }
        assert_eq!(state_from_classes("g"), ResultState::Unseen);
    }

    #[test]
    fn test_class_matching_is_exact() {
        assert_eq!(state_from_classes("g blockedVisibleX"), ResultState::Unseen);
        assert!(!is_processed("g pbExempt"));
        assert!(is_processed("g pb"));
    }

    #[test]
    fn test_control_and_notification_markers() {
        assert_eq!(control_class(&Control::Block("a.com".into())), BLOCK_LINK_CLASS);
        assert_eq!(control_class(&Control::Unblock("a.com".into())), UNBLOCK_LINK_CLASS);
        for status in [NotificationStatus::Absent, NotificationStatus::Shown, NotificationStatus::Collapsed] {
            assert_eq!(parse_notification(notification_name(status)), status);
        }
        assert_eq!(notification_style(NotificationStatus::Collapsed), Some("display:none;"));
    }
}
