//! Core type definitions for Personal Blocklist
//!
//! These types describe a search result as the engine sees it and are
//! shared by the state machine, the session and the render surfaces.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Item Handles
// =============================================================================

/// Stable handle of a result item on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// Outcome of matching a host against the blocklist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MatchResult {
    /// No ancestor of the host is blocklisted
    #[default]
    NoMatch,
    /// The blocklist entry that covers the host, which may be an ancestor
    Matched(String),
}

impl MatchResult {
    /// The matched pattern, if any.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Matched(pattern) => Some(pattern),
            Self::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

// =============================================================================
// Result State
// =============================================================================

/// Block-related state of a result, as recorded by the markers on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultState {
    /// Not evaluated yet
    #[default]
    Unseen,
    /// Not blockable by this engine (host-side control, vertical result,
    /// or no usable domain)
    Exempt,
    /// Matched and hidden
    Hidden,
    /// Matched, but shown with a flag on user request
    HiddenShown,
    /// Evaluated, no match, no block markers
    Clear,
}

impl ResultState {
    /// Whether the result currently carries block markers.
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Hidden | Self::HiddenShown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Exempt => "exempt",
            Self::Hidden => "hidden",
            Self::HiddenShown => "hiddenShown",
            Self::Clear => "clear",
        }
    }

    /// Parse from the marker name written by [`ResultState::as_str`].
    pub fn parse_marker(s: &str) -> Option<Self> {
        match s {
            "unseen" => Some(Self::Unseen),
            "exempt" => Some(Self::Exempt),
            "hidden" => Some(Self::Hidden),
            "hiddenShown" => Some(Self::HiddenShown),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a result is left alone by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exemption {
    /// The host page already offers its own block control
    HostMarker,
    /// Book search vertical result
    BookResult,
    /// The result link yields no usable domain
    UnresolvedDomain,
}

// =============================================================================
// Controls
// =============================================================================

/// Per-result control. The pattern is what the store receives on activation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "camelCase")]
pub enum Control {
    /// Add the result's host to the blocklist
    Block(String),
    /// Remove the pattern that caused the block
    Unblock(String),
}

impl Control {
    pub fn pattern(&self) -> &str {
        match self {
            Self::Block(pattern) | Self::Unblock(pattern) => pattern,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Block(_) => "block",
            Self::Unblock(_) => "unblock",
        }
    }
}

// =============================================================================
// Result Item
// =============================================================================

/// Snapshot of one result as read from the render surface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultItem {
    pub id: ItemId,
    /// Outbound link, possibly routed through a service redirect
    pub link: Option<String>,
    /// Host page already offers a block control for this result
    pub host_marker: bool,
    /// Book search vertical result
    pub is_book_result: bool,
    /// Host page asked to show blocked results in this result's container
    pub host_revealed: bool,
    pub state: ResultState,
    /// Evaluated against the current blocklist epoch
    pub processed: bool,
    pub control: Option<Control>,
}

impl ResultItem {
    pub fn new(id: u32, link: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            link: Some(link.into()),
            ..Self::default()
        }
    }

    /// Exemption carried by the item's own flags.
    pub fn exemption(&self) -> Option<Exemption> {
        if self.host_marker {
            Some(Exemption::HostMarker)
        } else if self.is_book_result {
            Some(Exemption::BookResult)
        } else {
            None
        }
    }
}

// =============================================================================
// Notification
// =============================================================================

/// Status of the "results hidden" notification element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationStatus {
    /// Never created on this page
    #[default]
    Absent,
    Shown,
    /// Created earlier, currently hidden
    Collapsed,
}

impl NotificationStatus {
    pub fn is_visible(self) -> bool {
        self == Self::Shown
    }
}
