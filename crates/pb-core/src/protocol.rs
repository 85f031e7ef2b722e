//! Messages exchanged with the blocklist store
//!
//! The store runs outside the page (the extension's background context).
//! Requests are tagged by `type`; each has exactly one response, delivered
//! asynchronously and fed back into the [`Session`](crate::Session).

use serde::{Deserialize, Serialize};

/// Page details attached to blocklist mutations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestContext {
    /// Search event id of the page the action was taken on
    pub event_id: Option<String>,
    /// The page was served over https
    pub secure: bool,
}

/// Request sent to the blocklist store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreRequest {
    /// Add a pattern; answered by [`AddPatternResponse`]
    AddPattern { pattern: String, context: RequestContext },
    /// Remove a pattern; answered by [`RemovePatternResponse`]
    RemovePattern { pattern: String, context: RequestContext },
    /// Fetch the whole list; answered by [`BlocklistResponse`]
    GetBlocklist,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddPatternResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovePatternResponse {
    pub success: bool,
    /// The pattern that was removed
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocklistResponse {
    /// Absent when the store could not read the list
    pub blocklist: Option<Vec<String>>,
}

/// Unsolicited message pushed to the page by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// The blocklist changed elsewhere (e.g. the manager page)
    Refresh,
}
