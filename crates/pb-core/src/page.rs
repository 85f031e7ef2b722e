//! Hosting page context
//!
//! Facts about the search page that the session needs but does not compute
//! on every pass: whether personalized filtering applies at all, and the
//! details attached to blocklist mutations.

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::protocol::RequestContext;

/// Marker preceding the search event id in the page's inline scripts.
const EVENT_ID_MARKER: &str = "kEI:\"";

/// Context of the page the results are rendered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageContext {
    /// Personalized filtering is enabled; passes are skipped otherwise
    pub personalized: bool,
    /// The page was served over https
    pub secure: bool,
    /// Search event id of the page, if known
    pub event_id: Option<String>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            personalized: true,
            secure: false,
            event_id: None,
        }
    }
}

impl PageContext {
    /// Derive the context from the page URL.
    ///
    /// Personalization is off when `pws=0` appears in the query or in the
    /// fragment (instant search keeps its parameters there).
    pub fn from_url(page_url: &str) -> Self {
        let Ok(url) = Url::parse(page_url) else {
            return Self::default();
        };

        let disabled = pws_disabled(url.query_pairs())
            || url
                .fragment()
                .is_some_and(|fragment| pws_disabled(form_urlencoded::parse(fragment.as_bytes())));

        Self {
            personalized: !disabled,
            secure: url.scheme() == "https",
            event_id: None,
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Details attached to add/remove requests.
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            event_id: self.event_id.clone(),
            secure: self.secure,
        }
    }
}

fn pws_disabled(mut pairs: form_urlencoded::Parse<'_>) -> bool {
    pairs.any(|(key, value)| key == "pws" && value == "0")
}

/// Find the search event id in an inline script of the page.
pub fn extract_event_id(script: &str) -> Option<&str> {
    let start = script.find(EVENT_ID_MARKER)? + EVENT_ID_MARKER.len();
    let len = script[start..].find('"')?;
    if len == 0 {
        return None;
    }
    Some(&script[start..start + len])
}
