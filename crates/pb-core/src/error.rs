//! Error type shared across the engine.
//!
//! Every variant is local and non-fatal: a pass logs it and moves on to the
//! next result.

use crate::types::ItemId;

/// Error type for domain resolution, store responses and surface writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Unresolvable domain in link {0:?}")]
    UnresolvableDomain(String),
    #[error("Store rejected pattern {pattern:?}")]
    StoreRejected { pattern: String },
    #[error("Missing render target for item {0}")]
    MissingRenderTarget(ItemId),
}
