//! Personal Blocklist Core Library
//!
//! This crate provides the matching and reconciliation engine that overlays a
//! user-maintained domain blocklist onto rendered search results.
//!
//! # Architecture
//!
//! The engine never touches a page directly. The hosting integration layer
//! exposes the result list through [`RenderSurface`], owns a [`Session`] and
//! calls [`Session::reconcile`] on a fixed interval. Each pass resolves every
//! result's domain, matches it against the cached blocklist snapshot, moves
//! the result through its state machine and brings controls and the
//! "results hidden" notification in line. Passes are idempotent: a pass over
//! an unchanged page writes nothing.
//!
//! # Modules
//!
//! - `url`: Domain extraction from result links, with redirect unwrapping
//! - `hierarchy`: Ancestor-domain enumeration
//! - `matcher`: Blocklist snapshot and host matching
//! - `state`: Per-result state and control transitions
//! - `notification`: Aggregate "results hidden" notification
//! - `session`: Reconciliation passes and store response handling
//! - `protocol`: Messages exchanged with the blocklist store
//! - `surface`: Render surface abstraction and in-memory surface
//! - `page`: Hosting page context
//! - `types`: Shared type definitions

pub mod error;
pub mod hierarchy;
pub mod matcher;
pub mod notification;
pub mod page;
pub mod protocol;
pub mod session;
pub mod state;
pub mod surface;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use error::Error;
pub use hierarchy::{ancestors, is_ancestor_or_self};
pub use matcher::Blocklist;
pub use page::PageContext;
pub use protocol::{
    AddPatternResponse, BlocklistResponse, HostMessage, RemovePatternResponse, RequestContext,
    StoreRequest,
};
pub use session::{PassReport, Session, SessionConfig};
pub use surface::{MemorySurface, Mutation, RenderSurface};
pub use types::{Control, Exemption, ItemId, MatchResult, NotificationStatus, ResultItem, ResultState};
pub use crate::url::{resolve_domain, DomainResolver, ResolverConfig};
