//! Per-result state machine
//!
//! Transitions are pure functions of the current state and the inputs of
//! the pass. The session applies them and writes to the surface only when
//! the outcome differs from what the surface already shows.
//!
//! ```text
//!            NoMatch                  Matched
//!   Unseen ───────────▶ Clear ◀──────────────────▶ Hidden
//!                         ▲       NoMatch            │ reveal
//!                         │ unblock / NoMatch        ▼
//!                         └──────────────────── HiddenShown
//! ```
//!
//! Exempt results stay out of the cycle entirely.

use crate::hierarchy::is_ancestor_or_self;
use crate::types::{Control, Exemption, MatchResult, ResultState};

/// State a result takes in a reconciliation pass.
///
/// `host_revealed` is set when the host page itself is showing blocked
/// results in the result's container; a fresh match then goes straight to
/// [`ResultState::HiddenShown`].
pub fn next_state(
    current: ResultState,
    matched: &MatchResult,
    exemption: Option<Exemption>,
    host_revealed: bool,
) -> ResultState {
    if exemption.is_some() {
        return ResultState::Exempt;
    }

    match (matched, current) {
        (MatchResult::NoMatch, _) => ResultState::Clear,
        (MatchResult::Matched(_), ResultState::HiddenShown) => ResultState::HiddenShown,
        (MatchResult::Matched(_), ResultState::Hidden) => ResultState::Hidden,
        (MatchResult::Matched(_), _) if host_revealed => ResultState::HiddenShown,
        (MatchResult::Matched(_), _) => ResultState::Hidden,
    }
}

/// State after the user asked to show hidden results.
pub fn reveal(current: ResultState) -> ResultState {
    match current {
        ResultState::Hidden => ResultState::HiddenShown,
        other => other,
    }
}

/// State after the store acknowledged removal of `pattern`.
///
/// Only revealed results covered by the pattern are cleared here; hidden
/// ones are cleared by the next pass once the pattern no longer matches.
pub fn after_unblock(current: ResultState, host: &str, pattern: &str) -> ResultState {
    if current == ResultState::HiddenShown && is_ancestor_or_self(pattern, host) {
        ResultState::Clear
    } else {
        current
    }
}

/// Control a non-exempt result should carry.
///
/// Revealed results offer to remove the pattern that matched, which may be
/// an ancestor of the host. If that pattern is gone the result gets no new
/// control until the next pass settles its state.
pub fn desired_control(state: ResultState, host: &str, matched: &MatchResult) -> Option<Control> {
    match state {
        ResultState::Exempt => None,
        ResultState::HiddenShown => matched.pattern().map(|p| Control::Unblock(p.to_string())),
        _ => Some(Control::Block(host.to_string())),
    }
}
