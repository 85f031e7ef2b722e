//! Reconciliation passes and store response handling
//!
//! A [`Session`] holds everything the engine keeps for one page: the cached
//! blocklist snapshot, the "needs refresh" flag, the page context and the
//! resolver. The integration layer owns it and calls into it from a single
//! logical thread:
//!
//! - [`Session::reconcile`] on every timer tick;
//! - the `*_request` methods when the user activates a control, sending the
//!   returned message to the store;
//! - the `on_*` handlers when a store response or a host push arrives,
//!   sending any returned follow-up request.
//!
//! All mutating entry points take `&mut self`, so a pass can never overlap
//! another pass or a response handler.

use std::time::Duration;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::matcher::Blocklist;
use crate::notification;
use crate::page::PageContext;
use crate::protocol::{
    AddPatternResponse, BlocklistResponse, HostMessage, RemovePatternResponse, StoreRequest,
};
use crate::state::{self, after_unblock, desired_control, next_state};
use crate::surface::RenderSurface;
use crate::types::{Exemption, MatchResult, NotificationStatus, ResultItem, ResultState};
use crate::url::{DomainResolver, ResolverConfig};

/// Interval between reconciliation passes.
pub const DEFAULT_PASS_INTERVAL_MS: u32 = 500;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub resolver: ResolverConfig,
    /// Timer interval the host should use for [`Session::reconcile`]
    pub pass_interval_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            pass_interval_ms: DEFAULT_PASS_INTERVAL_MS,
        }
    }
}

// =============================================================================
// Pass Report
// =============================================================================

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    /// Pass skipped because personalized filtering is disabled
    pub skipped: bool,
    pub items: usize,
    pub state_changes: usize,
    pub controls_written: usize,
    pub processed_marked: usize,
    /// Results without a usable domain
    pub unresolved: usize,
    /// Controls that could not be placed
    pub missing_targets: usize,
    /// Results in the `Hidden` state after the pass
    pub hidden: usize,
    /// Notification status written by the pass, if any
    pub notification: Option<NotificationStatus>,
}

impl PassReport {
    /// Number of writes the pass made to the surface.
    pub fn mutations(&self) -> usize {
        self.state_changes
            + self.controls_written
            + self.processed_marked
            + usize::from(self.notification.is_some())
    }
}

// =============================================================================
// Session
// =============================================================================

/// Per-result inputs computed once per pass.
struct Evaluation {
    host: Option<String>,
    matched: MatchResult,
    exemption: Option<Exemption>,
}

/// Blocklist overlay state for one page.
#[derive(Debug, Clone)]
pub struct Session {
    resolver: DomainResolver,
    blocklist: Blocklist,
    needs_refresh: bool,
    page: PageContext,
    pass_interval: Duration,
}

impl Session {
    pub fn new(config: SessionConfig, page: PageContext) -> Self {
        Self {
            resolver: DomainResolver::new(config.resolver),
            blocklist: Blocklist::new(),
            needs_refresh: false,
            page,
            pass_interval: Duration::from_millis(u64::from(config.pass_interval_ms)),
        }
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn pass_interval(&self) -> Duration {
        self.pass_interval
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Force the next pass to re-evaluate every result.
    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
    }

    /// Replace the cached blocklist without going through the store.
    pub fn set_blocklist(&mut self, blocklist: Blocklist) {
        self.blocklist = blocklist;
        self.needs_refresh = true;
    }

    // -------------------------------------------------------------------------
    // Store requests
    // -------------------------------------------------------------------------

    /// Request sent when a "block" control is activated.
    pub fn block_request(&self, pattern: &str) -> StoreRequest {
        StoreRequest::AddPattern {
            pattern: pattern.to_string(),
            context: self.page.request_context(),
        }
    }

    /// Request sent when an "unblock" control is activated.
    pub fn unblock_request(&self, pattern: &str) -> StoreRequest {
        StoreRequest::RemovePattern {
            pattern: pattern.to_string(),
            context: self.page.request_context(),
        }
    }

    /// Request for the whole blocklist, sent at startup.
    pub fn blocklist_request(&self) -> StoreRequest {
        StoreRequest::GetBlocklist
    }

    // -------------------------------------------------------------------------
    // Store responses
    // -------------------------------------------------------------------------

    /// Apply the store's answer to an add request for `pattern`.
    ///
    /// On success the pattern is cached right away so the next pass hides
    /// the affected results even before the returned `GetBlocklist` round
    /// trip completes.
    pub fn on_pattern_added(
        &mut self,
        pattern: &str,
        response: AddPatternResponse,
    ) -> Result<StoreRequest, Error> {
        if !response.success {
            return Err(Error::StoreRejected { pattern: pattern.to_string() });
        }

        self.blocklist.insert(pattern);
        self.needs_refresh = true;
        debug!("Blocked pattern {pattern:?}");
        Ok(StoreRequest::GetBlocklist)
    }

    /// Apply the store's answer to a remove request.
    ///
    /// Revealed results covered by the removed pattern are cleared at once,
    /// which also consumes their reveal: if the pattern is added again they
    /// are hidden, not revealed.
    pub fn on_pattern_removed<S: RenderSurface + ?Sized>(
        &mut self,
        response: RemovePatternResponse,
        surface: &mut S,
    ) -> Result<StoreRequest, Error> {
        if !response.success {
            return Err(Error::StoreRejected { pattern: response.pattern });
        }

        let pattern = Blocklist::normalize_pattern(&response.pattern).unwrap_or_default();
        for item in surface.items() {
            if item.state != ResultState::HiddenShown {
                continue;
            }
            let Some(host) = self.resolve_item(&item) else {
                continue;
            };
            let next = after_unblock(item.state, &host, &pattern);
            if next != item.state {
                trace!("Item {} {} -> {} (unblocked {pattern:?})", item.id, item.state, next);
                surface.set_state(item.id, next);
            }
        }

        self.blocklist.remove(&pattern);
        self.needs_refresh = true;
        debug!("Unblocked pattern {pattern:?}");
        Ok(StoreRequest::GetBlocklist)
    }

    /// Replace the cached snapshot with the store's list.
    ///
    /// A changed snapshot forces the next pass to re-evaluate every result,
    /// since an earlier pass may already have consumed the refresh that
    /// requested it.
    pub fn on_blocklist(&mut self, response: BlocklistResponse) {
        let Some(patterns) = response.blocklist else {
            return;
        };
        let blocklist = Blocklist::from_patterns(patterns);
        if blocklist != self.blocklist {
            self.blocklist = blocklist;
            self.needs_refresh = true;
        }
        debug!("Blocklist refreshed: {} patterns", self.blocklist.len());
    }

    /// Handle a message pushed by the extension.
    pub fn on_host_message(&mut self, message: HostMessage) -> Option<StoreRequest> {
        match message {
            HostMessage::Refresh => {
                self.needs_refresh = true;
                Some(StoreRequest::GetBlocklist)
            }
        }
    }

    // -------------------------------------------------------------------------
    // User actions
    // -------------------------------------------------------------------------

    /// Show every hidden result, flagged as blocked. Returns how many results
    /// were revealed. Controls and the notification follow on the next pass.
    pub fn reveal_hidden<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let mut revealed = 0;
        for item in surface.items() {
            let next = state::reveal(item.state);
            if next != item.state {
                surface.set_state(item.id, next);
                revealed += 1;
            }
        }

        self.needs_refresh = true;
        debug!("Revealed {revealed} hidden results");
        revealed
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Run one reconciliation pass over every result on the surface.
    ///
    /// Writes happen only where the surface disagrees with the blocklist, so
    /// running the pass again without intervening changes writes nothing.
    pub fn reconcile<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> PassReport {
        let mut report = PassReport::default();

        if !self.page.personalized {
            report.skipped = true;
            return report;
        }

        let mut items = surface.items();
        let evaluations: Vec<Evaluation> = items.iter().map(|item| self.evaluate(item)).collect();
        report.items = items.len();
        report.unresolved = evaluations.iter().filter(|e| e.host.is_none()).count();

        // Hide, reveal and clear
        if !self.blocklist.is_empty() || self.needs_refresh {
            for (item, eval) in items.iter_mut().zip(&evaluations) {
                let next = next_state(item.state, &eval.matched, eval.exemption, item.host_revealed);
                if next != item.state {
                    trace!("Item {} {} -> {}", item.id, item.state, next);
                    surface.set_state(item.id, next);
                    item.state = next;
                    report.state_changes += 1;
                }
            }
        }

        // Controls, until every result has been processed
        if self.needs_refresh || report.state_changes > 0 || items.iter().any(|item| !item.processed) {
            for (item, eval) in items.iter_mut().zip(&evaluations) {
                self.reconcile_control(surface, item, eval, &mut report);
                if !item.processed {
                    surface.mark_processed(item.id);
                    item.processed = true;
                    report.processed_marked += 1;
                }
            }
        }

        report.hidden = items.iter().filter(|item| item.state == ResultState::Hidden).count();
        if let Some(status) = notification::next_status(surface.notification(), report.hidden) {
            surface.set_notification(status);
            report.notification = Some(status);
        }

        self.needs_refresh = false;

        if report.mutations() > 0 {
            debug!(
                "Pass over {} results: {} state changes, {} controls, {} hidden",
                report.items, report.state_changes, report.controls_written, report.hidden
            );
        }
        report
    }

    fn reconcile_control<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        item: &mut ResultItem,
        eval: &Evaluation,
        report: &mut PassReport,
    ) {
        if eval.exemption.is_some() {
            return;
        }
        let Some(host) = eval.host.as_deref() else {
            return;
        };
        let Some(control) = desired_control(item.state, host, &eval.matched) else {
            return;
        };
        if item.control.as_ref() == Some(&control) {
            return;
        }

        match surface.put_control(item.id, &control) {
            Ok(()) => {
                trace!("Item {} gets {} control for {:?}", item.id, control.kind(), control.pattern());
                item.control = Some(control);
                report.controls_written += 1;
            }
            Err(e) => {
                debug!("{e}");
                report.missing_targets += 1;
            }
        }
    }

    fn evaluate(&self, item: &ResultItem) -> Evaluation {
        let host = self.resolve_item(item);
        let exemption = item
            .exemption()
            .or_else(|| host.is_none().then_some(Exemption::UnresolvedDomain));
        let matched = host
            .as_deref()
            .map_or(MatchResult::NoMatch, |host| self.blocklist.match_host(host));

        Evaluation { host, matched, exemption }
    }

    fn resolve_item(&self, item: &ResultItem) -> Option<String> {
        let link = item.link.as_deref()?;
        match self.resolver.resolve(link) {
            Ok(host) => Some(host),
            Err(e) => {
                trace!("Item {}: {e}", item.id);
                None
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default(), PageContext::default())
    }
}
