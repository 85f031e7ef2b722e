//! Render surface abstraction
//!
//! The surface is where results live between passes. The engine reads item
//! snapshots from it and writes back state markers, the processed marker,
//! controls and the notification status. Those markers are the only record
//! of a result's state, so a surface must report back exactly what was last
//! written to it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Control, ItemId, NotificationStatus, ResultItem, ResultState};

/// Page-side view of the result list.
pub trait RenderSurface {
    /// Current results, in page order.
    fn items(&self) -> Vec<ResultItem>;

    /// Record `state` on the result (style and class markers).
    fn set_state(&mut self, id: ItemId, state: ResultState);

    /// Mark the result as evaluated against the current blocklist.
    fn mark_processed(&mut self, id: ItemId);

    /// Attach `control` to the result, replacing any existing control.
    ///
    /// Fails with [`Error::MissingRenderTarget`] when the result has no
    /// place to put a control.
    fn put_control(&mut self, id: ItemId, control: &Control) -> Result<(), Error>;

    fn notification(&self) -> NotificationStatus;

    fn set_notification(&mut self, status: NotificationStatus);
}

/// A single write to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    SetState { id: ItemId, state: ResultState },
    MarkProcessed { id: ItemId },
    PutControl { id: ItemId, control: Control },
    SetNotification { status: NotificationStatus },
}

// =============================================================================
// Memory Surface
// =============================================================================

/// In-memory surface that records every write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemorySurface {
    items: Vec<ResultItem>,
    notification: NotificationStatus,
    /// Results without a control insertion point
    missing_slots: HashSet<ItemId>,
    #[serde(skip)]
    log: Vec<Mutation>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = ResultItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Start from a notification that already exists on the page.
    pub fn with_notification(mut self, status: NotificationStatus) -> Self {
        self.notification = status;
        self
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Drop all results, as when the page renders a new result set.
    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    pub fn item(&self, id: ItemId) -> Option<&ResultItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut ResultItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// State of a result, `Unseen` for unknown ids.
    pub fn state(&self, id: ItemId) -> ResultState {
        self.item(id).map(|item| item.state).unwrap_or_default()
    }

    pub fn control(&self, id: ItemId) -> Option<&Control> {
        self.item(id).and_then(|item| item.control.as_ref())
    }

    /// Remove the control insertion point of a result.
    pub fn remove_control_slot(&mut self, id: ItemId) {
        self.missing_slots.insert(id);
    }

    /// Writes since the last [`MemorySurface::take_log`].
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn hidden_count(&self) -> usize {
        self.items.iter().filter(|item| item.state == ResultState::Hidden).count()
    }
}

impl RenderSurface for MemorySurface {
    fn items(&self) -> Vec<ResultItem> {
        self.items.clone()
    }

    fn set_state(&mut self, id: ItemId, state: ResultState) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.state = state;
            self.log.push(Mutation::SetState { id, state });
        }
    }

    fn mark_processed(&mut self, id: ItemId) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.processed = true;
            self.log.push(Mutation::MarkProcessed { id });
        }
    }

    fn put_control(&mut self, id: ItemId, control: &Control) -> Result<(), Error> {
        if self.missing_slots.contains(&id) {
            return Err(Error::MissingRenderTarget(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(Error::MissingRenderTarget(id))?;
        item.control = Some(control.clone());
        self.log.push(Mutation::PutControl { id, control: control.clone() });
        Ok(())
    }

    fn notification(&self) -> NotificationStatus {
        self.notification
    }

    fn set_notification(&mut self, status: NotificationStatus) {
        self.notification = status;
        self.log.push(Mutation::SetNotification { status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_surface_records_writes() {
        let mut surface = MemorySurface::with_items([ResultItem::new(1, "http://a.com/")]);
        surface.set_state(ItemId(1), ResultState::Hidden);
        surface.mark_processed(ItemId(1));
        surface.set_notification(NotificationStatus::Shown);

        assert_eq!(surface.state(ItemId(1)), ResultState::Hidden);
        assert!(surface.item(ItemId(1)).unwrap().processed);
        assert_eq!(surface.log().len(), 3);
        assert_eq!(surface.take_log().len(), 3);
        assert!(surface.log().is_empty());
    }

    #[test]
    fn test_unknown_items_are_ignored() {
        let mut surface = MemorySurface::new();
        surface.set_state(ItemId(9), ResultState::Hidden);
        assert!(surface.log().is_empty());
        assert_eq!(surface.state(ItemId(9)), ResultState::Unseen);
    }

    #[test]
    fn test_missing_control_slot() {
        let mut surface = MemorySurface::with_items([ResultItem::new(1, "http://a.com/")]);
        surface.remove_control_slot(ItemId(1));
        let result = surface.put_control(ItemId(1), &Control::Block("a.com".into()));
        assert_eq!(result, Err(Error::MissingRenderTarget(ItemId(1))));
        assert_eq!(surface.control(ItemId(1)), None);
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation = Mutation::SetState { id: ItemId(3), state: ResultState::HiddenShown };
        assert_eq!(
            serde_json::to_value(mutation).unwrap(),
            serde_json::json!({"op": "setState", "id": 3, "state": "hiddenShown"})
        );
    }
}
