use crate::data_types::{SelectionAction, TimeseriesSelection};
use crate::selection_store::TimeseriesSelectionStore;
use gpui::*;
use std::sync::Arc;

/// GPUI entity wrapping the shared store so views can observe it.
///
/// Views dispatch through [`SelectionModel::publish`], which notifies
/// observers only when the selection actually changed.
pub struct SelectionModel {
    pub store: TimeseriesSelectionStore,
    seen_revision: u64,
}

impl SelectionModel {
    pub fn new(store: TimeseriesSelectionStore) -> Self {
        let seen_revision = store.revision();
        Self {
            store,
            seen_revision,
        }
    }

    pub fn snapshot(&self) -> Arc<TimeseriesSelection> {
        self.store.snapshot()
    }

    pub fn publish(&mut self, action: SelectionAction, cx: &mut Context<Self>) -> bool {
        let changed = self.store.dispatch(action);
        self.sync(cx);
        changed
    }

    /// Notifies observers of changes made to the store outside this entity,
    /// e.g. by a playback task or a toolbar callback.
    pub fn sync(&mut self, cx: &mut Context<Self>) {
        let revision = self.store.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            cx.notify();
        }
    }
}
