//! The shared, explicitly passed selection handle.
//!
//! The root view creates one store and hands clones of it to every consumer.
//! Readers take an immutable snapshot per render pass; writers go through
//! [`TimeseriesSelectionStore::dispatch`], which runs the reducer and
//! publishes the result atomically.

use crate::data_types::{
    PanDirection, SelectionAction, TimeseriesSelection, ZoomDirection, DEFAULT_PAN_PCT,
};
use crate::view_controller::ViewController;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

type Listener = Arc<dyn Fn(&Arc<TimeseriesSelection>) + Send + Sync>;

struct Published {
    snapshot: Arc<TimeseriesSelection>,
    revision: u64,
}

struct StoreInner {
    published: RwLock<Published>,
    // Serializes dispatches so each action sees the state left by the previous one.
    dispatch_lock: Mutex<()>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

#[derive(Clone)]
pub struct TimeseriesSelectionStore {
    inner: Arc<StoreInner>,
}

impl Default for TimeseriesSelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimeseriesSelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let published = self.inner.published.read();
        f.debug_struct("TimeseriesSelectionStore")
            .field("revision", &published.revision)
            .field("selection", &published.snapshot)
            .finish()
    }
}

impl TimeseriesSelectionStore {
    pub fn new() -> Self {
        Self::with_state(TimeseriesSelection::Uninitialized)
    }

    pub fn with_state(state: TimeseriesSelection) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                published: RwLock::new(Published {
                    snapshot: Arc::new(state),
                    revision: 0,
                }),
                dispatch_lock: Mutex::new(()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<TimeseriesSelection> {
        self.inner.published.read().snapshot.clone()
    }

    /// Number of published changes so far.
    pub fn revision(&self) -> u64 {
        self.inner.published.read().revision
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakSelectionStore {
        WeakSelectionStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// True if both handles refer to the same store.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs `action` through the reducer. Returns whether the selection
    /// changed; on a no-op the published snapshot keeps its identity.
    pub fn dispatch(&self, action: SelectionAction) -> bool {
        let next = {
            let _serial = self.inner.dispatch_lock.lock();
            let current = self.snapshot();
            let Some(next) = ViewController::reduce(&current, &action) else {
                trace!(?action, "selection unchanged");
                return false;
            };
            let next = Arc::new(next);
            let mut published = self.inner.published.write();
            published.snapshot = next.clone();
            published.revision += 1;
            next
        };

        // Listeners run outside every lock so they may dispatch in turn.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next);
        }
        true
    }

    /// Registers a callback run after every published change. Dropping the
    /// returned subscription unregisters it.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<TimeseriesSelection>) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Initializes (or widens) the timeseries bounds to `[start, end]`
    /// shifted by `offset`. Skips the dispatch when the bounds already match.
    pub fn initialize_with_offset(&self, start: f64, end: f64, offset: f64) -> bool {
        let (start, end) = (start + offset, end + offset);
        if self.snapshot().timeseries_bounds() == Some((start, end)) {
            return false;
        }
        self.dispatch(SelectionAction::Initialize { start, end })
    }

    pub fn initialize(&self, start: f64, end: f64) -> bool {
        self.initialize_with_offset(start, end, 0.0)
    }

    pub fn zoom(&self, direction: ZoomDirection, factor: Option<f64>) -> bool {
        self.dispatch(SelectionAction::Zoom { direction, factor })
    }

    pub fn pan(&self, direction: PanDirection, percent: Option<f64>) -> bool {
        self.dispatch(SelectionAction::Pan {
            direction,
            percent: percent.unwrap_or(DEFAULT_PAN_PCT),
        })
    }

    pub fn pan_by_delta(&self, delta_t: f64) -> bool {
        self.dispatch(SelectionAction::PanByDelta { delta_t })
    }

    pub fn set_visible_range(&self, start: f64, end: f64) -> bool {
        self.dispatch(SelectionAction::SetVisibleRange { start, end })
    }

    pub fn set_time_focus(&self, time: f64, auto_scroll: bool) -> bool {
        self.dispatch(SelectionAction::SetCurrentTime {
            time,
            shift_key: false,
            auto_scroll,
        })
    }

    pub fn set_time_interval(&self, interval: (f64, f64), auto_scroll: bool) -> bool {
        self.dispatch(SelectionAction::SetCurrentTimeInterval {
            interval,
            auto_scroll,
        })
    }

    /// Focuses the time at `fraction` of the visible window. Fractions
    /// outside `[0, 1]` are ignored.
    pub fn set_time_focus_fraction(&self, fraction: f64, shift_key: bool) -> bool {
        if !(0.0..=1.0).contains(&fraction) {
            warn!(fraction, "attempt to set time focus to fraction outside range 0-1");
            return false;
        }
        let Some(time) = self.snapshot().time_for_fraction(fraction) else {
            warn!("attempt to set time focus on uninitialized timeseries selection");
            return false;
        };
        self.dispatch(SelectionAction::SetCurrentTime {
            time,
            shift_key,
            auto_scroll: false,
        })
    }
}

#[derive(Clone)]
pub struct WeakSelectionStore {
    inner: Weak<StoreInner>,
}

impl WeakSelectionStore {
    pub fn upgrade(&self) -> Option<TimeseriesSelectionStore> {
        self.inner
            .upgrade()
            .map(|inner| TimeseriesSelectionStore { inner })
    }
}

/// Keeps a store listener registered while alive.
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Subscription {
    /// False once the store itself has been dropped.
    pub fn is_active(&self) -> bool {
        self.store.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}
