//! Real-time playback of the time focus.
//!
//! A [`PlaybackTask`] advances the shared selection's current time at a
//! chosen rate. The host drives it with [`PlaybackTask::tick`] from its frame
//! loop; cancellation goes through the [`PlaybackHandle`] returned on start,
//! so a torn-down view never writes to the store again.

use crate::data_types::SelectionAction;
use crate::selection_store::{TimeseriesSelectionStore, WeakSelectionStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Speeds offered by the playback control.
pub const PLAYBACK_RATES: [f64; 7] = [0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Stopped,
}

/// Stops the associated playback when dropped or cancelled.
#[derive(Debug)]
pub struct PlaybackHandle {
    cancelled: Arc<AtomicBool>,
}

impl PlaybackHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct PlaybackTask {
    store: WeakSelectionStore,
    start_time: f64,
    started_at: Instant,
    rate: f64,
    stop_at_end: bool,
    cancelled: Arc<AtomicBool>,
}

impl PlaybackTask {
    /// Starts playing from the current focus time (or the start of the
    /// timeseries when nothing is focused). Returns `None` while the
    /// selection is uninitialized.
    pub fn start(
        store: &TimeseriesSelectionStore,
        rate: f64,
        now: Instant,
    ) -> Option<(Self, PlaybackHandle)> {
        let selection = store.snapshot();
        let (ts_start, _) = selection.timeseries_bounds()?;
        let start_time = selection.current_time().unwrap_or(ts_start);
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let cancelled = Arc::new(AtomicBool::new(false));
        info!(start_time, rate, "playback started");
        Some((
            Self {
                store: store.downgrade(),
                start_time,
                started_at: now,
                rate,
                stop_at_end: true,
                cancelled: cancelled.clone(),
            },
            PlaybackHandle { cancelled },
        ))
    }

    /// Keeps advancing past the end of the timeseries instead of stopping.
    pub fn without_end_stop(mut self) -> Self {
        self.stop_at_end = false;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Focus time `now` corresponds to.
    pub fn time_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        self.start_time + elapsed * self.rate
    }

    /// Moves the focus to the time matching `now`, auto-scrolling the
    /// visible window to keep it in view.
    pub fn tick(&self, now: Instant) -> PlaybackStatus {
        if self.cancelled.load(Ordering::Acquire) {
            debug!("playback cancelled");
            return PlaybackStatus::Stopped;
        }
        let Some(store) = self.store.upgrade() else {
            debug!("selection store gone, stopping playback");
            return PlaybackStatus::Stopped;
        };

        let mut time = self.time_at(now);
        let mut status = PlaybackStatus::Playing;
        if self.stop_at_end {
            if let Some((_, ts_end)) = store.snapshot().timeseries_bounds() {
                if time >= ts_end {
                    time = ts_end;
                    status = PlaybackStatus::Stopped;
                    info!(time, "playback reached end of timeseries");
                }
            }
        }

        store.dispatch(SelectionAction::SetCurrentTime {
            time,
            shift_key: false,
            auto_scroll: true,
        });
        if status == PlaybackStatus::Stopped {
            self.cancelled.store(true, Ordering::Release);
        }
        status
    }
}
