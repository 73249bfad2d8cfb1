use crate::data_types::{
    selection_is_valid, PanDirection, SelectionAction, TimeseriesSelection, WindowedSelection,
    ZoomDirection, DEFAULT_ZOOM_FACTOR,
};
use tracing::{debug, warn};

/// ViewController holds the selection transitions (initialize, pan, zoom, focus)
/// as pure functions so they can be tested without any GPUI infrastructure.
///
/// Every transition returns `None` when the state is left unchanged, either because
/// the operation is a no-op or because the proposed state would be invalid.
pub struct ViewController;

impl ViewController {
    /// Applies an action and returns the next state, if it differs.
    pub fn reduce(
        state: &TimeseriesSelection,
        action: &SelectionAction,
    ) -> Option<TimeseriesSelection> {
        match *action {
            SelectionAction::Initialize { start, end } => Self::initialize(state, start, end),
            SelectionAction::Pan { direction, percent } => Self::pan(state, direction, percent),
            SelectionAction::PanByDelta { delta_t } => Self::pan_by_delta(state, delta_t),
            SelectionAction::Zoom { direction, factor } => Self::zoom(state, direction, factor),
            SelectionAction::SetVisibleRange { start, end } => {
                Self::set_visible_range(state, start, end)
            }
            SelectionAction::SetCurrentTime {
                time,
                shift_key,
                auto_scroll,
            } => Self::set_current_time(state, time, shift_key, auto_scroll),
            SelectionAction::SetCurrentTimeInterval {
                interval,
                auto_scroll,
            } => Self::set_current_time_interval(state, interval, auto_scroll),
        }
    }

    /// Like [`Self::reduce`] but always yields a state.
    pub fn apply(state: &TimeseriesSelection, action: &SelectionAction) -> TimeseriesSelection {
        Self::reduce(state, action).unwrap_or_else(|| state.clone())
    }

    /// Sets the timeseries bounds, or widens them on repeated calls.
    pub fn initialize(
        state: &TimeseriesSelection,
        start: f64,
        end: f64,
    ) -> Option<TimeseriesSelection> {
        let next = match state {
            TimeseriesSelection::Uninitialized => WindowedSelection::new(start, end),
            TimeseriesSelection::Windowed(w) => WindowedSelection {
                timeseries_start: w.timeseries_start.min(start),
                timeseries_end: w.timeseries_end.max(end),
                ..w.clone()
            },
        };
        if !next.is_valid() {
            warn!(start, end, "bad initialization value for timeseries selection");
            return None;
        }
        Self::changed(state, next)
    }

    /// Pans by a percentage of the current window length.
    pub fn pan(
        state: &TimeseriesSelection,
        direction: PanDirection,
        percent: f64,
    ) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "pan")?;
        let displacement = percent / 100.0 * w.window_length() * direction.sign();
        Self::pan_helper(state, w, displacement)
    }

    /// Pans by a signed number of seconds.
    pub fn pan_by_delta(state: &TimeseriesSelection, delta_t: f64) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "pan_by_delta")?;
        Self::pan_helper(state, w, delta_t)
    }

    fn pan_helper(
        state: &TimeseriesSelection,
        w: &WindowedSelection,
        displacement: f64,
    ) -> Option<TimeseriesSelection> {
        if !displacement.is_finite() || displacement == 0.0 {
            return None;
        }
        let window = w.window_length();
        let (new_start, new_end) = if displacement > 0.0 {
            let end = (w.visible_end + displacement).min(w.timeseries_end);
            ((end - window).max(w.timeseries_start), end)
        } else {
            let start = (w.visible_start + displacement).max(w.timeseries_start);
            (start, (start + window).min(w.timeseries_end))
        };
        if new_start == w.visible_start && new_end == w.visible_end {
            return None;
        }
        Self::changed(
            state,
            WindowedSelection {
                visible_start: new_start,
                visible_end: new_end,
                ..w.clone()
            },
        )
    }

    /// Zooms the visible window around the focus time, or the midpoint.
    pub fn zoom(
        state: &TimeseriesSelection,
        direction: ZoomDirection,
        factor: Option<f64>,
    ) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "zoom")?;
        let factor = factor.unwrap_or(DEFAULT_ZOOM_FACTOR);
        if !factor.is_finite() || factor < 1.0 {
            warn!(factor, "zoom factor must be a finite value >= 1");
            return None;
        }

        let total = w.total_length();
        let window = w.window_length();
        if direction == ZoomDirection::Out && window >= total {
            return None;
        }

        let multiplier = match direction {
            ZoomDirection::In => 1.0 / factor,
            ZoomDirection::Out => factor,
        };
        let new_window = (window * multiplier).min(total);

        if new_window >= total {
            return Self::changed(
                state,
                WindowedSelection {
                    visible_start: w.timeseries_start,
                    visible_end: w.timeseries_end,
                    ..w.clone()
                },
            );
        }

        // The focus keeps its fractional position, even outside the window.
        let (anchor, fraction) = match w.current_time {
            Some(t) if window > 0.0 => (t, (t - w.visible_start) / window),
            _ => (w.visible_start + window / 2.0, 0.5),
        };

        // Clamp the start, then the end, then re-derive the start so the
        // window keeps exactly `new_window` seconds.
        let new_start = (anchor - fraction * new_window).max(w.timeseries_start);
        let (new_start, new_end) = if new_start + new_window > w.timeseries_end {
            let end = w.timeseries_end;
            ((end - new_window).max(w.timeseries_start), end)
        } else {
            (new_start, new_start + new_window)
        };

        if new_start == w.visible_start && new_end == w.visible_end {
            return None;
        }
        Self::changed(
            state,
            WindowedSelection {
                visible_start: new_start,
                visible_end: new_end,
                ..w.clone()
            },
        )
    }

    /// Overwrites the visible window without clamping.
    pub fn set_visible_range(
        state: &TimeseriesSelection,
        start: f64,
        end: f64,
    ) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "set_visible_range")?;
        Self::changed(
            state,
            WindowedSelection {
                visible_start: start,
                visible_end: end,
                ..w.clone()
            },
        )
    }

    /// Sets the focus time, clearing any interval selection.
    pub fn set_current_time(
        state: &TimeseriesSelection,
        time: f64,
        shift_key: bool,
        auto_scroll: bool,
    ) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "set_current_time")?;
        if !time.is_finite() {
            warn!(time, "ignoring non-finite focus time");
            return None;
        }
        let mut next = WindowedSelection {
            current_time: Some(time),
            current_time_interval: None,
            ..w.clone()
        };
        if auto_scroll {
            Self::scroll_to_include(&mut next, time);
        }
        if shift_key {
            if let Some(previous) = w.current_time {
                next.current_time = Some(previous);
                next.current_time_interval = Some((previous.min(time), previous.max(time)));
            }
        }
        Self::validated(state, next)
    }

    /// Sets the selected interval.
    pub fn set_current_time_interval(
        state: &TimeseriesSelection,
        interval: (f64, f64),
        auto_scroll: bool,
    ) -> Option<TimeseriesSelection> {
        let w = Self::require_windowed(state, "set_current_time_interval")?;
        let (a, b) = interval;
        if !a.is_finite() || !b.is_finite() {
            warn!(a, b, "ignoring non-finite interval");
            return None;
        }
        let mut next = WindowedSelection {
            current_time_interval: Some((a.min(b), a.max(b))),
            ..w.clone()
        };
        if auto_scroll {
            Self::scroll_to_include(&mut next, (a + b) / 2.0);
        }
        Self::validated(state, next)
    }

    /// Recentres the window on `t` if it lies outside, then shifts it back
    /// inside the timeseries bounds while preserving its length.
    fn scroll_to_include(w: &mut WindowedSelection, t: f64) {
        if t >= w.visible_start && t <= w.visible_end {
            return;
        }
        let span = w.window_length();
        w.visible_start = t - span / 2.0;
        w.visible_end = t + span / 2.0;
        if w.visible_end > w.timeseries_end {
            w.visible_end = w.timeseries_end;
            w.visible_start = w.timeseries_end - span;
        }
        if w.visible_start < w.timeseries_start {
            w.visible_start = w.timeseries_start;
            w.visible_end = (w.timeseries_start + span).min(w.timeseries_end);
        }
    }

    fn require_windowed<'a>(
        state: &'a TimeseriesSelection,
        operation: &'static str,
    ) -> Option<&'a WindowedSelection> {
        let windowed = state.windowed();
        if windowed.is_none() {
            warn!(operation, "selection operation on uninitialized timeseries selection");
        }
        windowed
    }

    fn validated(
        state: &TimeseriesSelection,
        next: WindowedSelection,
    ) -> Option<TimeseriesSelection> {
        let next = TimeseriesSelection::Windowed(next);
        if !selection_is_valid(&next) {
            debug!(?next, "rejecting invalid selection state");
            return None;
        }
        (next != *state).then_some(next)
    }

    fn changed(
        state: &TimeseriesSelection,
        next: WindowedSelection,
    ) -> Option<TimeseriesSelection> {
        let next = TimeseriesSelection::Windowed(next);
        (next != *state).then_some(next)
    }

    /// Converts a scroll-wheel delta into a zoom factor >= 1 and a direction.
    /// A positive delta (scrolling down) zooms out.
    pub fn compute_zoom_factor(delta: f32, sensitivity: f32, max_factor: f64) -> (ZoomDirection, f64) {
        let sensitivity = if sensitivity > 0.0 { sensitivity } else { 1.0 };
        let factor = (1.0 + (delta.abs() / sensitivity) as f64).min(max_factor.max(1.0));
        let direction = if delta > 0.0 {
            ZoomDirection::Out
        } else {
            ZoomDirection::In
        };
        (direction, factor)
    }

    /// Maps a pixel position to a value in a given domain.
    pub fn map_pixels_to_value(pixels: f32, total_pixels: f32, min_val: f64, max_val: f64) -> f64 {
        if total_pixels <= 0.0 {
            return min_val;
        }
        let pct = (pixels / total_pixels).clamp(0.0, 1.0) as f64;
        min_val + (max_val - min_val) * pct
    }
}
