use serde::{Deserialize, Serialize};

/// Pan amount used when no explicit percentage is given.
pub const DEFAULT_PAN_PCT: f64 = 10.0;
/// Zoom factor used when no explicit factor is given.
pub const DEFAULT_ZOOM_FACTOR: f64 = 1.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    Forward,
    Back,
}

impl PanDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Back => -1.0,
        }
    }
}

/// Selection state once timeseries bounds are known.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowedSelection {
    pub timeseries_start: f64,
    pub timeseries_end: f64,
    pub visible_start: f64,
    pub visible_end: f64,
    pub current_time: Option<f64>,
    pub current_time_interval: Option<(f64, f64)>,
}

impl WindowedSelection {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            timeseries_start: start,
            timeseries_end: end,
            visible_start: start,
            visible_end: end,
            current_time: None,
            current_time_interval: None,
        }
    }

    pub fn window_length(&self) -> f64 {
        self.visible_end - self.visible_start
    }

    pub fn total_length(&self) -> f64 {
        self.timeseries_end - self.timeseries_start
    }

    /// Checks the window invariants. The focus time is deliberately not
    /// required to lie inside the visible window.
    pub fn is_valid(&self) -> bool {
        let all_finite = [
            self.timeseries_start,
            self.timeseries_end,
            self.visible_start,
            self.visible_end,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return false;
        }
        if self.timeseries_start < 0.0 || self.timeseries_end < 0.0 {
            return false;
        }
        if self.timeseries_end < self.timeseries_start {
            return false;
        }
        if self.visible_end < self.visible_start {
            return false;
        }
        // Both windows are ordered, so comparing the matching edges is enough.
        self.visible_start >= self.timeseries_start && self.visible_end <= self.timeseries_end
    }
}

/// The shared timeseries selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TimeseriesSelection {
    #[default]
    Uninitialized,
    Windowed(WindowedSelection),
}

impl TimeseriesSelection {
    pub fn windowed(&self) -> Option<&WindowedSelection> {
        match self {
            Self::Uninitialized => None,
            Self::Windowed(w) => Some(w),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Windowed(_))
    }

    /// `(visible_start, visible_end)`, or `None` while uninitialized.
    pub fn visible_window(&self) -> Option<(f64, f64)> {
        self.windowed().map(|w| (w.visible_start, w.visible_end))
    }

    /// Visible window shifted by a timestamp offset, as consumed by views whose
    /// data is stored relative to a different origin.
    pub fn visible_window_with_offset(&self, offset: f64) -> Option<(f64, f64)> {
        self.visible_window()
            .map(|(start, end)| (start - offset, end - offset))
    }

    pub fn timeseries_bounds(&self) -> Option<(f64, f64)> {
        self.windowed()
            .map(|w| (w.timeseries_start, w.timeseries_end))
    }

    pub fn current_time(&self) -> Option<f64> {
        self.windowed().and_then(|w| w.current_time)
    }

    pub fn current_time_interval(&self) -> Option<(f64, f64)> {
        self.windowed().and_then(|w| w.current_time_interval)
    }

    /// Maps a fraction of the visible window to an absolute time.
    pub fn time_for_fraction(&self, fraction: f64) -> Option<f64> {
        self.windowed()
            .map(|w| w.visible_start + w.window_length() * fraction)
    }

    pub fn current_time_is_visible(&self) -> bool {
        match self.windowed() {
            Some(w) => w
                .current_time
                .is_some_and(|t| t >= w.visible_start && t <= w.visible_end),
            None => false,
        }
    }
}

/// Validity predicate over the whole selection; uninitialized is never valid.
pub fn selection_is_valid(selection: &TimeseriesSelection) -> bool {
    selection.windowed().is_some_and(WindowedSelection::is_valid)
}

/// Every state transition the selection supports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionAction {
    Initialize {
        start: f64,
        end: f64,
    },
    Pan {
        direction: PanDirection,
        percent: f64,
    },
    PanByDelta {
        delta_t: f64,
    },
    Zoom {
        direction: ZoomDirection,
        factor: Option<f64>,
    },
    SetVisibleRange {
        start: f64,
        end: f64,
    },
    SetCurrentTime {
        time: f64,
        #[serde(default)]
        shift_key: bool,
        #[serde(default)]
        auto_scroll: bool,
    },
    SetCurrentTimeInterval {
        interval: (f64, f64),
        #[serde(default)]
        auto_scroll: bool,
    },
}
