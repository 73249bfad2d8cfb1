use gpui::Hsla;
use serde::{Deserialize, Serialize};

/// A time-stamped decoration supplied by an annotation provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Annotation {
    #[serde(rename = "timepoint")]
    Timepoint {
        #[serde(rename = "annotationId")]
        id: String,
        label: String,
        #[serde(rename = "timeSec")]
        time_sec: f64,
    },
    #[serde(rename = "time-interval")]
    TimeInterval {
        #[serde(rename = "annotationId")]
        id: String,
        label: String,
        #[serde(rename = "timeIntervalSec")]
        time_interval_sec: (f64, f64),
    },
}

impl Annotation {
    pub fn id(&self) -> &str {
        match self {
            Self::Timepoint { id, .. } | Self::TimeInterval { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Timepoint { label, .. } | Self::TimeInterval { label, .. } => label,
        }
    }

    /// True if any part of the annotation lies inside `[start, end]`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        match self {
            Self::Timepoint { time_sec, .. } => start <= *time_sec && *time_sec <= end,
            Self::TimeInterval {
                time_interval_sec: (t1, t2),
                ..
            } => start <= *t2 && *t1 <= end,
        }
    }
}

/// A set of highlighted intervals sharing one colour.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightIntervalSet {
    pub interval_starts: Vec<f64>,
    pub interval_ends: Vec<f64>,
    pub color: Option<Hsla>,
}

impl HighlightIntervalSet {
    pub fn new(intervals: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (interval_starts, interval_ends) = intervals.into_iter().unzip();
        Self {
            interval_starts,
            interval_ends,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Hsla) -> Self {
        self.color = Some(color);
        self
    }

    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.interval_starts
            .iter()
            .copied()
            .zip(self.interval_ends.iter().copied())
    }
}
