//! Figure payloads and the registry that turns them into views.
//!
//! Every payload is a JSON object whose `type` field names its view. Loading
//! never panics: anything that does not match a known view shape becomes
//! [`LoadedView::Invalid`], rendered as a placeholder line.

pub mod annotated_video;
pub mod firing_rates;
pub mod spectrogram;
pub mod timeseries_graph;
pub mod video_element;

use crate::error::ValidationError;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

pub use annotated_video::{AnnotatedVideoData, AnnotatedVideoNode, AnnotatedVideoView};
pub use firing_rates::{FiringRatesPlotData, FiringRatesView, UnitId, UnitSpikeTrain};
pub use spectrogram::{SparseAudioSpectrogramData, SpectrogramView};
pub use timeseries_graph::{TimeseriesGraphData, TimeseriesGraphView};
pub use video_element::AnnotatedVideoElement;

pub const TIMESERIES_GRAPH_TYPE: &str = "figneuro.TimeseriesGraph";
pub const FIRING_RATES_PLOT_TYPE: &str = "saneslab.FiringRatesPlot";
pub const SPARSE_AUDIO_SPECTROGRAM_TYPE: &str = "saneslab.SparseAudioSpectrogram";
pub const ANNOTATED_VIDEO_TYPE: &str = "misc.AnnotatedVideo";
pub const EMPTY_TYPE: &str = "Empty";

/// Every payload shape this crate knows how to show.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ViewData {
    #[serde(rename = "figneuro.TimeseriesGraph")]
    TimeseriesGraph(TimeseriesGraphData),
    #[serde(rename = "saneslab.FiringRatesPlot")]
    FiringRatesPlot(FiringRatesPlotData),
    #[serde(rename = "saneslab.SparseAudioSpectrogram")]
    SparseAudioSpectrogram(SparseAudioSpectrogramData),
    #[serde(rename = "misc.AnnotatedVideo")]
    AnnotatedVideo(AnnotatedVideoData),
    Empty,
}

impl ViewData {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::TimeseriesGraph(_) => TIMESERIES_GRAPH_TYPE,
            Self::FiringRatesPlot(_) => FIRING_RATES_PLOT_TYPE,
            Self::SparseAudioSpectrogram(_) => SPARSE_AUDIO_SPECTROGRAM_TYPE,
            Self::AnnotatedVideo(_) => ANNOTATED_VIDEO_TYPE,
            Self::Empty => EMPTY_TYPE,
        }
    }

    /// Parses and validates a payload.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let type_tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ValidationError::MissingType)?;
        if ![
            TIMESERIES_GRAPH_TYPE,
            FIRING_RATES_PLOT_TYPE,
            SPARSE_AUDIO_SPECTROGRAM_TYPE,
            ANNOTATED_VIDEO_TYPE,
            EMPTY_TYPE,
        ]
        .contains(&type_tag)
        {
            return Err(ValidationError::UnknownType {
                type_tag: type_tag.to_string(),
            });
        }

        let data = ViewData::deserialize(value).map_err(|err| ValidationError::Malformed {
            type_tag: type_tag.to_string(),
            reason: err.to_string(),
        })?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let inconsistent = |reason: String| {
            Err(ValidationError::Inconsistent {
                type_tag: self.type_tag().to_string(),
                reason,
            })
        };
        match self {
            Self::TimeseriesGraph(data) => data.check().or_else(inconsistent),
            Self::FiringRatesPlot(data) => data.check().or_else(inconsistent),
            Self::SparseAudioSpectrogram(data) => data.check().or_else(inconsistent),
            Self::AnnotatedVideo(data) => data.check().or_else(inconsistent),
            Self::Empty => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadedView {
    View(ViewData),
    Invalid {
        type_tag: String,
        error: ValidationError,
    },
}

impl LoadedView {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::View(_))
    }

    /// Text shown in place of a payload that could not be loaded.
    pub fn placeholder_text(&self) -> Option<String> {
        match self {
            Self::View(_) => None,
            Self::Invalid { type_tag, .. } => Some(format!("Invalid view data: {type_tag}")),
        }
    }
}

/// Resolves a payload to a view, or to the invalid-data placeholder.
pub fn load_view(value: &Value) -> LoadedView {
    match ViewData::from_value(value) {
        Ok(data) => LoadedView::View(data),
        Err(error) => {
            let type_tag = value
                .get("type")
                .map(|t| match t {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "undefined".to_string());
            warn!(%type_tag, %error, "invalid view data");
            LoadedView::Invalid { type_tag, error }
        }
    }
}
