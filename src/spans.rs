use crate::data_types::{Annotation, HighlightIntervalSet};
use crate::scales::AffineScale;
use gpui::Hsla;

/// A highlight set after filtering to the visible window, in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelHighlightSpans {
    pub pixel_starts: Vec<f32>,
    pub pixel_widths: Vec<f32>,
    pub color: Option<Hsla>,
}

impl PixelHighlightSpans {
    pub fn spans(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.pixel_starts
            .iter()
            .copied()
            .zip(self.pixel_widths.iter().copied())
    }
}

/// Drops intervals entirely outside `window`, clamps partial overlaps to it
/// and projects what is left. `None` (uninitialized selection) yields nothing.
pub fn filter_and_project_highlight_spans(
    sets: &[HighlightIntervalSet],
    window: Option<(f64, f64)>,
    scale: &AffineScale,
) -> Vec<PixelHighlightSpans> {
    let Some((visible_start, visible_end)) = window else {
        return Vec::new();
    };
    sets.iter()
        .map(|set| {
            let (pixel_starts, pixel_widths) = set
                .intervals()
                .filter(|(s, e)| *e >= visible_start && *s <= visible_end)
                .map(|(s, e)| {
                    let x0 = scale.map(s.max(visible_start));
                    let x1 = scale.map(e.min(visible_end));
                    (x0, (x1 - x0).max(0.0))
                })
                .unzip();
            PixelHighlightSpans {
                pixel_starts,
                pixel_widths,
                color: set.color,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum PixelAnnotation {
    Timepoint {
        id: String,
        label: String,
        pixel_x: f32,
    },
    Interval {
        id: String,
        label: String,
        pixel_start: f32,
        pixel_width: f32,
    },
}

impl PixelAnnotation {
    pub fn label(&self) -> &str {
        match self {
            Self::Timepoint { label, .. } | Self::Interval { label, .. } => label,
        }
    }
}

/// Projects the annotations overlapping `window`; intervals are clamped to
/// the window edges.
pub fn project_annotations(
    annotations: &[Annotation],
    window: Option<(f64, f64)>,
    scale: &AffineScale,
) -> Vec<PixelAnnotation> {
    let Some((visible_start, visible_end)) = window else {
        return Vec::new();
    };
    annotations
        .iter()
        .filter(|a| a.overlaps(visible_start, visible_end))
        .map(|a| match a {
            Annotation::Timepoint { id, label, time_sec } => PixelAnnotation::Timepoint {
                id: id.clone(),
                label: label.clone(),
                pixel_x: scale.map(*time_sec),
            },
            Annotation::TimeInterval {
                id,
                label,
                time_interval_sec: (t1, t2),
            } => {
                let x0 = scale.map(t1.max(visible_start));
                let x1 = scale.map(t2.min(visible_end));
                PixelAnnotation::Interval {
                    id: id.clone(),
                    label: label.clone(),
                    pixel_start: x0,
                    pixel_width: (x1 - x0).max(0.0),
                }
            }
        })
        .collect()
}
