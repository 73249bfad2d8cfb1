use crate::colors::{palette_color, parse_color};
use crate::layout::TimeseriesLayoutOpts;
use crate::rendering::{MarkerShape, PanelCanvas};
use crate::scales::value_scale;
use crate::scroll_view::{GridlineOpts, Panel, TimeScrollView};
use crate::selection_store::TimeseriesSelectionStore;
use crate::ticks::value_ticks;
use gpui::Hsla;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub data: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SeriesSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub dataset: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub encoding: Map<String, Value>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendLocation {
    #[default]
    Northwest,
    Northeast,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LegendOpts {
    pub location: LegendLocation,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesGraphData {
    pub datasets: Vec<Dataset>,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub time_offset: Option<f64>,
    #[serde(default)]
    pub legend_opts: Option<LegendOpts>,
    #[serde(default)]
    pub y_range: Option<Vec<f64>>,
    #[serde(default)]
    pub gridline_opts: Option<GridlineOpts>,
}

impl TimeseriesGraphData {
    pub(crate) fn check(&self) -> Result<(), String> {
        if let Some(range) = &self.y_range {
            match range.as_slice() {
                [lo, hi] if lo.is_finite() && hi.is_finite() && lo <= hi => {}
                _ => return Err(format!("yRange must be [min, max], got {range:?}")),
            }
        }
        for series in &self.series {
            if !self.datasets.iter().any(|d| d.name == series.dataset) {
                return Err(format!("series refers to unknown dataset `{}`", series.dataset));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SeriesStyle {
    Line { width: f32, dash: Option<Vec<f32>> },
    Marker { radius: f32, shape: MarkerShape },
}

/// A series with its columns pulled out of the dataset, times already
/// shifted by the graph's time offset.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSeries {
    pub title: Option<String>,
    pub color: Hsla,
    pub style: SeriesStyle,
    pub t: Vec<f64>,
    pub y: Vec<f64>,
}

impl ResolvedSeries {
    /// Index range of the samples within `[start, end]`, widened by one
    /// sample on each side so lines run to the panel edges.
    fn visible_range(&self, start: f64, end: f64) -> std::ops::Range<usize> {
        let lo = self.t.partition_point(|t| *t < start).saturating_sub(1);
        let hi = (self.t.partition_point(|t| *t <= end) + 1).min(self.t.len());
        lo..hi.max(lo)
    }
}

fn numeric_column(dataset: &Dataset, encoding: &Map<String, Value>, key: &str) -> Option<Vec<f64>> {
    let column = encoding.get(key)?.as_str()?;
    let values = dataset.data.get(column)?.as_array()?;
    values.iter().map(Value::as_f64).collect()
}

fn resolve_series(
    spec: &SeriesSpec,
    index: usize,
    datasets: &[Dataset],
    time_offset: f64,
) -> Option<ResolvedSeries> {
    let dataset = datasets.iter().find(|d| d.name == spec.dataset)?;
    let (Some(t), Some(y)) = (
        numeric_column(dataset, &spec.encoding, "t"),
        numeric_column(dataset, &spec.encoding, "y"),
    ) else {
        warn!(dataset = %spec.dataset, "series encoding does not resolve to numeric t/y columns");
        return None;
    };
    if t.len() != y.len() {
        warn!(dataset = %spec.dataset, t = t.len(), y = y.len(), "series columns differ in length");
        return None;
    }

    let attr_f32 = |name: &str| spec.attributes.get(name).and_then(Value::as_f64).map(|v| v as f32);
    let color = match spec.attributes.get("color").and_then(Value::as_str) {
        Some(text) => parse_color(text).unwrap_or_else(|err| {
            warn!(error = %err, "falling back to palette colour");
            palette_color(index)
        }),
        None => palette_color(index),
    };
    let style = match spec.kind.as_str() {
        "line" => SeriesStyle::Line {
            width: attr_f32("width").unwrap_or(1.0),
            dash: spec.attributes.get("dash").and_then(Value::as_array).map(|d| {
                d.iter().filter_map(Value::as_f64).map(|v| v as f32).collect()
            }),
        },
        "marker" => SeriesStyle::Marker {
            radius: attr_f32("radius").unwrap_or(2.0),
            shape: match spec.attributes.get("shape").and_then(Value::as_str) {
                Some("square") => MarkerShape::Square,
                _ => MarkerShape::Circle,
            },
        },
        other => {
            warn!(kind = other, "unsupported series type");
            return None;
        }
    };

    Some(ResolvedSeries {
        title: spec.title.clone(),
        color,
        style,
        t: t.into_iter().map(|v| v + time_offset).collect(),
        y,
    })
}

#[derive(Clone, Debug)]
pub struct GraphPanelProps {
    pub series: Arc<Vec<ResolvedSeries>>,
    pub y_range: (f64, f64),
    pub legend: Option<LegendLocation>,
}

fn paint_graph(canvas: &mut PanelCanvas, props: &GraphPanelProps) {
    let (start, end) = canvas.visible_window();
    let y_scale = value_scale(props.y_range.0, props.y_range.1, canvas.height());
    for series in props.series.iter() {
        let range = series.visible_range(start, end);
        let points: Vec<(f32, f32)> = series.t[range.clone()]
            .iter()
            .zip(&series.y[range])
            .map(|(t, y)| (canvas.time_to_x(*t), y_scale.map(*y)))
            .collect();
        match &series.style {
            SeriesStyle::Line { width, dash } => {
                canvas.polyline(points, series.color, *width, dash.clone());
            }
            SeriesStyle::Marker { radius, shape } => {
                for p in points {
                    canvas.marker(p, *radius, *shape, series.color);
                }
            }
        }
    }

    if let Some(location) = props.legend {
        paint_legend(canvas, &props.series, location);
    }
}

fn paint_legend(canvas: &mut PanelCanvas, series: &[ResolvedSeries], location: LegendLocation) {
    const ROW: f32 = 14.0;
    const WIDTH: f32 = 120.0;
    let titled: Vec<&ResolvedSeries> = series.iter().filter(|s| s.title.is_some()).collect();
    if titled.is_empty() {
        return;
    }
    let x = match location {
        LegendLocation::Northwest => 8.0,
        LegendLocation::Northeast => (canvas.width() - WIDTH - 8.0).max(0.0),
    };
    let height = ROW * titled.len() as f32 + 6.0;
    canvas.fill_rect(x, 4.0, WIDTH, height, gpui::white().alpha(0.85));
    canvas.stroke_rect(x, 4.0, WIDTH, height, gpui::black().alpha(0.3));
    for (i, s) in titled.iter().enumerate() {
        let y = 4.0 + 3.0 + ROW * (i as f32 + 0.5);
        match s.style {
            SeriesStyle::Line { width, .. } => {
                canvas.line((x + 6.0, y), (x + 22.0, y), s.color, width);
            }
            SeriesStyle::Marker { radius, shape } => {
                canvas.marker((x + 14.0, y), radius.max(2.0), shape, s.color);
            }
        }
        canvas.text(x + 28.0, y, s.title.clone().unwrap_or_default(), gpui::black(), 11.0);
    }
}

/// A single panel of line and marker series sharing one value axis.
#[derive(Clone, Debug)]
pub struct TimeseriesGraphView {
    series: Arc<Vec<ResolvedSeries>>,
    y_range: (f64, f64),
    time_offset: f64,
    legend: Option<LegendLocation>,
    gridline_opts: GridlineOpts,
}

impl TimeseriesGraphView {
    pub fn new(data: &TimeseriesGraphData) -> Self {
        let time_offset = data.time_offset.unwrap_or(0.0);
        let series: Vec<ResolvedSeries> = data
            .series
            .iter()
            .enumerate()
            .filter_map(|(i, spec)| resolve_series(spec, i, &data.datasets, time_offset))
            .collect();

        let y_range = match data.y_range.as_deref() {
            Some([lo, hi]) => (*lo, *hi),
            _ => min_max(series.iter().flat_map(|s| s.y.iter().copied())).unwrap_or((0.0, 1.0)),
        };
        Self {
            series: Arc::new(series),
            y_range,
            time_offset,
            legend: data.legend_opts.map(|o| o.location),
            gridline_opts: data.gridline_opts.unwrap_or_default(),
        }
    }

    pub fn series(&self) -> &[ResolvedSeries] {
        &self.series
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Time extent of the raw data, before the time offset is applied.
    pub fn data_bounds(&self) -> Option<(f64, f64)> {
        min_max(self.series.iter().flat_map(|s| s.t.iter().copied()))
            .map(|(lo, hi)| (lo - self.time_offset, hi - self.time_offset))
    }

    pub fn initialize(&self, store: &TimeseriesSelectionStore) -> bool {
        match self.data_bounds() {
            Some((start, end)) => store.initialize_with_offset(start, end, self.time_offset),
            None => false,
        }
    }

    pub fn scroll_view(&self, width: f32, height: f32) -> TimeScrollView<GraphPanelProps> {
        let panel = Panel::new(
            "graph",
            "",
            GraphPanelProps {
                series: self.series.clone(),
                y_range: self.y_range,
                legend: self.legend,
            },
            paint_graph,
        );
        TimeScrollView::new(Arc::new(vec![panel]), width, height)
            .with_layout_opts(TimeseriesLayoutOpts {
                use_y_axis: true,
                ..Default::default()
            })
            .with_y_tick_set(value_ticks(self.y_range.0, self.y_range.1, 5))
            .with_y_min_max_labels(true)
            .with_gridline_opts(self.gridline_opts)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(t: Vec<f64>) -> ResolvedSeries {
        ResolvedSeries {
            title: None,
            color: gpui::black(),
            style: SeriesStyle::Line { width: 1.0, dash: None },
            y: vec![0.0; t.len()],
            t,
        }
    }

    #[test]
    fn visible_range_keeps_one_neighbour() {
        let s = series(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(s.visible_range(1.5, 3.5), 1..5);
        assert_eq!(s.visible_range(-10.0, 100.0), 0..6);
        assert_eq!(s.visible_range(10.0, 20.0), 5..6);
    }
}
