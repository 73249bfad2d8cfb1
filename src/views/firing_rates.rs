use crate::colors::heat_color;
use crate::layout::TimeseriesLayoutOpts;
use crate::rendering::PanelCanvas;
use crate::scroll_view::{Panel, TimeScrollView};
use crate::selection_store::TimeseriesSelectionStore;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub const BIN_SIZE_SEC: f64 = 0.1;
pub const SMOOTHING_RADIUS: usize = 1;
/// Rate (Hz) shown at full heat.
pub const SATURATION_RATE_HZ: f64 = 30.0;
/// Upper bound on bins across all units.
pub const MAX_RATE_CELLS: usize = 20_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum UnitId {
    Number(i64),
    Name(String),
}

impl UnitId {
    /// Numeric sort key: the id itself, or the trailing digits of a name.
    pub fn sort_key(&self) -> i64 {
        match self {
            Self::Number(n) => *n,
            Self::Name(name) => {
                let digits: String = name
                    .chars()
                    .rev()
                    .take_while(char::is_ascii_digit)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                digits.parse().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSpikeTrain {
    pub unit_id: UnitId,
    pub spike_times_sec: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiringRatesPlotData {
    pub start_time_sec: f64,
    pub end_time_sec: f64,
    pub plots: Vec<UnitSpikeTrain>,
}

impl FiringRatesPlotData {
    pub(crate) fn check(&self) -> Result<(), String> {
        let (start, end) = (self.start_time_sec, self.end_time_sec);
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(format!("invalid time range [{start}, {end}]"));
        }
        let cells = self.bin_count() * self.plots.len().max(1) as f64;
        if cells > MAX_RATE_CELLS as f64 {
            return Err(format!(
                "{} units over [{start}, {end}] need {cells} bins, limit is {MAX_RATE_CELLS}",
                self.plots.len()
            ));
        }
        Ok(())
    }

    fn bin_count(&self) -> f64 {
        let duration = (self.end_time_sec - self.start_time_sec).max(0.0);
        (duration.ceil() / BIN_SIZE_SEC).round()
    }

    pub fn num_bins(&self) -> usize {
        self.bin_count() as usize
    }
}

/// Spike counts per bin, mean-smoothed over `radius` neighbours each side.
pub fn smoothed_bin_counts(spike_times: &[f64], start: f64, num_bins: usize, radius: usize) -> Vec<f64> {
    let mut counts = vec![0.0; num_bins];
    for t in spike_times {
        let bin = ((t - start) / BIN_SIZE_SEC).floor();
        if bin >= 0.0 && (bin as usize) < num_bins {
            counts[bin as usize] += 1.0;
        }
    }
    (0..num_bins)
        .map(|i| {
            let window = &counts[i.saturating_sub(radius)..(i + radius + 1).min(num_bins)];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

pub fn rate_heat(rate_hz: f64) -> gpui::Hsla {
    heat_color((rate_hz / SATURATION_RATE_HZ).min(1.0) as f32)
}

#[derive(Clone, Debug)]
pub struct UnitRateProps {
    pub start_time: f64,
    /// Smoothed spike counts per bin.
    pub counts: Arc<Vec<f64>>,
}

fn paint_rates(canvas: &mut PanelCanvas, props: &UnitRateProps) {
    let (vs, ve) = canvas.visible_window();
    let n = props.counts.len();
    let first = (((vs - props.start_time) / BIN_SIZE_SEC).floor() - 1.0).max(0.0) as usize;
    let last = ((((ve - props.start_time) / BIN_SIZE_SEC).ceil() + 1.0).max(0.0) as usize).min(n);
    let height = canvas.height().max(1.0);
    for i in first..last {
        let t1 = props.start_time + i as f64 * BIN_SIZE_SEC;
        let x1 = canvas.time_to_x(t1);
        let x2 = canvas.time_to_x(t1 + BIN_SIZE_SEC);
        canvas.fill_rect(x1, 0.0, (x2 - x1).max(0.0), height, rate_heat(props.counts[i] / BIN_SIZE_SEC));
    }
}

/// One heat-strip row per unit.
#[derive(Clone, Debug)]
pub struct FiringRatesView {
    start_time: f64,
    end_time: f64,
    units: Vec<(UnitId, Arc<Vec<f64>>)>,
}

impl FiringRatesView {
    pub fn new(data: &FiringRatesPlotData) -> Self {
        let num_bins = data.num_bins();
        let mut units: Vec<(UnitId, Arc<Vec<f64>>)> = data
            .plots
            .par_iter()
            .map(|plot| {
                let counts = smoothed_bin_counts(
                    &plot.spike_times_sec,
                    data.start_time_sec,
                    num_bins,
                    SMOOTHING_RADIUS,
                );
                (plot.unit_id.clone(), Arc::new(counts))
            })
            .collect();
        units.sort_by_key(|(id, _)| id.sort_key());
        Self {
            start_time: data.start_time_sec,
            end_time: data.end_time_sec,
            units,
        }
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = &UnitId> {
        self.units.iter().map(|(id, _)| id)
    }

    pub fn counts(&self, unit: &UnitId) -> Option<&[f64]> {
        self.units
            .iter()
            .find(|(id, _)| id == unit)
            .map(|(_, counts)| counts.as_slice())
    }

    pub fn initialize(&self, store: &TimeseriesSelectionStore) -> bool {
        store.initialize(self.start_time, self.end_time)
    }

    pub fn scroll_view(
        &self,
        width: f32,
        height: f32,
        selected_units: &HashSet<UnitId>,
        layout_opts: TimeseriesLayoutOpts,
    ) -> TimeScrollView<UnitRateProps> {
        let panels: Vec<Panel<UnitRateProps>> = self
            .units
            .iter()
            .map(|(id, counts)| {
                Panel::new(
                    id.to_string(),
                    id.to_string(),
                    UnitRateProps {
                        start_time: self.start_time,
                        counts: counts.clone(),
                    },
                    paint_rates,
                )
            })
            .collect();
        let selected: HashSet<String> = selected_units.iter().map(UnitId::to_string).collect();
        TimeScrollView::new(Arc::new(panels), width, height)
            .with_layout_opts(layout_opts)
            .with_selected_panel_keys(Arc::new(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_averages_neighbours() {
        let counts = smoothed_bin_counts(&[0.05, 0.15, 0.16], 0.0, 4, 1);
        assert_eq!(counts.len(), 4);
        assert!((counts[0] - 1.5).abs() < 1e-12);
        assert!((counts[1] - 1.0).abs() < 1e-12);
        assert!((counts[2] - 2.0 / 3.0).abs() < 1e-12);
        assert!((counts[3] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn unit_names_sort_by_trailing_number() {
        assert_eq!(UnitId::Name("unit-12".into()).sort_key(), 12);
        assert_eq!(UnitId::Number(3).sort_key(), 3);
        assert_eq!(UnitId::Name("abc".into()).sort_key(), 0);
    }
}
