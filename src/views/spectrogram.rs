use crate::colors::heat_color;
use crate::layout::TimeseriesLayoutOpts;
use crate::rendering::PanelCanvas;
use crate::scroll_view::{Panel, TimeScrollView};
use crate::selection_store::TimeseriesSelectionStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// Upper bound on `numTimepoints × numFrequencies`.
pub const MAX_SPECTROGRAM_CELLS: usize = 50_000_000;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseAudioSpectrogramData {
    pub num_frequencies: usize,
    pub num_timepoints: usize,
    pub sampling_frequency: f64,
    pub spectrogram_values: Vec<f64>,
    pub spectrogram_indices_delta: Vec<i64>,
}

impl SparseAudioSpectrogramData {
    pub(crate) fn check(&self) -> Result<(), String> {
        if !(self.sampling_frequency.is_finite() && self.sampling_frequency > 0.0) {
            return Err(format!(
                "samplingFrequency must be positive, got {}",
                self.sampling_frequency
            ));
        }
        if self.spectrogram_values.len() != self.spectrogram_indices_delta.len() {
            return Err(format!(
                "{} values but {} index deltas",
                self.spectrogram_values.len(),
                self.spectrogram_indices_delta.len()
            ));
        }
        match self.num_timepoints.checked_mul(self.num_frequencies) {
            Some(cells) if cells <= MAX_SPECTROGRAM_CELLS => Ok(()),
            _ => Err(format!(
                "{} timepoints x {} frequencies exceeds {MAX_SPECTROGRAM_CELLS} cells",
                self.num_timepoints, self.num_frequencies
            )),
        }
    }
}

/// Dense `num_timepoints × num_frequencies` matrix, timepoint-major, with
/// values normalised to `[0, 1]` by the maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramMatrix {
    pub num_timepoints: usize,
    pub num_frequencies: usize,
    pub values: Vec<f32>,
}

impl SpectrogramMatrix {
    /// Decodes sparse entries whose flat indices are given as successive
    /// deltas. Entries that land outside the matrix are skipped, and an
    /// overflowing running index drops the rest.
    pub fn decode(data: &SparseAudioSpectrogramData) -> Self {
        let (nt, nf) = match data.num_timepoints.checked_mul(data.num_frequencies) {
            Some(cells) if cells <= MAX_SPECTROGRAM_CELLS => {
                (data.num_timepoints, data.num_frequencies)
            }
            _ => {
                warn!(
                    num_timepoints = data.num_timepoints,
                    num_frequencies = data.num_frequencies,
                    "spectrogram too large, decoding as empty"
                );
                (0, 0)
            }
        };
        let len = nt * nf;
        let mut values = vec![0.0f32; len];
        let mut index: i64 = 0;
        let mut skipped = 0usize;
        let entries = data.spectrogram_values.len();
        for (n, (delta, value)) in data
            .spectrogram_indices_delta
            .iter()
            .zip(&data.spectrogram_values)
            .enumerate()
        {
            let Some(next) = index.checked_add(*delta) else {
                skipped += entries - n;
                break;
            };
            index = next;
            match usize::try_from(index) {
                Ok(i) if i < len => values[i] = *value as f32,
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "spectrogram entries outside the matrix were dropped");
        }

        let max = values.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            values.iter_mut().for_each(|v| *v /= max);
        }
        Self {
            num_timepoints: nt,
            num_frequencies: nf,
            values,
        }
    }

    pub fn get(&self, timepoint: usize, frequency: usize) -> f32 {
        self.values[timepoint * self.num_frequencies + frequency]
    }
}

#[derive(Clone, Debug)]
pub struct SpectrogramProps {
    pub matrix: Arc<SpectrogramMatrix>,
    pub sampling_frequency: f64,
}

fn paint_spectrogram(canvas: &mut PanelCanvas, props: &SpectrogramProps) {
    let m = &props.matrix;
    if m.num_frequencies == 0 || m.num_timepoints == 0 {
        return;
    }
    let (vs, ve) = canvas.visible_window();
    let fs = props.sampling_frequency;
    let first = ((vs * fs).floor().max(0.0) as usize).min(m.num_timepoints);
    let last = ((ve * fs).ceil().max(0.0) as usize + 1).min(m.num_timepoints);
    let cell_h = canvas.height() / m.num_frequencies as f32;

    for i in first..last {
        let x1 = canvas.time_to_x(i as f64 / fs);
        let x2 = canvas.time_to_x((i + 1) as f64 / fs);
        let w = (x2 - x1).max(1.0);
        for j in 0..m.num_frequencies {
            let v = m.get(i, j);
            if v <= 0.0 {
                continue;
            }
            // Low frequencies at the bottom.
            let y = canvas.height() - (j + 1) as f32 * cell_h;
            canvas.fill_rect(x1, y, w, cell_h, heat_color(v));
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpectrogramView {
    matrix: Arc<SpectrogramMatrix>,
    sampling_frequency: f64,
}

impl SpectrogramView {
    pub fn new(data: &SparseAudioSpectrogramData) -> Self {
        Self {
            matrix: Arc::new(SpectrogramMatrix::decode(data)),
            sampling_frequency: data.sampling_frequency,
        }
    }

    pub fn matrix(&self) -> &SpectrogramMatrix {
        &self.matrix
    }

    pub fn duration_sec(&self) -> f64 {
        self.matrix.num_timepoints as f64 / self.sampling_frequency
    }

    pub fn initialize(&self, store: &TimeseriesSelectionStore) -> bool {
        store.initialize(0.0, self.duration_sec())
    }

    pub fn scroll_view(
        &self,
        width: f32,
        height: f32,
        layout_opts: TimeseriesLayoutOpts,
    ) -> TimeScrollView<SpectrogramProps> {
        let panel = Panel::new(
            "spectrogram",
            "",
            SpectrogramProps {
                matrix: self.matrix.clone(),
                sampling_frequency: self.sampling_frequency,
            },
            paint_spectrogram,
        );
        TimeScrollView::new(Arc::new(vec![panel]), width, height).with_layout_opts(layout_opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_cumulative_indices() {
        let data = SparseAudioSpectrogramData {
            num_frequencies: 2,
            num_timepoints: 3,
            sampling_frequency: 10.0,
            spectrogram_values: vec![2.0, 4.0, 1.0],
            spectrogram_indices_delta: vec![1, 2, 2],
        };
        let m = SpectrogramMatrix::decode(&data);
        assert_eq!(m.values, vec![0.0, 0.5, 0.0, 1.0, 0.0, 0.25]);
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn out_of_range_entries_are_dropped() {
        let data = SparseAudioSpectrogramData {
            num_frequencies: 1,
            num_timepoints: 2,
            sampling_frequency: 1.0,
            spectrogram_values: vec![1.0, 5.0],
            spectrogram_indices_delta: vec![0, 7],
        };
        assert_eq!(SpectrogramMatrix::decode(&data).values, vec![1.0, 0.0]);
    }

    #[test]
    fn overflowing_index_stops_decoding() {
        let data = SparseAudioSpectrogramData {
            num_frequencies: 1,
            num_timepoints: 2,
            sampling_frequency: 1.0,
            spectrogram_values: vec![3.0, 9.0, 9.0],
            spectrogram_indices_delta: vec![1, i64::MAX, 5],
        };
        assert_eq!(SpectrogramMatrix::decode(&data).values, vec![0.0, 1.0]);
    }
}
