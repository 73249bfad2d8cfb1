use crate::data_types::{Tick, TickSet, TimeTick};
use crate::scales::AffineScale;
use crate::utils::time_format::{determine_time_format, format_time_label};

const MAX_TICKS: usize = 500;

/// Clock-friendly steps used once ticks are a minute or more apart.
const CLOCK_STEPS: [f64; 11] = [
    60.0, 120.0, 300.0, 600.0, 900.0, 1800.0, 3600.0, 7200.0, 10800.0, 21600.0, 43200.0,
];

/// Smallest step from the 1/2/5 progression that is >= `raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    for mult in [1.0, 2.0, 5.0, 10.0] {
        let step = mult * magnitude;
        if step >= raw * (1.0 - 1e-9) {
            return step;
        }
    }
    10.0 * magnitude
}

fn time_step(min_step: f64) -> f64 {
    if min_step <= 30.0 {
        return nice_step(min_step);
    }
    CLOCK_STEPS
        .iter()
        .copied()
        .find(|s| *s >= min_step)
        .unwrap_or_else(|| 86400.0 * nice_step(min_step / 86400.0))
}

/// Integer multiples of `step` inside `[start, end]`.
fn multiples(start: f64, end: f64, step: f64) -> impl Iterator<Item = (i64, f64)> {
    let first = (start / step - 1e-9).ceil() as i64;
    let last = (end / step + 1e-9).floor() as i64;
    (first..=last)
        .take(MAX_TICKS)
        .map(move |k| (k, if k == 0 { 0.0 } else { k as f64 * step }))
}

/// Ticks for the time axis of the visible window, at least `min_spacing_px`
/// apart. Every fifth multiple of the step is flagged as major.
pub fn time_ticks(start: f64, end: f64, scale: &AffineScale, min_spacing_px: f32) -> Vec<TimeTick> {
    if !start.is_finite() || !end.is_finite() || end <= start || scale.is_degenerate() {
        return Vec::new();
    }
    let pixels_per_second = scale.pixels_per_unit().abs();
    let min_step = min_spacing_px.max(1.0) as f64 / pixels_per_second;
    let step = time_step(min_step);
    let format = determine_time_format(step);

    multiples(start, end, step)
        .map(|(k, value)| TimeTick {
            value,
            pixel_x: scale.map(value),
            label: format_time_label(value, format),
            is_major: k % 5 == 0,
        })
        .collect()
}

/// Roughly `count` evenly spaced ticks over `[lo, hi]` for a value axis.
pub fn value_ticks(lo: f64, hi: f64, count: usize) -> TickSet {
    let mut set = TickSet {
        datamin: lo,
        datamax: hi,
        ticks: Vec::new(),
    };
    if !lo.is_finite() || !hi.is_finite() || hi < lo {
        return set;
    }
    if hi == lo {
        set.ticks.push(Tick {
            value: lo,
            label: format!("{}", lo),
            is_major: true,
        });
        return set;
    }
    let step = nice_step((hi - lo) / count.max(1) as f64);
    let decimals = (-step.log10()).ceil().clamp(0.0, 6.0) as usize;
    set.ticks = multiples(lo, hi, step)
        .map(|(k, value)| Tick {
            value,
            label: format!("{:.*}", decimals, value),
            is_major: k % 5 == 0,
        })
        .collect();
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.0), 1.0);
        assert_eq!(nice_step(1.3), 2.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.0), 10.0);
        assert!((nice_step(0.013) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn long_steps_use_clock_values() {
        assert_eq!(time_step(45.0), 60.0);
        assert_eq!(time_step(400.0), 600.0);
    }
}
