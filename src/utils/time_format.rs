use chrono::TimeDelta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLabelFormat {
    /// Plain seconds with a fixed number of decimals, e.g. `12.50`.
    Seconds { decimals: usize },
    /// Elapsed clock time, e.g. `1:02:05`.
    HourMinSec,
}

/// Picks the label format for a given tick step (in seconds).
pub fn determine_time_format(step_sec: f64) -> TimeLabelFormat {
    if step_sec >= 60.0 {
        return TimeLabelFormat::HourMinSec;
    }
    if !step_sec.is_finite() || step_sec <= 0.0 {
        return TimeLabelFormat::Seconds { decimals: 0 };
    }
    let decimals = (-step_sec.log10()).ceil().clamp(0.0, 6.0) as usize;
    TimeLabelFormat::Seconds { decimals }
}

/// Formats a time offset in seconds.
pub fn format_time_label(value: f64, format: TimeLabelFormat) -> String {
    match format {
        TimeLabelFormat::Seconds { decimals } => format!("{:.*}", decimals, value),
        TimeLabelFormat::HourMinSec => {
            let Some(delta) = TimeDelta::try_milliseconds((value * 1000.0).round() as i64) else {
                return format!("{:.0}", value);
            };
            let sign = if delta < TimeDelta::zero() { "-" } else { "" };
            let delta = delta.abs();
            format!(
                "{}{}:{:02}:{:02}",
                sign,
                delta.num_hours(),
                delta.num_minutes() % 60,
                delta.num_seconds() % 60
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_follow_step() {
        assert_eq!(
            determine_time_format(1.0),
            TimeLabelFormat::Seconds { decimals: 0 }
        );
        assert_eq!(
            determine_time_format(0.5),
            TimeLabelFormat::Seconds { decimals: 1 }
        );
        assert_eq!(
            determine_time_format(0.02),
            TimeLabelFormat::Seconds { decimals: 2 }
        );
        assert_eq!(determine_time_format(120.0), TimeLabelFormat::HourMinSec);
    }

    #[test]
    fn clock_labels() {
        assert_eq!(format_time_label(3725.0, TimeLabelFormat::HourMinSec), "1:02:05");
        assert_eq!(format_time_label(60.0, TimeLabelFormat::HourMinSec), "0:01:00");
        assert_eq!(
            format_time_label(12.5, TimeLabelFormat::Seconds { decimals: 1 }),
            "12.5"
        );
    }
}
