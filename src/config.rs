use crate::data_types::{DEFAULT_PAN_PCT, DEFAULT_ZOOM_FACTOR};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

/// Tunables of the scroll-view surface. Every field has a default, so a
/// partial JSON object is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollViewConfig {
    pub pan_percent: f64,
    pub zoom_factor: f64,
    /// Largest zoom factor a single wheel event may produce.
    pub max_wheel_zoom_factor: f64,
    /// Pointer travel below which a press/release pair counts as a click.
    pub click_threshold_px: f32,
    /// Wheel travel (in pixels) that adds 1 to the zoom factor before capping.
    pub wheel_sensitivity: f32,
    pub min_tick_spacing_px: f32,
    pub keyboard_pan_percent: f64,
}

impl Default for ScrollViewConfig {
    fn default() -> Self {
        Self {
            pan_percent: DEFAULT_PAN_PCT,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            max_wheel_zoom_factor: DEFAULT_ZOOM_FACTOR,
            click_threshold_px: 4.0,
            wheel_sensitivity: 100.0,
            min_tick_spacing_px: 60.0,
            keyboard_pan_percent: DEFAULT_PAN_PCT,
        }
    }
}

impl ScrollViewConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).wrap_err("failed to parse scroll view config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.zoom_factor.is_finite() || self.zoom_factor < 1.0 {
            eyre::bail!("zoomFactor must be >= 1, got {}", self.zoom_factor);
        }
        if !self.max_wheel_zoom_factor.is_finite() || self.max_wheel_zoom_factor < 1.0 {
            eyre::bail!(
                "maxWheelZoomFactor must be >= 1, got {}",
                self.max_wheel_zoom_factor
            );
        }
        if self.click_threshold_px.is_nan() || self.click_threshold_px < 0.0 {
            eyre::bail!("clickThresholdPx must be >= 0");
        }
        Ok(())
    }
}
