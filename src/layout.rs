use gpui::{point, px, size, Bounds, Pixels};
use serde::{Deserialize, Serialize};

/// Width of the vertical toolbar strip on the left of the surface.
pub const DEFAULT_TOOLBAR_WIDTH: f32 = 18.0;
/// Vertical gap between panel rows when none is given.
pub const DEFAULT_PANEL_SPACING: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 30.0,
            right: 20.0,
            top: 20.0,
            bottom: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesLayoutOpts {
    #[serde(default)]
    pub hide_toolbar: bool,
    #[serde(default)]
    pub hide_time_axis: bool,
    #[serde(default)]
    pub use_y_axis: bool,
}

impl TimeseriesLayoutOpts {
    pub fn toolbar_width(&self) -> f32 {
        if self.hide_toolbar {
            0.0
        } else {
            DEFAULT_TOOLBAR_WIDTH
        }
    }
}

/// Default margins adjusted for a y axis (wider left) and a hidden time
/// axis (shorter bottom).
pub fn timeseries_margins(opts: &TimeseriesLayoutOpts) -> Margins {
    let defaults = Margins::default();
    Margins {
        left: if opts.use_y_axis { 60.0 } else { defaults.left },
        bottom: if opts.hide_time_axis { 20.0 } else { defaults.bottom },
        ..defaults
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelDimensions {
    pub panel_width: f32,
    pub panel_height: f32,
}

/// Splits the drawable height evenly among `count` rows separated by
/// `spacing`. `width` must already exclude the toolbar strip.
pub fn panel_dimensions(
    width: f32,
    height: f32,
    count: usize,
    spacing: f32,
    margins: &Margins,
) -> PanelDimensions {
    let panel_width = (width - margins.left - margins.right).max(0.0);
    let panel_height = if count == 0 {
        0.0
    } else {
        let gaps = spacing * (count - 1) as f32;
        ((height - margins.top - margins.bottom - gaps) / count as f32).max(0.0)
    };
    PanelDimensions {
        panel_width,
        panel_height,
    }
}

/// Resolved geometry of one scroll-view surface, in coordinates local to
/// the surface (the toolbar strip is excluded).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub spacing: f32,
    pub count: usize,
    pub dims: PanelDimensions,
}

impl SurfaceLayout {
    pub fn new(width: f32, height: f32, count: usize, spacing: f32, margins: Margins) -> Self {
        Self {
            width,
            height,
            margins,
            spacing,
            count,
            dims: panel_dimensions(width, height, count, spacing, &margins),
        }
    }

    /// Top edge of row `index`.
    pub fn row_offset(&self, index: usize) -> f32 {
        self.margins.top + index as f32 * (self.dims.panel_height + self.spacing)
    }

    /// Bounds of row `index`; only the plotting area, margins excluded.
    pub fn row_bounds(&self, index: usize) -> Bounds<Pixels> {
        Bounds::new(
            point(px(self.margins.left), px(self.row_offset(index))),
            size(px(self.dims.panel_width), px(self.dims.panel_height)),
        )
    }

    /// Full plotting area spanning every row.
    pub fn plot_bounds(&self) -> Bounds<Pixels> {
        let height = (self.height - self.margins.top - self.margins.bottom).max(0.0);
        Bounds::new(
            point(px(self.margins.left), px(self.margins.top)),
            size(px(self.dims.panel_width), px(height)),
        )
    }

    /// Strip below the rows holding the time axis labels.
    pub fn time_axis_bounds(&self) -> Bounds<Pixels> {
        let top = (self.height - self.margins.bottom).max(0.0);
        Bounds::new(
            point(px(self.margins.left), px(top)),
            size(px(self.dims.panel_width), px(self.margins.bottom)),
        )
    }

    /// Row index under a local y coordinate, gaps and margins excluded.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if self.count == 0 || self.dims.panel_height <= 0.0 {
            return None;
        }
        let rel = y - self.margins.top;
        if rel < 0.0 {
            return None;
        }
        let pitch = self.dims.panel_height + self.spacing;
        let index = (rel / pitch).floor() as usize;
        let within = rel - index as f32 * pitch;
        (index < self.count && within <= self.dims.panel_height).then_some(index)
    }
}
