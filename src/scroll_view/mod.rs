pub mod actions;
pub mod element;
pub mod input;
pub mod renderer;

use crate::data_types::{HighlightIntervalSet, TickSet};
use crate::layout::{timeseries_margins, Margins, SurfaceLayout, TimeseriesLayoutOpts};
use crate::rendering::PanelCanvas;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub use actions::{PanBack, PanForward, ResetView, ToolbarActions, ToolbarItem, ZoomIn, ZoomOut};
pub use element::TimeScrollElement;
pub use input::ScrollInputHandler;
pub use renderer::{ReadyFrame, RenderedFrame, ScrollRenderer};

pub type PaintFn<P> = Arc<dyn Fn(&mut PanelCanvas, &P) + Send + Sync>;

/// One row of the scroll view with its own paint routine.
pub struct Panel<P> {
    pub key: String,
    pub label: String,
    pub props: P,
    pub paint: PaintFn<P>,
}

impl<P> Panel<P> {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        props: P,
        paint: impl Fn(&mut PanelCanvas, &P) + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            props,
            paint: Arc::new(paint),
        }
    }

    pub fn paint(&self, canvas: &mut PanelCanvas) {
        (self.paint)(canvas, &self.props)
    }
}

impl<P: Clone> Clone for Panel<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            props: self.props.clone(),
            paint: self.paint.clone(),
        }
    }
}

impl<P> std::fmt::Debug for Panel<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridlineOpts {
    #[serde(default)]
    pub hide_x: bool,
    #[serde(default)]
    pub hide_y: bool,
}

/// Inputs of one scroll-view surface. Large inputs are shared through
/// `Arc` so that unchanged inputs can be recognised by identity.
pub struct TimeScrollView<P> {
    pub panels: Arc<Vec<Panel<P>>>,
    pub panel_spacing: f32,
    /// Explicit margins; derived from `layout_opts` when unset.
    pub margins: Option<Margins>,
    pub width: f32,
    pub height: f32,
    pub highlight_spans: Arc<Vec<HighlightIntervalSet>>,
    pub optional_actions: Option<ToolbarActions>,
    pub selected_panel_keys: Arc<HashSet<String>>,
    pub y_tick_set: Option<TickSet>,
    pub show_y_min_max_labels: bool,
    pub gridline_opts: GridlineOpts,
    pub layout_opts: TimeseriesLayoutOpts,
}

impl<P> TimeScrollView<P> {
    pub fn new(panels: Arc<Vec<Panel<P>>>, width: f32, height: f32) -> Self {
        Self {
            panels,
            panel_spacing: crate::layout::DEFAULT_PANEL_SPACING,
            margins: None,
            width,
            height,
            highlight_spans: Arc::new(Vec::new()),
            optional_actions: None,
            selected_panel_keys: Arc::new(HashSet::new()),
            y_tick_set: None,
            show_y_min_max_labels: false,
            gridline_opts: GridlineOpts::default(),
            layout_opts: TimeseriesLayoutOpts::default(),
        }
    }

    pub fn with_panel_spacing(mut self, spacing: f32) -> Self {
        self.panel_spacing = spacing;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = Some(margins);
        self
    }

    pub fn with_highlight_spans(mut self, spans: Arc<Vec<HighlightIntervalSet>>) -> Self {
        self.highlight_spans = spans;
        self
    }

    pub fn with_actions(mut self, actions: ToolbarActions) -> Self {
        self.optional_actions = Some(actions);
        self
    }

    pub fn with_selected_panel_keys(mut self, keys: Arc<HashSet<String>>) -> Self {
        self.selected_panel_keys = keys;
        self
    }

    pub fn with_y_tick_set(mut self, ticks: TickSet) -> Self {
        self.y_tick_set = Some(ticks);
        self
    }

    pub fn with_y_min_max_labels(mut self, show: bool) -> Self {
        self.show_y_min_max_labels = show;
        self
    }

    pub fn with_gridline_opts(mut self, opts: GridlineOpts) -> Self {
        self.gridline_opts = opts;
        self
    }

    pub fn with_layout_opts(mut self, opts: TimeseriesLayoutOpts) -> Self {
        self.layout_opts = opts;
        self
    }

    pub fn resolved_margins(&self) -> Margins {
        self.margins
            .unwrap_or_else(|| timeseries_margins(&self.layout_opts))
    }

    pub fn toolbar_width(&self) -> f32 {
        self.layout_opts.toolbar_width()
    }

    /// Layout of the drawing surface to the right of the toolbar strip.
    pub fn surface_layout(&self) -> SurfaceLayout {
        SurfaceLayout::new(
            (self.width - self.toolbar_width()).max(0.0),
            self.height,
            self.panels.len(),
            self.panel_spacing,
            self.resolved_margins(),
        )
    }
}
