use super::{GridlineOpts, Panel, TimeScrollView};
use crate::config::ScrollViewConfig;
use crate::data_types::{Annotation, HighlightIntervalSet, TickSet, TimeseriesSelection};
use crate::layout::{Margins, SurfaceLayout, TimeseriesLayoutOpts};
use crate::rendering::{DisplayList, DrawCommand, Layer, PanelCanvas, TextAnchor};
use crate::scales::{time_scale, value_scale, AffineScale};
use crate::spans::{filter_and_project_highlight_spans, project_annotations, PixelAnnotation};
use crate::theme::TimeScrollTheme;
use crate::ticks::time_ticks;
use gpui::{point, px, size, Bounds, Pixels};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Output of one render pass.
#[derive(Debug)]
pub enum RenderedFrame {
    /// The selection is uninitialized; only a placeholder is drawn.
    Loading(DisplayList),
    Ready(ReadyFrame),
}

#[derive(Debug)]
pub struct ReadyFrame {
    pub list: DisplayList,
    pub layout: SurfaceLayout,
    pub time_scale: AffineScale,
    pub visible_window: (f64, f64),
}

impl RenderedFrame {
    pub fn display_list(&self) -> &DisplayList {
        match self {
            Self::Loading(list) => list,
            Self::Ready(frame) => &frame.list,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn ready(&self) -> Option<&ReadyFrame> {
        match self {
            Self::Loading(_) => None,
            Self::Ready(frame) => Some(frame),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Geometry {
    width: f32,
    height: f32,
    spacing: f32,
    margins: Margins,
    layout_opts: TimeseriesLayoutOpts,
    gridline_opts: GridlineOpts,
    y_tick_set: Option<TickSet>,
    show_y_min_max_labels: bool,
}

impl Geometry {
    fn of<P>(view: &TimeScrollView<P>) -> Self {
        Self {
            width: view.width,
            height: view.height,
            spacing: view.panel_spacing,
            margins: view.resolved_margins(),
            layout_opts: view.layout_opts,
            gridline_opts: view.gridline_opts,
            y_tick_set: view.y_tick_set.clone(),
            show_y_min_max_labels: view.show_y_min_max_labels,
        }
    }
}

/// Everything a frame depends on. Shared inputs are compared by identity.
struct FrameKey<P> {
    panels: Arc<Vec<Panel<P>>>,
    highlight_spans: Arc<Vec<HighlightIntervalSet>>,
    selected_panel_keys: Arc<HashSet<String>>,
    selection: Arc<TimeseriesSelection>,
    annotations: Arc<Vec<Annotation>>,
    geometry: Geometry,
}

impl<P> FrameKey<P> {
    fn matches(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.panels, &other.panels)
            && Arc::ptr_eq(&self.highlight_spans, &other.highlight_spans)
            && Arc::ptr_eq(&self.selected_panel_keys, &other.selected_panel_keys)
            && Arc::ptr_eq(&self.selection, &other.selection)
            && Arc::ptr_eq(&self.annotations, &other.annotations)
            && self.geometry == other.geometry
    }
}

/// Builds display lists for a [`TimeScrollView`], re-rendering only when an
/// input actually changed.
pub struct ScrollRenderer<P> {
    pub theme: TimeScrollTheme,
    pub config: ScrollViewConfig,
    cache: Option<(FrameKey<P>, Arc<RenderedFrame>)>,
    render_count: usize,
}

impl<P> Default for ScrollRenderer<P> {
    fn default() -> Self {
        Self::new(TimeScrollTheme::default(), ScrollViewConfig::default())
    }
}

impl<P> ScrollRenderer<P> {
    pub fn new(theme: TimeScrollTheme, config: ScrollViewConfig) -> Self {
        Self {
            theme,
            config,
            cache: None,
            render_count: 0,
        }
    }

    /// How many frames were actually built (cache hits excluded).
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Drops the cached frame, e.g. after a theme change.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn render(
        &mut self,
        view: &TimeScrollView<P>,
        selection: &Arc<TimeseriesSelection>,
        annotations: &Arc<Vec<Annotation>>,
    ) -> Arc<RenderedFrame> {
        let key = FrameKey {
            panels: view.panels.clone(),
            highlight_spans: view.highlight_spans.clone(),
            selected_panel_keys: view.selected_panel_keys.clone(),
            selection: selection.clone(),
            annotations: annotations.clone(),
            geometry: Geometry::of(view),
        };
        if let Some((cached_key, frame)) = &self.cache {
            if cached_key.matches(&key) {
                return frame.clone();
            }
        }

        self.render_count += 1;
        let frame = Arc::new(self.build(view, selection, annotations));
        self.cache = Some((key, frame.clone()));
        frame
    }

    fn build(
        &self,
        view: &TimeScrollView<P>,
        selection: &TimeseriesSelection,
        annotations: &[Annotation],
    ) -> RenderedFrame {
        let layout = view.surface_layout();
        let Some(window) = selection.visible_window() else {
            trace!("selection uninitialized, rendering placeholder");
            return RenderedFrame::Loading(self.loading_list(&layout));
        };
        let scale = time_scale(
            layout.dims.panel_width,
            window.0,
            window.1,
            layout.margins.left,
        );

        let mut list = DisplayList::new();
        self.paint_axes(&mut list, view, &layout, &scale, window);
        self.paint_panels(&mut list, view, &layout, window);
        self.paint_highlights(&mut list, &view.highlight_spans, &layout, &scale, window);
        self.paint_cursor(&mut list, selection, &layout, &scale, window);
        self.paint_annotations(&mut list, annotations, &layout, &scale, window);

        RenderedFrame::Ready(ReadyFrame {
            list,
            layout,
            time_scale: scale,
            visible_window: window,
        })
    }

    fn loading_list(&self, layout: &SurfaceLayout) -> DisplayList {
        let mut list = DisplayList::new();
        list.push(
            Layer::Axes,
            None,
            DrawCommand::Text {
                origin: point(px(layout.width / 2.0), px(layout.height / 2.0)),
                text: "Loading...".to_string(),
                color: self.theme.placeholder_text,
                size: self.theme.axis_label_size,
                anchor: TextAnchor::Middle,
            },
        );
        list
    }

    fn paint_axes(
        &self,
        list: &mut DisplayList,
        view: &TimeScrollView<P>,
        layout: &SurfaceLayout,
        scale: &AffineScale,
        window: (f64, f64),
    ) {
        let theme = &self.theme;
        let plot = layout.plot_bounds();
        let plot_top = layout.margins.top;
        let plot_bottom = plot_top + f32::from(plot.size.height);

        for (index, panel) in view.panels.iter().enumerate() {
            let row = layout.row_bounds(index);
            if view.selected_panel_keys.contains(&panel.key) {
                list.push(
                    Layer::Axes,
                    None,
                    DrawCommand::FillRect {
                        bounds: row,
                        color: theme.selected_panel,
                    },
                );
            }
            if !panel.label.is_empty() && !view.layout_opts.use_y_axis {
                list.push(
                    Layer::Axes,
                    None,
                    DrawCommand::Text {
                        origin: point(
                            px(layout.margins.left - 4.0),
                            row.origin.y + row.size.height / 2.0,
                        ),
                        text: panel.label.clone(),
                        color: theme.panel_label,
                        size: theme.axis_label_size,
                        anchor: TextAnchor::End,
                    },
                );
            }
        }

        let ticks = time_ticks(window.0, window.1, scale, self.config.min_tick_spacing_px);
        if !view.gridline_opts.hide_x {
            for tick in &ticks {
                list.push(
                    Layer::Axes,
                    Some(plot),
                    DrawCommand::Line {
                        from: point(px(tick.pixel_x), px(plot_top)),
                        to: point(px(tick.pixel_x), px(plot_bottom)),
                        color: theme.grid_line,
                        width: px(1.0),
                    },
                );
            }
        }

        if !view.layout_opts.hide_time_axis {
            let axis_y = plot_bottom;
            list.push(
                Layer::Axes,
                None,
                DrawCommand::Line {
                    from: point(px(layout.margins.left), px(axis_y)),
                    to: point(px(layout.margins.left + layout.dims.panel_width), px(axis_y)),
                    color: theme.axis_line,
                    width: px(1.0),
                },
            );
            for tick in &ticks {
                let tick_len = if tick.is_major { 6.0 } else { 3.0 };
                list.push(
                    Layer::Axes,
                    None,
                    DrawCommand::Line {
                        from: point(px(tick.pixel_x), px(axis_y)),
                        to: point(px(tick.pixel_x), px(axis_y + tick_len)),
                        color: theme.axis_line,
                        width: px(1.0),
                    },
                );
                list.push(
                    Layer::Axes,
                    None,
                    DrawCommand::Text {
                        origin: point(px(tick.pixel_x), px(axis_y + 14.0)),
                        text: tick.label.clone(),
                        color: theme.axis_label,
                        size: theme.axis_label_size,
                        anchor: TextAnchor::Middle,
                    },
                );
            }
        }

        if let Some(tick_set) = &view.y_tick_set {
            self.paint_y_ticks(list, view, layout, tick_set);
        }
    }

    fn paint_y_ticks(
        &self,
        list: &mut DisplayList,
        view: &TimeScrollView<P>,
        layout: &SurfaceLayout,
        tick_set: &TickSet,
    ) {
        let theme = &self.theme;
        let label_x = px(layout.margins.left - 4.0);
        for index in 0..view.panels.len() {
            let row = layout.row_bounds(index);
            let y_scale = value_scale(tick_set.datamin, tick_set.datamax, layout.dims.panel_height);
            let row_top = row.origin.y;

            for tick in &tick_set.ticks {
                if tick.value < tick_set.datamin || tick.value > tick_set.datamax {
                    continue;
                }
                let y = row_top + px(y_scale.map(tick.value));
                if !view.gridline_opts.hide_y {
                    list.push(
                        Layer::Axes,
                        Some(row),
                        DrawCommand::Line {
                            from: point(row.origin.x, y),
                            to: point(row.origin.x + row.size.width, y),
                            color: theme.grid_line,
                            width: px(1.0),
                        },
                    );
                }
                list.push(
                    Layer::Axes,
                    None,
                    DrawCommand::Text {
                        origin: point(label_x, y),
                        text: tick.label.clone(),
                        color: theme.axis_label,
                        size: theme.axis_label_size,
                        anchor: TextAnchor::End,
                    },
                );
            }

            if view.show_y_min_max_labels {
                for (value, y) in [
                    (tick_set.datamax, row_top),
                    (tick_set.datamin, row_top + row.size.height),
                ] {
                    list.push(
                        Layer::Axes,
                        None,
                        DrawCommand::Text {
                            origin: point(label_x, y),
                            text: format!("{}", value),
                            color: theme.axis_label,
                            size: theme.axis_label_size,
                            anchor: TextAnchor::End,
                        },
                    );
                }
            }
        }
    }

    fn paint_panels(
        &self,
        list: &mut DisplayList,
        view: &TimeScrollView<P>,
        layout: &SurfaceLayout,
        window: (f64, f64),
    ) {
        for (index, panel) in view.panels.iter().enumerate() {
            let row = layout.row_bounds(index);
            if row.size.height <= px(0.0) || row.size.width <= px(0.0) {
                continue;
            }
            let mut canvas = PanelCanvas::new(list, row, window);
            panel.paint(&mut canvas);
        }
    }

    fn paint_highlights(
        &self,
        list: &mut DisplayList,
        sets: &[HighlightIntervalSet],
        layout: &SurfaceLayout,
        scale: &AffineScale,
        window: (f64, f64),
    ) {
        let plot = layout.plot_bounds();
        for spans in filter_and_project_highlight_spans(sets, Some(window), scale) {
            let color = spans.color.unwrap_or(self.theme.highlight_span);
            for (x, w) in spans.spans() {
                list.push(
                    Layer::Highlight,
                    Some(plot),
                    DrawCommand::FillRect {
                        bounds: vertical_band(&plot, x, w),
                        color,
                    },
                );
            }
        }
    }

    fn paint_cursor(
        &self,
        list: &mut DisplayList,
        selection: &TimeseriesSelection,
        layout: &SurfaceLayout,
        scale: &AffineScale,
        window: (f64, f64),
    ) {
        let plot = layout.plot_bounds();
        if let Some((t1, t2)) = selection.current_time_interval() {
            if t2 >= window.0 && t1 <= window.1 {
                let x0 = scale.map(t1.max(window.0));
                let x1 = scale.map(t2.min(window.1));
                list.push(
                    Layer::Cursor,
                    Some(plot),
                    DrawCommand::FillRect {
                        bounds: vertical_band(&plot, x0, (x1 - x0).max(1.0)),
                        color: self.theme.interval_fill,
                    },
                );
            }
        }
        if selection.current_time_is_visible() {
            if let Some(t) = selection.current_time() {
                let x = px(scale.map(t));
                list.push(
                    Layer::Cursor,
                    Some(plot),
                    DrawCommand::Line {
                        from: point(x, plot.origin.y),
                        to: point(x, plot.origin.y + plot.size.height),
                        color: self.theme.cursor_line,
                        width: px(1.0),
                    },
                );
            }
        }
    }

    fn paint_annotations(
        &self,
        list: &mut DisplayList,
        annotations: &[Annotation],
        layout: &SurfaceLayout,
        scale: &AffineScale,
        window: (f64, f64),
    ) {
        let plot = layout.plot_bounds();
        let theme = &self.theme;
        for annotation in project_annotations(annotations, Some(window), scale) {
            let label_x = match &annotation {
                PixelAnnotation::Timepoint { pixel_x, .. } => {
                    let x = px(*pixel_x);
                    list.push(
                        Layer::Annotations,
                        Some(plot),
                        DrawCommand::Line {
                            from: point(x, plot.origin.y),
                            to: point(x, plot.origin.y + plot.size.height),
                            color: theme.annotation,
                            width: px(1.0),
                        },
                    );
                    *pixel_x
                }
                PixelAnnotation::Interval {
                    pixel_start,
                    pixel_width,
                    ..
                } => {
                    list.push(
                        Layer::Annotations,
                        Some(plot),
                        DrawCommand::FillRect {
                            bounds: vertical_band(&plot, *pixel_start, *pixel_width),
                            color: theme.annotation.alpha(0.15),
                        },
                    );
                    *pixel_start
                }
            };
            if !annotation.label().is_empty() {
                list.push(
                    Layer::Annotations,
                    Some(plot),
                    DrawCommand::Text {
                        origin: point(px(label_x + 2.0), plot.origin.y + px(8.0)),
                        text: annotation.label().to_string(),
                        color: theme.annotation,
                        size: theme.annotation_label_size,
                        anchor: TextAnchor::Start,
                    },
                );
            }
        }
    }
}

fn vertical_band(plot: &Bounds<Pixels>, x: f32, width: f32) -> Bounds<Pixels> {
    Bounds::new(
        point(px(x), plot.origin.y),
        size(px(width), plot.size.height),
    )
}
