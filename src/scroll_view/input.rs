use super::renderer::ReadyFrame;
use crate::config::ScrollViewConfig;
use crate::data_types::SelectionAction;
use crate::utils::PixelsExt;
use crate::view_controller::ViewController;
use gpui::{Modifiers, Pixels, Point, ScrollDelta};

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragState {
    origin_x: f32,
    last_x: f32,
    anchor_time: f64,
    select_interval: bool,
    dragging: bool,
}

/// Turns pointer and wheel input over the surface into selection actions.
///
/// Positions are local to the drawing surface (toolbar strip excluded).
/// The handler never touches the store; its owner dispatches what it returns.
#[derive(Clone, Debug, Default)]
pub struct ScrollInputHandler {
    pub config: ScrollViewConfig,
    drag: Option<DragState>,
}

impl ScrollInputHandler {
    pub fn new(config: ScrollViewConfig) -> Self {
        Self { config, drag: None }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some_and(|d| d.dragging)
    }

    fn in_plot_x(frame: &ReadyFrame, x: f32) -> bool {
        let left = frame.layout.margins.left;
        x >= left && x <= left + frame.layout.dims.panel_width
    }

    fn time_at(frame: &ReadyFrame, x: f32) -> f64 {
        let (start, end) = frame.visible_window;
        let left = frame.layout.margins.left;
        ViewController::map_pixels_to_value(x - left, frame.layout.dims.panel_width, start, end)
    }

    pub fn handle_mouse_down(&mut self, position: Point<Pixels>, modifiers: &Modifiers, frame: &ReadyFrame) {
        let x = position.x.as_f32();
        let y = position.y.as_f32();
        let plot = frame.layout.plot_bounds();
        let top = plot.origin.y.as_f32();
        let bottom = top + plot.size.height.as_f32();
        if !Self::in_plot_x(frame, x) || y < top || y > bottom {
            self.drag = None;
            return;
        }
        self.drag = Some(DragState {
            origin_x: x,
            last_x: x,
            anchor_time: Self::time_at(frame, x),
            select_interval: modifiers.shift,
            dragging: false,
        });
    }

    pub fn handle_mouse_move(&mut self, position: Point<Pixels>, frame: &ReadyFrame) -> Option<SelectionAction> {
        let x = position.x.as_f32();
        let threshold = self.config.click_threshold_px;
        let drag = self.drag.as_mut()?;
        if !drag.dragging {
            if (x - drag.origin_x).abs() < threshold {
                return None;
            }
            drag.dragging = true;
        }

        if drag.select_interval {
            drag.last_x = x;
            return Some(SelectionAction::SetCurrentTimeInterval {
                interval: (drag.anchor_time, Self::time_at(frame, x)),
                auto_scroll: false,
            });
        }

        let dx = x - drag.last_x;
        drag.last_x = x;
        if dx == 0.0 {
            return None;
        }
        let seconds_per_pixel = frame.time_scale.units_per_pixel();
        Some(SelectionAction::PanByDelta {
            delta_t: -(dx as f64) * seconds_per_pixel,
        })
    }

    pub fn handle_mouse_up(
        &mut self,
        position: Point<Pixels>,
        modifiers: &Modifiers,
        frame: &ReadyFrame,
    ) -> Option<SelectionAction> {
        let drag = self.drag.take()?;
        let x = position.x.as_f32();
        let moved = (x - drag.origin_x).abs() >= self.config.click_threshold_px;
        if !drag.dragging && !moved {
            return Some(SelectionAction::SetCurrentTime {
                time: Self::time_at(frame, x),
                shift_key: modifiers.shift,
                auto_scroll: false,
            });
        }
        if drag.select_interval {
            return Some(SelectionAction::SetCurrentTimeInterval {
                interval: (drag.anchor_time, Self::time_at(frame, x)),
                auto_scroll: false,
            });
        }
        let dx = x - drag.last_x;
        (dx != 0.0).then(|| SelectionAction::PanByDelta {
            delta_t: -(dx as f64) * frame.time_scale.units_per_pixel(),
        })
    }

    /// Ends any drag without producing an action.
    pub fn handle_mouse_leave(&mut self) {
        self.drag = None;
    }

    /// Wheel without modifiers zooms; scrolling down (positive delta) zooms out.
    /// Returns `None` when the event should be left to other handlers.
    pub fn handle_scroll_wheel(&self, delta: &ScrollDelta, modifiers: &Modifiers) -> Option<SelectionAction> {
        if modifiers.shift || modifiers.control || modifiers.alt || modifiers.platform {
            return None;
        }
        let delta_y = match delta {
            ScrollDelta::Pixels(p) => p.y.as_f32(),
            ScrollDelta::Lines(p) => p.y * 20.0,
        };
        if delta_y == 0.0 || !delta_y.is_finite() {
            return None;
        }
        let (direction, factor) = ViewController::compute_zoom_factor(
            delta_y,
            self.config.wheel_sensitivity,
            self.config.max_wheel_zoom_factor,
        );
        Some(SelectionAction::Zoom {
            direction,
            factor: Some(factor),
        })
    }
}
