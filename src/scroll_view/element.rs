use super::actions::{
    toolbar_items, PanBack, PanForward, ResetView, ScrollActionHandler, ToolbarItem, ZoomIn,
    ZoomOut, KEY_CONTEXT,
};
use super::input::ScrollInputHandler;
use super::renderer::{RenderedFrame, ScrollRenderer};
use super::TimeScrollView;
use crate::config::ScrollViewConfig;
use crate::data_types::{Annotation, SelectionAction};
use crate::rendering::{dash_segments, DisplayList, DrawCommand, MarkerShape, TextAnchor};
use crate::selection_model::SelectionModel;
use crate::theme::TimeScrollTheme;
use gpui::prelude::*;
use gpui::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

/// Interactive GPUI view hosting one scroll-view surface.
pub struct TimeScrollElement<P: 'static> {
    view: TimeScrollView<P>,
    selection: Entity<SelectionModel>,
    annotations: Arc<Vec<Annotation>>,
    renderer: ScrollRenderer<P>,
    input: ScrollInputHandler,
    actions: ScrollActionHandler,
    frame: Option<Arc<RenderedFrame>>,
    surface_bounds: Rc<RefCell<Bounds<Pixels>>>,
    focus_handle: FocusHandle,
}

impl<P: 'static> Focusable for TimeScrollElement<P> {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl<P: 'static> TimeScrollElement<P> {
    pub fn new(
        view: TimeScrollView<P>,
        selection: Entity<SelectionModel>,
        config: ScrollViewConfig,
        cx: &mut Context<Self>,
    ) -> Self {
        cx.observe(&selection, |_, _, cx| cx.notify()).detach();
        let store = selection.read(cx).store.clone();
        Self {
            view,
            selection,
            annotations: Arc::new(Vec::new()),
            renderer: ScrollRenderer::new(TimeScrollTheme::default(), config.clone()),
            input: ScrollInputHandler::new(config.clone()),
            actions: ScrollActionHandler::new(store, config),
            frame: None,
            surface_bounds: Rc::new(RefCell::new(Bounds::default())),
            focus_handle: cx.focus_handle(),
        }
    }

    pub fn set_view(&mut self, view: TimeScrollView<P>, cx: &mut Context<Self>) {
        self.view = view;
        cx.notify();
    }

    pub fn set_annotations(&mut self, annotations: Arc<Vec<Annotation>>, cx: &mut Context<Self>) {
        self.annotations = annotations;
        cx.notify();
    }

    pub fn set_theme(&mut self, theme: TimeScrollTheme, cx: &mut Context<Self>) {
        self.renderer.theme = theme;
        self.renderer.invalidate();
        cx.notify();
    }

    fn local_position(&self, position: Point<Pixels>) -> Point<Pixels> {
        let origin = self.surface_bounds.borrow().origin;
        point(position.x - origin.x, position.y - origin.y)
    }

    fn ready_frame(&self) -> Option<Arc<RenderedFrame>> {
        self.frame.clone().filter(|frame| !frame.is_loading())
    }

    fn publish(&mut self, action: SelectionAction, cx: &mut Context<Self>) {
        self.selection.update(cx, |model, cx| {
            model.publish(action, cx);
        });
    }

    fn sync_selection(&mut self, cx: &mut Context<Self>) {
        self.selection.update(cx, |model, cx| model.sync(cx));
    }

    fn on_mouse_down(&mut self, event: &MouseDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        window.focus(&self.focus_handle);
        let Some(frame) = self.ready_frame() else {
            return;
        };
        if let Some(ready) = frame.ready() {
            let position = self.local_position(event.position);
            self.input.handle_mouse_down(position, &event.modifiers, ready);
            cx.stop_propagation();
        }
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let Some(frame) = self.ready_frame() else {
            return;
        };
        let Some(ready) = frame.ready() else {
            return;
        };
        let position = self.local_position(event.position);
        if let Some(action) = self.input.handle_mouse_move(position, ready) {
            self.publish(action, cx);
        }
    }

    fn on_mouse_up(&mut self, event: &MouseUpEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let Some(frame) = self.ready_frame() else {
            return;
        };
        let Some(ready) = frame.ready() else {
            return;
        };
        let position = self.local_position(event.position);
        if let Some(action) = self.input.handle_mouse_up(position, &event.modifiers, ready) {
            self.publish(action, cx);
        }
    }

    fn on_hover(&mut self, hovered: &bool, _window: &mut Window, _cx: &mut Context<Self>) {
        if !*hovered {
            self.input.handle_mouse_leave();
        }
    }

    fn on_scroll_wheel(&mut self, event: &ScrollWheelEvent, _window: &mut Window, cx: &mut Context<Self>) {
        if self.ready_frame().is_none() {
            return;
        }
        if let Some(action) = self.input.handle_scroll_wheel(&event.delta, &event.modifiers) {
            self.publish(action, cx);
            cx.stop_propagation();
        }
    }

    fn on_key_action(&mut self, action: &dyn Action, cx: &mut Context<Self>) {
        if self.actions.run_key(action) {
            self.sync_selection(cx);
        }
    }

    fn render_toolbar(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = &self.renderer.theme;
        let width = self.view.toolbar_width();
        let items: Vec<ToolbarItem> =
            toolbar_items(self.view.optional_actions.as_ref(), &self.actions.config);

        div()
            .w(px(width))
            .h_full()
            .flex()
            .flex_col()
            .items_center()
            .gap_1()
            .pt_2()
            .bg(theme.toolbar_background)
            .children(items.into_iter().map(|item| {
                let command = item.command.clone();
                div()
                    .id(SharedString::from(item.id.clone()))
                    .w(px(width))
                    .h(px(width))
                    .flex()
                    .items_center()
                    .justify_center()
                    .text_size(px(12.0))
                    .text_color(theme.toolbar_icon)
                    .when(item.selected, |d| d.bg(theme.selected_panel))
                    .hover(|s| s.bg(theme.toolbar_icon.opacity(0.1)))
                    .cursor_pointer()
                    .on_mouse_down(
                        MouseButton::Left,
                        cx.listener(move |this, _: &MouseDownEvent, _win, cx| {
                            if this.actions.run(&command) {
                                this.sync_selection(cx);
                            }
                            cx.stop_propagation();
                        }),
                    )
                    .child(item.icon)
            }))
    }
}

impl<P: 'static> Render for TimeScrollElement<P> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let snapshot = self.selection.read(cx).snapshot();
        let frame = self.renderer.render(&self.view, &snapshot, &self.annotations);
        self.frame = Some(frame.clone());

        let theme = self.renderer.theme.clone();
        let bounds_rc = self.surface_bounds.clone();
        let paint_frame = frame.clone();

        let mut root = div()
            .key_context(KEY_CONTEXT)
            .track_focus(&self.focus_handle)
            .w(px(self.view.width))
            .h(px(self.view.height))
            .flex()
            .flex_row()
            .bg(theme.background)
            .on_action(cx.listener(|this, a: &PanBack, _, cx| this.on_key_action(a, cx)))
            .on_action(cx.listener(|this, a: &PanForward, _, cx| this.on_key_action(a, cx)))
            .on_action(cx.listener(|this, a: &ZoomIn, _, cx| this.on_key_action(a, cx)))
            .on_action(cx.listener(|this, a: &ZoomOut, _, cx| this.on_key_action(a, cx)))
            .on_action(cx.listener(|this, a: &ResetView, _, cx| this.on_key_action(a, cx)));

        if !self.view.layout_opts.hide_toolbar {
            root = root.child(self.render_toolbar(cx));
        }

        root.child(
            div()
                .id(("time-scroll-surface", cx.entity_id()))
                .relative()
                .flex_grow()
                .h_full()
                .overflow_hidden()
                .on_mouse_down(MouseButton::Left, cx.listener(Self::on_mouse_down))
                .on_mouse_move(cx.listener(Self::on_mouse_move))
                .on_mouse_up(MouseButton::Left, cx.listener(Self::on_mouse_up))
                .on_hover(cx.listener(Self::on_hover))
                .on_scroll_wheel(cx.listener(Self::on_scroll_wheel))
                .child(
                    canvas(
                        move |bounds, _, _| {
                            *bounds_rc.borrow_mut() = bounds;
                        },
                        move |bounds, (), window, cx| {
                            paint_display_list(paint_frame.display_list(), bounds.origin, window, cx);
                        },
                    )
                    .absolute()
                    .size_full(),
                ),
        )
    }
}

fn offset_point(p: Point<Pixels>, origin: Point<Pixels>) -> Point<Pixels> {
    point(p.x + origin.x, p.y + origin.y)
}

fn offset_bounds(b: Bounds<Pixels>, origin: Point<Pixels>) -> Bounds<Pixels> {
    Bounds::new(offset_point(b.origin, origin), b.size)
}

fn stroke_path(window: &mut Window, points: &[Point<Pixels>], width: Pixels, color: Hsla) {
    if points.len() < 2 {
        return;
    }
    let mut builder = PathBuilder::stroke(width);
    builder.move_to(points[0]);
    for p in &points[1..] {
        builder.line_to(*p);
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, color);
    }
}

/// Text is shaped and painted in the canvas pass so it honours layer order
/// and the item's clip. `origin` sits on the vertical middle of the line.
fn paint_text(
    window: &mut Window,
    cx: &mut App,
    origin: Point<Pixels>,
    text: &str,
    color: Hsla,
    font_size: Pixels,
    anchor: TextAnchor,
) {
    if text.is_empty() {
        return;
    }
    let run = TextRun {
        len: text.len(),
        font: TextStyle::default().font(),
        color,
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    let Ok(lines) =
        window
            .text_system()
            .shape_text(SharedString::from(text.to_string()), font_size, &[run], None, None)
    else {
        return;
    };
    let line_height = font_size * 1.4;
    for line in lines {
        let line_width = line.width();
        let x = match anchor {
            TextAnchor::Start => origin.x,
            TextAnchor::Middle => origin.x - line_width / 2.0,
            TextAnchor::End => origin.x - line_width,
        };
        let _ = line.paint(
            point(x, origin.y - line_height / 2.0),
            line_height,
            TextAlign::Left,
            None,
            window,
            cx,
        );
    }
}

fn paint_command(window: &mut Window, cx: &mut App, command: &DrawCommand, origin: Point<Pixels>) {
    match command {
        DrawCommand::FillRect { bounds, color } => {
            window.paint_quad(gpui::fill(offset_bounds(*bounds, origin), *color));
        }
        DrawCommand::StrokeRect { bounds, color } => {
            window.paint_quad(gpui::outline(
                offset_bounds(*bounds, origin),
                *color,
                BorderStyle::Solid,
            ));
        }
        DrawCommand::Line {
            from,
            to,
            color,
            width,
        } => {
            let points = [offset_point(*from, origin), offset_point(*to, origin)];
            stroke_path(window, &points, *width, *color);
        }
        DrawCommand::Polyline {
            points,
            color,
            width,
            dash,
        } => {
            let points: Vec<Point<Pixels>> =
                points.iter().map(|p| offset_point(*p, origin)).collect();
            match dash {
                Some(pattern) => {
                    for segment in dash_segments(&points, pattern) {
                        stroke_path(window, &segment, *width, *color);
                    }
                }
                None => stroke_path(window, &points, *width, *color),
            }
        }
        DrawCommand::Marker {
            center,
            radius,
            shape,
            color,
        } => {
            let c = offset_point(*center, origin);
            let rect = Bounds::new(
                point(c.x - *radius, c.y - *radius),
                size(*radius * 2.0, *radius * 2.0),
            );
            match shape {
                MarkerShape::Circle => {
                    window.paint_quad(gpui::fill(rect, *color).corner_radii(Corners::all(*radius)))
                }
                MarkerShape::Square => window.paint_quad(gpui::fill(rect, *color)),
            }
        }
        DrawCommand::Text {
            origin: text_origin,
            text,
            color,
            size,
            anchor,
        } => paint_text(
            window,
            cx,
            offset_point(*text_origin, origin),
            text,
            *color,
            *size,
            *anchor,
        ),
        DrawCommand::Image { bounds, image } => {
            if let Err(err) = window.paint_image(
                offset_bounds(*bounds, origin),
                Corners::default(),
                image.clone(),
                0,
                false,
            ) {
                warn!(error = %err, "failed to paint image");
            }
        }
    }
}

/// Replays every item in layer order, masking clipped items to their bounds.
pub fn paint_display_list(
    list: &DisplayList,
    origin: Point<Pixels>,
    window: &mut Window,
    cx: &mut App,
) {
    for item in list.in_paint_order() {
        match item.clip {
            Some(clip) => {
                let mask = ContentMask {
                    bounds: offset_bounds(clip, origin),
                };
                window.with_content_mask(Some(mask), |window| {
                    paint_command(window, cx, &item.command, origin)
                });
            }
            None => paint_command(window, cx, &item.command, origin),
        }
    }
}
