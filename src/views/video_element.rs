use super::annotated_video::AnnotatedVideoView;
use crate::media::{Delivery, FrameSource};
use crate::playback::PlaybackStatus;
use crate::scroll_view::element::paint_display_list;
use crate::selection_model::SelectionModel;
use glam::Vec2;
use gpui::prelude::*;
use gpui::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// Interactive GPUI view for [`AnnotatedVideoView`]: wheel zoom over the
/// frame, click on the bottom bar to toggle playback.
pub struct AnnotatedVideoElement {
    view: AnnotatedVideoView,
    selection: Entity<SelectionModel>,
    source: Option<Arc<dyn FrameSource>>,
    width: f32,
    height: f32,
    origin: Rc<RefCell<Point<Pixels>>>,
}

impl AnnotatedVideoElement {
    pub fn new(
        view: AnnotatedVideoView,
        selection: Entity<SelectionModel>,
        source: Option<Arc<dyn FrameSource>>,
        width: f32,
        height: f32,
        cx: &mut Context<Self>,
    ) -> Self {
        cx.observe(&selection, |this, _, cx| {
            this.request_current_frame(cx);
            cx.notify();
        })
        .detach();
        selection.update(cx, |model, cx| {
            view.initialize(&model.store);
            model.sync(cx);
        });
        let mut this = Self {
            view,
            selection,
            source,
            width,
            height,
            origin: Rc::new(RefCell::new(Point::default())),
        };
        this.request_current_frame(cx);
        this
    }

    /// Fetches the frame under the focus time on the background executor.
    /// Results for superseded requests are dropped on delivery.
    fn request_current_frame(&mut self, cx: &mut Context<Self>) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let Some(time) = self.selection.read(cx).snapshot().current_time() else {
            return;
        };
        let Some(request) = self.view.request_frame(time) else {
            return;
        };
        let worker_request = request.clone();
        let fetch = cx
            .background_executor()
            .spawn(async move { worker_request.fetch(source.as_ref()) });
        cx.spawn(async move |this, cx| {
            let result = fetch.await;
            let _ = this.update(cx, |this, cx| {
                let frame_index = request.frame_index;
                if this.view.deliver_frame(request, result) == Delivery::Accepted {
                    cx.notify();
                } else {
                    trace!(frame_index, "frame superseded before delivery");
                }
            });
        })
        .detach();
    }

    pub fn view(&self) -> &AnnotatedVideoView {
        &self.view
    }

    fn toggle_playback(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.view.is_playing() {
            self.view.stop();
        } else {
            let store = self.selection.read(cx).store.clone();
            if self.view.play(&store, Instant::now()) {
                cx.on_next_frame(window, |this, window, cx| this.advance_playback(window, cx));
            }
        }
        cx.notify();
    }

    /// Publishes store changes made outside this element; a moved focus
    /// fetches its frame.
    pub fn sync_selection(&mut self, cx: &mut Context<Self>) {
        self.selection.update(cx, |model, cx| model.sync(cx));
    }

    fn advance_playback(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let status = self.view.tick(Instant::now());
        self.sync_selection(cx);
        if status == PlaybackStatus::Playing {
            cx.on_next_frame(window, |this, window, cx| this.advance_playback(window, cx));
        }
        cx.notify();
    }

    fn on_mouse_down(&mut self, event: &MouseDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        let origin = *self.origin.borrow();
        let layout = self.view.layout(self.width, self.height);
        let local = point(event.position.x - origin.x, event.position.y - origin.y);
        if layout.bottom_bar.contains(&local) {
            self.toggle_playback(window, cx);
        }
    }

    fn on_scroll_wheel(&mut self, event: &ScrollWheelEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let origin = *self.origin.borrow();
        let video = self.view.layout(self.width, self.height).video;
        let local = point(event.position.x - origin.x, event.position.y - origin.y);
        if !video.contains(&local) {
            return;
        }
        let delta_y = match event.delta {
            ScrollDelta::Pixels(p) => f32::from(p.y),
            ScrollDelta::Lines(p) => p.y * 20.0,
        };
        let anchor = Vec2::new(
            f32::from(local.x - video.origin.x),
            f32::from(local.y - video.origin.y),
        );
        self.view.zoom.handle_wheel(delta_y, anchor);
        cx.stop_propagation();
        cx.notify();
    }
}

impl Render for AnnotatedVideoElement {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let time = self.selection.read(cx).snapshot().current_time();
        let list = self.view.render(self.width, self.height, time);
        let origin_rc = self.origin.clone();

        div()
            .id(("annotated-video", cx.entity_id()))
            .relative()
            .w(px(self.width))
            .h(px(self.height))
            .overflow_hidden()
            .on_mouse_down(MouseButton::Left, cx.listener(Self::on_mouse_down))
            .on_scroll_wheel(cx.listener(Self::on_scroll_wheel))
            .child(
                canvas(
                    move |bounds, _, _| {
                        *origin_rc.borrow_mut() = bounds.origin;
                    },
                    move |bounds, (), window, cx| {
                        paint_display_list(&list, bounds.origin, window, cx);
                    },
                )
                .absolute()
                .size_full(),
            )
    }
}
