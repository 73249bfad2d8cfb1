//! Video frames synchronised to the shared time focus.

use crate::colors::palette_color;
use crate::media::{
    Delivery, FrameContent, FrameRequest, FrameSlot, FrameSource, RequestGuard, VideoFrame,
};
use crate::playback::{PlaybackHandle, PlaybackStatus, PlaybackTask, PLAYBACK_RATES};
use crate::rendering::{DisplayList, DrawCommand, Layer, MarkerShape, TextAnchor};
use crate::selection_store::TimeseriesSelectionStore;
use crate::utils::time_format::{determine_time_format, format_time_label};
use glam::{Affine2, Vec2};
use gpui::{point, px, size, Bounds, Hsla, Pixels};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};

pub const LEGEND_WIDTH: f32 = 150.0;
pub const BOTTOM_BAR_HEIGHT: f32 = 40.0;
/// Scale change per wheel notch.
pub const WHEEL_ZOOM_STEP: f32 = 1.1;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedVideoNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedVideoData {
    #[serde(default)]
    pub video_uri: Option<String>,
    pub video_width: f64,
    pub video_height: f64,
    pub video_num_frames: f64,
    pub sampling_frequency: f64,
    #[serde(default)]
    pub annotations_uri: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<AnnotatedVideoNode>>,
}

impl AnnotatedVideoData {
    pub(crate) fn check(&self) -> Result<(), String> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.video_width) || !positive(self.video_height) {
            return Err(format!(
                "video size must be positive, got {}x{}",
                self.video_width, self.video_height
            ));
        }
        if !positive(self.sampling_frequency) {
            return Err(format!(
                "samplingFrequency must be positive, got {}",
                self.sampling_frequency
            ));
        }
        if !self.video_num_frames.is_finite() || self.video_num_frames < 0.0 {
            return Err(format!("invalid videoNumFrames {}", self.video_num_frames));
        }
        Ok(())
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Bounds<Pixels> {
    Bounds::new(point(px(x), px(y)), size(px(w.max(0.0)), px(h.max(0.0))))
}

/// Placement of the letterboxed video, the node legend and the bottom bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoLayout {
    pub video: Bounds<Pixels>,
    pub legend: Bounds<Pixels>,
    pub bottom_bar: Bounds<Pixels>,
    /// Video pixels to screen pixels along x and y.
    pub scale: (f32, f32),
}

impl VideoLayout {
    pub fn fit(width: f32, height: f32, video_width: f32, video_height: f32, has_legend: bool) -> Self {
        let area_h = (height - BOTTOM_BAR_HEIGHT).max(0.0);
        let legend_w = if has_legend { LEGEND_WIDTH } else { 0.0 };
        let area_w = (width - legend_w).max(0.0);

        // Height-limited when the video is relatively taller than the area.
        let (w, h) = if video_width * area_h < video_height * area_w {
            (video_width * area_h / video_height, area_h)
        } else {
            (area_w, video_height * area_w / video_width)
        };
        let x = (area_w - w) / 2.0;
        let y = (area_h - h) / 2.0;
        Self {
            video: rect(x, y, w, h),
            legend: rect(x + w, y, legend_w, h),
            bottom_bar: rect(0.0, area_h, width, BOTTOM_BAR_HEIGHT),
            scale: (w / video_width, h / video_height),
        }
    }
}

/// Wheel zoom about the pointer, never zooming out past the unscaled view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelZoom {
    pub transform: Affine2,
}

impl Default for WheelZoom {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
        }
    }
}

impl WheelZoom {
    /// `anchor` is in video-rect local pixels. Negative `delta_y` zooms in.
    pub fn handle_wheel(&mut self, delta_y: f32, anchor: Vec2) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            1.0 / WHEEL_ZOOM_STEP
        };
        let step = Affine2::from_translation(anchor)
            * Affine2::from_scale(Vec2::splat(factor))
            * Affine2::from_translation(-anchor);
        let next = step * self.transform;
        if next.matrix2.x_axis.x <= 1.0 {
            self.transform = Affine2::IDENTITY;
        } else {
            self.transform = next;
        }
    }

    pub fn scale(&self) -> f32 {
        self.transform.matrix2.x_axis.x
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.transform.transform_point2(p)
    }

    pub fn reset(&mut self) {
        self.transform = Affine2::IDENTITY;
    }
}

struct ActivePlayback {
    task: PlaybackTask,
    _handle: PlaybackHandle,
}

pub struct AnnotatedVideoView {
    data: AnnotatedVideoData,
    node_colors: Vec<(AnnotatedVideoNode, Hsla)>,
    pub zoom: WheelZoom,
    frames: FrameSlot,
    rate: f64,
    playback: Option<ActivePlayback>,
}

impl AnnotatedVideoView {
    pub fn new(data: AnnotatedVideoData) -> Self {
        let node_colors = data
            .nodes
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, node)| (node.clone(), palette_color(node.color_index.unwrap_or(i))))
            .collect();
        Self {
            data,
            node_colors,
            zoom: WheelZoom::default(),
            frames: FrameSlot::new(RequestGuard::new()),
            rate: 1.0,
            playback: None,
        }
    }

    pub fn data(&self) -> &AnnotatedVideoData {
        &self.data
    }

    pub fn node_colors(&self) -> &[(AnnotatedVideoNode, Hsla)] {
        &self.node_colors
    }

    pub fn duration_sec(&self) -> f64 {
        self.data.video_num_frames / self.data.sampling_frequency
    }

    /// Spans the selection over the whole video and focuses time zero if
    /// nothing is focused yet.
    pub fn initialize(&self, store: &TimeseriesSelectionStore) {
        store.initialize(0.0, self.duration_sec());
        if store.snapshot().current_time().is_none() {
            store.set_time_focus(0.0, false);
        }
    }

    pub fn layout(&self, width: f32, height: f32) -> VideoLayout {
        VideoLayout::fit(
            width,
            height,
            self.data.video_width as f32,
            self.data.video_height as f32,
            self.data.nodes.is_some(),
        )
    }

    pub fn frame_index(&self, time: f64) -> u32 {
        let last = (self.data.video_num_frames - 1.0).max(0.0);
        (time * self.data.sampling_frequency).round().clamp(0.0, last) as u32
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Changes the playback rate. Ignored while playing or for rates not
    /// offered by the control.
    pub fn set_rate(&mut self, rate: f64) -> bool {
        if self.is_playing() || !PLAYBACK_RATES.contains(&rate) {
            warn!(rate, "playback rate change ignored");
            return false;
        }
        self.rate = rate;
        true
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn play(&mut self, store: &TimeseriesSelectionStore, now: Instant) -> bool {
        if self.is_playing() {
            return false;
        }
        match PlaybackTask::start(store, self.rate, now) {
            Some((task, handle)) => {
                self.playback = Some(ActivePlayback {
                    task,
                    _handle: handle,
                });
                true
            }
            None => false,
        }
    }

    pub fn stop(&mut self) {
        if self.playback.take().is_some() {
            debug!("playback stopped");
        }
    }

    /// Advances playback; call once per frame while playing.
    pub fn tick(&mut self, now: Instant) -> PlaybackStatus {
        let Some(active) = &self.playback else {
            return PlaybackStatus::Stopped;
        };
        let status = active.task.tick(now);
        if status == PlaybackStatus::Stopped {
            self.playback = None;
        }
        status
    }

    pub fn frame(&self) -> &FrameContent {
        self.frames.content()
    }

    /// Fetches the frame for `time` unless it is already the latest request.
    pub fn load_frame(&mut self, source: &dyn FrameSource, time: f64) -> Option<Delivery> {
        let uri = self.data.video_uri.clone()?;
        let index = self.frame_index(time);
        Some(self.frames.load(source, &uri, index))
    }

    /// Starts an asynchronous fetch of the frame for `time`; `None` when there
    /// is no video or the frame is already on its way.
    pub fn request_frame(&mut self, time: f64) -> Option<FrameRequest> {
        let index = self.frame_index(time);
        let uri = self.data.video_uri.as_deref()?;
        self.frames.begin(uri, index)
    }

    pub fn deliver_frame(
        &mut self,
        request: FrameRequest,
        result: eyre::Result<VideoFrame>,
    ) -> Delivery {
        self.frames.finish(request, result)
    }

    /// Drops every in-flight frame request; call when the view goes away.
    pub fn tear_down(&mut self) {
        self.stop();
        self.frames.guard().tear_down();
    }

    pub fn frame_guard(&self) -> &RequestGuard {
        self.frames.guard()
    }

    pub fn frame_slot_mut(&mut self) -> &mut FrameSlot {
        &mut self.frames
    }

    /// Frame, legend and playback bar for the current focus time.
    pub fn render(&self, width: f32, height: f32, current_time: Option<f64>) -> DisplayList {
        let layout = self.layout(width, height);
        let mut list = DisplayList::new();
        let dark = gpui::black();

        let video = layout.video;
        let (x0, y0) = (f32::from(video.origin.x), f32::from(video.origin.y));
        let (w, h) = (f32::from(video.size.width), f32::from(video.size.height));
        let tl = self.zoom.apply(Vec2::ZERO);
        let br = self.zoom.apply(Vec2::new(w, h));
        let zoomed = rect(x0 + tl.x, y0 + tl.y, br.x - tl.x, br.y - tl.y);
        list.push(
            Layer::Main,
            Some(video),
            DrawCommand::FillRect {
                bounds: zoomed,
                color: dark.alpha(0.9),
            },
        );
        match self.frame() {
            FrameContent::Frame(frame) => list.push(
                Layer::Main,
                Some(video),
                DrawCommand::Image {
                    bounds: zoomed,
                    image: frame.image.clone(),
                },
            ),
            FrameContent::Placeholder { frame_index, .. } => list.push(
                Layer::Main,
                Some(video),
                DrawCommand::Text {
                    origin: point(px(x0 + w / 2.0), px(y0 + h / 2.0)),
                    text: format!("Frame {frame_index} unavailable"),
                    color: gpui::white(),
                    size: px(12.0),
                    anchor: TextAnchor::Middle,
                },
            ),
            FrameContent::Empty => {}
        }

        let lx = f32::from(layout.legend.origin.x) + 15.0;
        let ly = f32::from(layout.legend.origin.y) + 15.0;
        for (i, (node, color)) in self.node_colors.iter().enumerate() {
            let y = ly + i as f32 * 18.0;
            list.push(
                Layer::Annotations,
                None,
                DrawCommand::Marker {
                    center: point(px(lx + 4.0), px(y)),
                    radius: px(4.0),
                    shape: MarkerShape::Circle,
                    color: *color,
                },
            );
            list.push(
                Layer::Annotations,
                None,
                DrawCommand::Text {
                    origin: point(px(lx + 14.0), px(y)),
                    text: node.label.clone(),
                    color: dark,
                    size: px(12.0),
                    anchor: TextAnchor::Start,
                },
            );
        }

        let bar = layout.bottom_bar;
        let bar_y = f32::from(bar.origin.y) + BOTTOM_BAR_HEIGHT / 2.0;
        let time = current_time.unwrap_or(0.0);
        let label_format = determine_time_format(0.01);
        let status = format!(
            "{} {}x  {} / {}  frame {}",
            if self.is_playing() { "■" } else { "▶" },
            self.rate,
            format_time_label(time, label_format),
            format_time_label(self.duration_sec(), label_format),
            self.frame_index(time)
        );
        list.push(
            Layer::Axes,
            Some(bar),
            DrawCommand::Text {
                origin: point(px(10.0), px(bar_y)),
                text: status,
                color: dark,
                size: px(12.0),
                anchor: TextAnchor::Start,
            },
        );
        list
    }
}

impl Drop for AnnotatedVideoView {
    fn drop(&mut self) {
        self.tear_down();
    }
}
