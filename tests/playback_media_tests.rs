use gpui::{point, px, size, Bounds};
use gpui_timescroll::media::{Delivery, FrameContent, FrameSlot, FrameSource, RequestGuard, VideoFrame};
use gpui_timescroll::playback::{PlaybackStatus, PlaybackTask};
use gpui_timescroll::rendering::{DrawCommand, Layer};
use gpui_timescroll::selection_store::TimeseriesSelectionStore;
use gpui_timescroll::views::{AnnotatedVideoData, AnnotatedVideoView};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

struct FakeSource {
    fail_on: Option<u32>,
    fetched: Mutex<Vec<u32>>,
}

impl FakeSource {
    fn new(fail_on: Option<u32>) -> Self {
        Self {
            fail_on,
            fetched: Mutex::new(Vec::new()),
        }
    }
}

impl FrameSource for FakeSource {
    fn fetch_frame(&self, _uri: &str, frame_index: u32) -> eyre::Result<VideoFrame> {
        self.fetched.lock().push(frame_index);
        if self.fail_on == Some(frame_index) {
            eyre::bail!("decoder error");
        }
        VideoFrame::new(frame_index, 1, 1, vec![255; 4])
    }
}

fn video_data() -> AnnotatedVideoData {
    AnnotatedVideoData {
        video_uri: Some("sha1://video".into()),
        video_width: 640.0,
        video_height: 480.0,
        video_num_frames: 300.0,
        sampling_frequency: 30.0,
        annotations_uri: None,
        nodes: None,
    }
}

#[test]
fn test_playback_tick_autoscrolls_window() {
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 100.0);
    store.set_visible_range(0.0, 10.0);
    store.set_time_focus(5.0, false);

    let t0 = Instant::now();
    let (task, _handle) = PlaybackTask::start(&store, 2.0, t0).unwrap();
    assert_eq!(task.tick(t0 + Duration::from_secs(10)), PlaybackStatus::Playing);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.current_time(), Some(25.0));
    assert_eq!(snapshot.visible_window(), Some((20.0, 30.0)));
}

#[test]
fn test_playback_needs_initialized_selection() {
    let store = TimeseriesSelectionStore::new();
    assert!(PlaybackTask::start(&store, 1.0, Instant::now()).is_none());
}

#[test]
fn test_dropping_handle_stops_playback() {
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 100.0);
    let t0 = Instant::now();
    let (task, handle) = PlaybackTask::start(&store, 1.0, t0).unwrap();
    drop(handle);
    assert_eq!(task.tick(t0 + Duration::from_secs(1)), PlaybackStatus::Stopped);
    assert_eq!(store.snapshot().current_time(), None);
}

#[test]
fn test_playback_stops_when_store_is_gone() {
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 100.0);
    let t0 = Instant::now();
    let (task, _handle) = PlaybackTask::start(&store, 1.0, t0).unwrap();
    drop(store);
    assert_eq!(task.tick(t0 + Duration::from_secs(1)), PlaybackStatus::Stopped);
}

#[test]
fn test_playback_clamps_at_end() {
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    store.set_time_focus(8.0, false);
    let t0 = Instant::now();
    let (task, handle) = PlaybackTask::start(&store, 1.0, t0).unwrap();

    assert_eq!(task.tick(t0 + Duration::from_secs(5)), PlaybackStatus::Stopped);
    assert_eq!(store.snapshot().current_time(), Some(10.0));
    assert!(handle.is_cancelled());
    assert_eq!(task.tick(t0 + Duration::from_secs(6)), PlaybackStatus::Stopped);
}

#[test]
fn test_stale_frame_result_is_discarded() {
    let mut slot = FrameSlot::new(RequestGuard::new());
    let first = slot.request(1).unwrap();
    let second = slot.request(2).unwrap();

    let late = VideoFrame::new(1, 1, 1, vec![0; 4]).unwrap();
    assert_eq!(slot.deliver(first, 1, Ok(late)), Delivery::Stale);
    assert_eq!(slot.content(), &FrameContent::Empty);

    let fresh = VideoFrame::new(2, 1, 1, vec![0; 4]).unwrap();
    assert_eq!(slot.deliver(second, 2, Ok(fresh.clone())), Delivery::Accepted);
    assert_eq!(slot.content(), &FrameContent::Frame(fresh));
}

#[test]
fn test_teardown_rejects_inflight_results() {
    let guard = RequestGuard::new();
    let mut slot = FrameSlot::new(guard.clone());
    let ticket = slot.request(0).unwrap();
    guard.tear_down();

    let frame = VideoFrame::new(0, 1, 1, vec![0; 4]).unwrap();
    assert_eq!(slot.deliver(ticket, 0, Ok(frame)), Delivery::Stale);
    assert!(slot.request(5).is_none());
    assert!(slot.guard().is_torn_down());
}

#[test]
fn test_fetch_failure_becomes_placeholder() {
    let source = FakeSource::new(Some(3));
    let mut slot = FrameSlot::default();
    assert_eq!(slot.load(&source, "sha1://video", 3), Delivery::Accepted);
    match slot.content() {
        FrameContent::Placeholder { frame_index, message } => {
            assert_eq!(*frame_index, 3);
            assert!(message.contains("decoder error"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_failed_frame_is_fetched_again() {
    let source = FakeSource::new(Some(3));
    let mut slot = FrameSlot::default();
    assert_eq!(slot.load(&source, "sha1://video", 3), Delivery::Accepted);
    assert_eq!(slot.load(&source, "sha1://video", 3), Delivery::Accepted);
    assert_eq!(*source.fetched.lock(), vec![3, 3]);
    assert!(matches!(slot.content(), FrameContent::Placeholder { frame_index: 3, .. }));
}

#[test]
fn test_superseded_request_is_dropped_on_finish() {
    let source = FakeSource::new(None);
    let mut slot = FrameSlot::default();
    let first = slot.begin("sha1://video", 1).unwrap();
    let second = slot.begin("sha1://video", 2).unwrap();
    assert!(slot.begin("sha1://video", 2).is_none());

    let second_result = second.fetch(&source);
    let first_result = first.fetch(&source);
    assert_eq!(slot.finish(second, second_result), Delivery::Accepted);
    assert_eq!(slot.finish(first, first_result), Delivery::Stale);
    assert!(matches!(slot.content(), FrameContent::Frame(f) if f.frame_index == 2));
}

#[test]
fn test_delivered_frame_is_painted_through_zoom() {
    let source = FakeSource::new(None);
    let mut view = AnnotatedVideoView::new(video_data());
    let images = |view: &AnnotatedVideoView| -> Vec<Bounds<gpui::Pixels>> {
        view.render(640.0, 520.0, Some(1.0))
            .layer(Layer::Main)
            .filter_map(|item| match &item.command {
                DrawCommand::Image { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .collect()
    };
    assert!(images(&view).is_empty());

    view.load_frame(&source, 1.0);
    let video = Bounds::new(point(px(0.0), px(0.0)), size(px(640.0), px(480.0)));
    assert_eq!(images(&view), vec![video]);

    view.zoom.handle_wheel(-1.0, glam::Vec2::ZERO);
    let zoomed = images(&view);
    assert_eq!(zoomed.len(), 1);
    assert_eq!(zoomed[0].origin, point(px(0.0), px(0.0)));
    assert!((f32::from(zoomed[0].size.width) - 704.0).abs() < 1e-2);
}

#[test]
fn test_video_view_loads_frame_for_focus_time() {
    let source = FakeSource::new(None);
    let mut view = AnnotatedVideoView::new(video_data());
    assert_eq!(view.duration_sec(), 10.0);
    assert_eq!(view.frame_index(1.0), 30);
    assert_eq!(view.frame_index(100.0), 299);
    assert_eq!(view.frame_index(-1.0), 0);

    assert_eq!(view.load_frame(&source, 1.0), Some(Delivery::Accepted));
    // Same frame again: no second fetch.
    assert_eq!(view.load_frame(&source, 1.01), Some(Delivery::Stale));
    assert_eq!(*source.fetched.lock(), vec![30]);
    assert!(matches!(view.frame(), FrameContent::Frame(f) if f.frame_index == 30));
}

#[test]
fn test_video_view_playback_controls() {
    let store = TimeseriesSelectionStore::new();
    let mut view = AnnotatedVideoView::new(video_data());
    view.initialize(&store);
    assert_eq!(store.snapshot().timeseries_bounds(), Some((0.0, 10.0)));
    assert_eq!(store.snapshot().current_time(), Some(0.0));

    assert!(view.set_rate(2.0));
    assert!(!view.set_rate(3.0));
    assert_eq!(view.rate(), 2.0);

    let t0 = Instant::now();
    assert!(view.play(&store, t0));
    assert!(view.is_playing());
    assert!(!view.set_rate(4.0));
    assert_eq!(view.tick(t0 + Duration::from_secs(2)), PlaybackStatus::Playing);
    assert_eq!(store.snapshot().current_time(), Some(4.0));

    view.stop();
    assert!(!view.is_playing());
    assert_eq!(view.tick(t0 + Duration::from_secs(3)), PlaybackStatus::Stopped);
    assert_eq!(store.snapshot().current_time(), Some(4.0));

    view.tear_down();
    assert!(view.frame_guard().is_torn_down());
}
