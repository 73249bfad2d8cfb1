use gpui::{AppContext, TestAppContext};
use gpui_timescroll::config::ScrollViewConfig;
use gpui_timescroll::data_types::{SelectionAction, ZoomDirection};
use gpui_timescroll::host::{FigureHost, HostParams, HostState};
use gpui_timescroll::media::{FrameContent, FrameSource, VideoFrame};
use gpui_timescroll::selection_model::SelectionModel;
use gpui_timescroll::selection_store::TimeseriesSelectionStore;
use gpui_timescroll::views::video_element::AnnotatedVideoElement;
use gpui_timescroll::views::{AnnotatedVideoData, AnnotatedVideoView};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

struct SolidFrames;

impl FrameSource for SolidFrames {
    fn fetch_frame(&self, _uri: &str, frame_index: u32) -> eyre::Result<VideoFrame> {
        VideoFrame::new(frame_index, 2, 2, vec![128; 16])
    }
}

#[gpui::test]
fn test_selection_model_notifies_on_change_only(cx: &mut TestAppContext) {
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 100.0);
    let model = cx.update(|cx| cx.new(|_| SelectionModel::new(store.clone())));

    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    cx.update(|cx| {
        cx.observe(&model, move |_, _| counter.set(counter.get() + 1))
            .detach();
    });

    cx.update(|cx| {
        model.update(cx, |m, cx| {
            assert!(m.publish(
                SelectionAction::Zoom {
                    direction: ZoomDirection::In,
                    factor: Some(2.0),
                },
                cx,
            ));
        });
    });
    cx.run_until_parked();
    assert_eq!(notified.get(), 1);

    // Same window again: nothing changes.
    cx.update(|cx| {
        model.update(cx, |m, cx| {
            assert!(!m.publish(
                SelectionAction::SetVisibleRange {
                    start: 25.0,
                    end: 75.0,
                },
                cx,
            ));
        });
    });
    cx.run_until_parked();
    assert_eq!(notified.get(), 1);

    // A change made straight on the store surfaces on the next sync.
    store.set_visible_range(10.0, 20.0);
    cx.update(|cx| model.update(cx, |m, cx| m.sync(cx)));
    cx.run_until_parked();
    assert_eq!(notified.get(), 2);
    model.read_with(cx, |m, _| {
        assert_eq!(m.snapshot().visible_window(), Some((10.0, 20.0)));
    });
}

#[gpui::test]
fn test_figure_host_receives_data(cx: &mut TestAppContext) {
    let params = HostParams::from_query("?figureId=abc");
    let window = cx.add_window(|_window, cx| FigureHost::new(&params, ScrollViewConfig::default(), cx));

    window
        .update(cx, |host, _window, _cx| {
            assert_eq!(host.state(), &HostState::WaitingForData);
        })
        .unwrap();

    window
        .update(cx, |host, _window, cx| {
            host.receive(Ok(Some(serde_json::json!({"type": "Empty"}))), cx);
            assert!(matches!(host.state(), HostState::Ready(view) if view.is_valid()));
        })
        .unwrap();
}

#[gpui::test]
fn test_video_element_fetches_frames_in_background(cx: &mut TestAppContext) {
    let store = TimeseriesSelectionStore::new();
    let data = AnnotatedVideoData {
        video_uri: Some("sha1://video".into()),
        video_width: 640.0,
        video_height: 480.0,
        video_num_frames: 300.0,
        sampling_frequency: 30.0,
        annotations_uri: None,
        nodes: None,
    };
    let source: Arc<dyn FrameSource> = Arc::new(SolidFrames);
    let selection_store = store.clone();
    let window = cx.add_window(move |_window, cx| {
        let selection = cx.new(|_| SelectionModel::new(selection_store));
        AnnotatedVideoElement::new(
            AnnotatedVideoView::new(data),
            selection,
            Some(source),
            640.0,
            520.0,
            cx,
        )
    });
    cx.run_until_parked();
    window
        .update(cx, |element, _window, _cx| {
            assert!(matches!(element.view().frame(), FrameContent::Frame(f) if f.frame_index == 0));
        })
        .unwrap();

    // Moving the focus fetches the matching frame.
    store.set_time_focus(2.0, false);
    window
        .update(cx, |element, _window, cx| element.sync_selection(cx))
        .unwrap();
    cx.run_until_parked();
    window
        .update(cx, |element, _window, _cx| {
            assert!(matches!(element.view().frame(), FrameContent::Frame(f) if f.frame_index == 60));
        })
        .unwrap();
}
