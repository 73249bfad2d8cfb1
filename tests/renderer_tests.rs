use gpui::{point, px};
use gpui_timescroll::data_types::{Annotation, HighlightIntervalSet};
use gpui_timescroll::rendering::{DrawCommand, Layer, PanelCanvas};
use gpui_timescroll::scroll_view::{Panel, ScrollRenderer, TimeScrollView};
use gpui_timescroll::selection_store::TimeseriesSelectionStore;
use std::collections::HashSet;
use std::sync::Arc;

fn paint_bar(canvas: &mut PanelCanvas<'_>, n: &u32) {
    canvas.fill_rect(0.0, 0.0, 10.0, *n as f32, gpui::red());
}

fn paint_label(canvas: &mut PanelCanvas<'_>, _n: &u32) {
    // Sits on the row's bottom edge, so half the glyphs fall outside it.
    let y = canvas.height();
    canvas.text(4.0, y, "spike", gpui::black(), 12.0);
}

fn two_panel_view() -> TimeScrollView<u32> {
    let panels = vec![
        Panel::new("a", "A", 5, paint_bar),
        Panel::new("b", "B", 7, paint_bar),
    ];
    // 18 px of toolbar leave a 450 x 470 surface: two rows of 198 px.
    TimeScrollView::new(Arc::new(panels), 468.0, 470.0)
}

fn no_annotations() -> Arc<Vec<Annotation>> {
    Arc::new(Vec::new())
}

#[test]
fn test_uninitialized_selection_renders_loading() {
    let view = two_panel_view();
    let store = TimeseriesSelectionStore::new();
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &no_annotations());
    assert!(frame.is_loading());
    assert!(frame.ready().is_none());
    assert_eq!(frame.display_list().texts(), vec!["Loading..."]);
}

#[test]
fn test_unchanged_inputs_reuse_frame() {
    let view = two_panel_view();
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    let annotations = no_annotations();
    let mut renderer = ScrollRenderer::default();

    let first = renderer.render(&view, &store.snapshot(), &annotations);
    let second = renderer.render(&view, &store.snapshot(), &annotations);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(renderer.render_count(), 1);

    // A rejected action publishes no new snapshot.
    store.pan_by_delta(-5.0);
    renderer.render(&view, &store.snapshot(), &annotations);
    assert_eq!(renderer.render_count(), 1);

    store.set_visible_range(2.0, 4.0);
    let third = renderer.render(&view, &store.snapshot(), &annotations);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(renderer.render_count(), 2);
    assert_eq!(third.ready().map(|f| f.visible_window), Some((2.0, 4.0)));

    renderer.invalidate();
    renderer.render(&view, &store.snapshot(), &annotations);
    assert_eq!(renderer.render_count(), 3);
}

#[test]
fn test_layers_come_out_in_paint_order() {
    let view = two_panel_view()
        .with_highlight_spans(Arc::new(vec![HighlightIntervalSet::new([(2.0, 3.0)])]));
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    store.set_time_focus(5.0, false);
    let annotations = Arc::new(vec![Annotation::Timepoint {
        id: "x".into(),
        label: "mark".into(),
        time_sec: 6.0,
    }]);

    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &annotations);
    let list = frame.display_list();
    for layer in Layer::ALL {
        assert!(list.layer(layer).next().is_some(), "{layer:?} is empty");
    }
    let layers: Vec<Layer> = list.in_paint_order().iter().map(|item| item.layer).collect();
    assert!(layers.windows(2).all(|w| w[0] <= w[1]));
    assert!(list.texts().contains(&"mark"));
}

#[test]
fn test_panel_drawing_is_local_to_its_row() {
    let view = two_panel_view();
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &no_annotations());
    let ready = frame.ready().unwrap();

    let main: Vec<_> = frame.display_list().layer(Layer::Main).collect();
    assert_eq!(main.len(), 2);
    for (index, item) in main.iter().enumerate() {
        let row = ready.layout.row_bounds(index);
        assert_eq!(item.clip, Some(row));
        match &item.command {
            DrawCommand::FillRect { bounds, .. } => assert_eq!(bounds.origin, row.origin),
            other => panic!("unexpected command {other:?}"),
        }
    }
    assert_eq!(ready.layout.row_bounds(1).origin, point(px(30.0), px(222.0)));
}

#[test]
fn test_panel_text_is_clipped_and_painted_before_cursor() {
    let panels = vec![
        Panel::new("a", "A", 0, paint_label),
        Panel::new("b", "B", 0, paint_label),
    ];
    let view = TimeScrollView::new(Arc::new(panels), 468.0, 470.0);
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    store.set_time_focus(5.0, false);
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &no_annotations());
    let ready = frame.ready().unwrap();

    let labels: Vec<_> = frame
        .display_list()
        .layer(Layer::Main)
        .filter(|item| matches!(&item.command, DrawCommand::Text { text, .. } if text == "spike"))
        .collect();
    assert_eq!(labels.len(), 2);
    for (index, item) in labels.iter().enumerate() {
        let row = ready.layout.row_bounds(index);
        assert_eq!(item.clip, Some(row));
        match &item.command {
            DrawCommand::Text { origin, .. } => {
                assert_eq!(origin.y, row.origin.y + row.size.height)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    // Text shares the paint order of every other item.
    let order = frame.display_list().in_paint_order();
    let last_text = order
        .iter()
        .rposition(|item| matches!(&item.command, DrawCommand::Text { text, .. } if text == "spike"))
        .unwrap();
    let first_cursor = order
        .iter()
        .position(|item| item.layer == Layer::Cursor)
        .unwrap();
    assert!(last_text < first_cursor);
}

#[test]
fn test_cursor_hidden_when_focus_outside_window() {
    let view = two_panel_view();
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 100.0);
    store.set_visible_range(0.0, 10.0);
    store.set_time_focus(50.0, false);
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &no_annotations());
    assert_eq!(frame.display_list().layer(Layer::Cursor).count(), 0);
}

#[test]
fn test_selected_panels_are_shaded() {
    let keys: HashSet<String> = ["b".to_string()].into_iter().collect();
    let view = two_panel_view().with_selected_panel_keys(Arc::new(keys));
    let store = TimeseriesSelectionStore::new();
    store.initialize(0.0, 10.0);
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &no_annotations());
    let row = frame.ready().unwrap().layout.row_bounds(1);
    let shaded = frame
        .display_list()
        .layer(Layer::Axes)
        .filter(|item| matches!(&item.command, DrawCommand::FillRect { bounds, .. } if *bounds == row))
        .count();
    assert_eq!(shaded, 1);
}
