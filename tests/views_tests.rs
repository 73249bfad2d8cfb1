use glam::Vec2;
use gpui::{point, px, size, Bounds};
use gpui_timescroll::colors::palette_color;
use gpui_timescroll::data_types::Annotation;
use gpui_timescroll::error::ValidationError;
use gpui_timescroll::rendering::{DrawCommand, Layer, MarkerShape};
use gpui_timescroll::scroll_view::ScrollRenderer;
use gpui_timescroll::selection_store::TimeseriesSelectionStore;
use gpui_timescroll::views::annotated_video::{VideoLayout, WheelZoom};
use gpui_timescroll::views::timeseries_graph::SeriesStyle;
use gpui_timescroll::views::{
    load_view, FiringRatesView, LoadedView, SpectrogramView, TimeseriesGraphView, UnitId, ViewData,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn graph_payload() -> serde_json::Value {
    json!({
        "type": "figneuro.TimeseriesGraph",
        "datasets": [
            {"name": "d", "data": {"t": [0, 1, 2, 3], "v": [1, 5, 3, 2]}}
        ],
        "series": [
            {
                "type": "line",
                "dataset": "d",
                "title": "voltage",
                "encoding": {"t": "t", "y": "v"},
                "attributes": {"color": "#ff0000", "width": 2}
            },
            {
                "type": "marker",
                "dataset": "d",
                "encoding": {"t": "t", "y": "v"},
                "attributes": {"shape": "square"}
            }
        ],
        "timeOffset": 10
    })
}

fn loaded(value: &serde_json::Value) -> ViewData {
    match load_view(value) {
        LoadedView::View(data) => data,
        other => panic!("payload rejected: {other:?}"),
    }
}

#[test]
fn test_unknown_type_gives_placeholder() {
    let loaded = load_view(&json!({"type": "foo", "x": 1}));
    assert!(!loaded.is_valid());
    assert_eq!(loaded.placeholder_text().as_deref(), Some("Invalid view data: foo"));
    assert!(matches!(
        loaded,
        LoadedView::Invalid {
            error: ValidationError::UnknownType { .. },
            ..
        }
    ));
}

#[test]
fn test_malformed_payload_is_rejected() {
    let value = json!({"type": "saneslab.FiringRatesPlot", "startTimeSec": "soon"});
    match ViewData::from_value(&value) {
        Err(ValidationError::Malformed { type_tag, .. }) => {
            assert_eq!(type_tag, "saneslab.FiringRatesPlot")
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        load_view(&value).placeholder_text().as_deref(),
        Some("Invalid view data: saneslab.FiringRatesPlot")
    );
}

#[test]
fn test_inconsistent_payloads_are_rejected() {
    let mut graph = graph_payload();
    graph["series"][0]["dataset"] = json!("missing");
    assert!(matches!(
        ViewData::from_value(&graph),
        Err(ValidationError::Inconsistent { .. })
    ));

    let spectrogram = json!({
        "type": "saneslab.SparseAudioSpectrogram",
        "numFrequencies": 2,
        "numTimepoints": 3,
        "samplingFrequency": 10,
        "spectrogramValues": [1, 2],
        "spectrogramIndicesDelta": [0]
    });
    assert!(matches!(
        ViewData::from_value(&spectrogram),
        Err(ValidationError::Inconsistent { .. })
    ));

    let rates = json!({
        "type": "saneslab.FiringRatesPlot",
        "startTimeSec": 5,
        "endTimeSec": 1,
        "plots": []
    });
    assert!(!load_view(&rates).is_valid());
}

#[test]
fn test_oversized_payloads_are_rejected() {
    let spectrogram = json!({
        "type": "saneslab.SparseAudioSpectrogram",
        "numFrequencies": 100000000u64,
        "numTimepoints": 100000000u64,
        "samplingFrequency": 10,
        "spectrogramValues": [1],
        "spectrogramIndicesDelta": [0]
    });
    assert!(matches!(
        ViewData::from_value(&spectrogram),
        Err(ValidationError::Inconsistent { .. })
    ));

    let rates = json!({
        "type": "saneslab.FiringRatesPlot",
        "startTimeSec": 0,
        "endTimeSec": 1e12,
        "plots": [{"unitId": 1, "spikeTimesSec": [0.5]}]
    });
    assert!(matches!(
        ViewData::from_value(&rates),
        Err(ValidationError::Inconsistent { .. })
    ));
    assert!(!load_view(&rates).is_valid());
}

#[test]
fn test_graph_resolves_series() {
    let ViewData::TimeseriesGraph(data) = loaded(&graph_payload()) else {
        panic!("wrong view type");
    };
    let graph = TimeseriesGraphView::new(&data);
    let series = graph.series();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].t, vec![10.0, 11.0, 12.0, 13.0]);
    assert_eq!(series[0].style, SeriesStyle::Line { width: 2.0, dash: None });
    assert_eq!(
        series[1].style,
        SeriesStyle::Marker {
            radius: 2.0,
            shape: MarkerShape::Square,
        }
    );
    assert_eq!(series[1].color, palette_color(1));
    assert_eq!(graph.y_range(), (1.0, 5.0));
    assert_eq!(graph.data_bounds(), Some((0.0, 3.0)));

    let store = TimeseriesSelectionStore::new();
    assert!(graph.initialize(&store));
    assert_eq!(store.snapshot().timeseries_bounds(), Some((10.0, 13.0)));
}

#[test]
fn test_graph_paints_lines_and_markers() {
    let ViewData::TimeseriesGraph(data) = loaded(&graph_payload()) else {
        panic!("wrong view type");
    };
    let graph = TimeseriesGraphView::new(&data);
    let store = TimeseriesSelectionStore::new();
    graph.initialize(&store);

    let view = graph.scroll_view(600.0, 300.0);
    let mut renderer = ScrollRenderer::default();
    let frame = renderer.render(&view, &store.snapshot(), &Arc::new(Vec::<Annotation>::new()));
    let main: Vec<_> = frame.display_list().layer(Layer::Main).collect();
    let lines = main
        .iter()
        .filter(|item| matches!(item.command, DrawCommand::Polyline { .. }))
        .count();
    let markers = main
        .iter()
        .filter(|item| matches!(item.command, DrawCommand::Marker { .. }))
        .count();
    assert_eq!((lines, markers), (1, 4));
    // y axis labels carry the data range.
    assert!(frame.display_list().texts().contains(&"5"));
}

#[test]
fn test_firing_rates_view() {
    let value = json!({
        "type": "saneslab.FiringRatesPlot",
        "startTimeSec": 0,
        "endTimeSec": 1,
        "plots": [
            {"unitId": "u12", "spikeTimesSec": [0.05, 0.15]},
            {"unitId": 3, "spikeTimesSec": [0.95]}
        ]
    });
    let ViewData::FiringRatesPlot(data) = loaded(&value) else {
        panic!("wrong view type");
    };
    assert_eq!(data.num_bins(), 10);

    let rates = FiringRatesView::new(&data);
    let ids: Vec<&UnitId> = rates.unit_ids().collect();
    assert_eq!(ids, vec![&UnitId::Number(3), &UnitId::Name("u12".into())]);

    let counts = rates.counts(&UnitId::Name("u12".into())).unwrap();
    assert_eq!(counts.len(), 10);
    assert!((counts[0] - 1.0).abs() < 1e-12);
    assert!((counts[1] - 2.0 / 3.0).abs() < 1e-12);
    assert!((counts[2] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(counts[5], 0.0);

    let store = TimeseriesSelectionStore::new();
    assert!(rates.initialize(&store));
    assert_eq!(store.snapshot().timeseries_bounds(), Some((0.0, 1.0)));

    let selected: HashSet<UnitId> = [UnitId::Number(3)].into_iter().collect();
    let view = rates.scroll_view(500.0, 300.0, &selected, Default::default());
    let keys: Vec<&str> = view.panels.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["3", "u12"]);
    assert!(view.selected_panel_keys.contains("3"));
    assert!(!view.selected_panel_keys.contains("u12"));
}

#[test]
fn test_spectrogram_spans_its_duration() {
    let value = json!({
        "type": "saneslab.SparseAudioSpectrogram",
        "numFrequencies": 2,
        "numTimepoints": 3,
        "samplingFrequency": 10,
        "spectrogramValues": [2, 4],
        "spectrogramIndicesDelta": [0, 5]
    });
    let ViewData::SparseAudioSpectrogram(data) = loaded(&value) else {
        panic!("wrong view type");
    };
    let spectrogram = SpectrogramView::new(&data);
    assert_eq!(spectrogram.matrix().get(0, 0), 0.5);
    assert_eq!(spectrogram.matrix().get(2, 1), 1.0);

    let store = TimeseriesSelectionStore::new();
    assert!(spectrogram.initialize(&store));
    assert_eq!(store.snapshot().timeseries_bounds(), Some((0.0, 0.3)));
}

#[test]
fn test_video_layout_letterboxes() {
    let layout = VideoLayout::fit(790.0, 520.0, 640.0, 480.0, true);
    assert_eq!(
        layout.video,
        Bounds::new(point(px(0.0), px(0.0)), size(px(640.0), px(480.0)))
    );
    assert_eq!(layout.legend.origin, point(px(640.0), px(0.0)));
    assert_eq!(layout.legend.size.width, px(150.0));
    assert_eq!(
        layout.bottom_bar,
        Bounds::new(point(px(0.0), px(480.0)), size(px(790.0), px(40.0)))
    );
    assert_eq!(layout.scale, (1.0, 1.0));

    let layout = VideoLayout::fit(400.0, 440.0, 640.0, 480.0, false);
    assert_eq!(
        layout.video,
        Bounds::new(point(px(0.0), px(50.0)), size(px(400.0), px(300.0)))
    );
    assert_eq!(layout.legend.size.width, px(0.0));
    assert_eq!(layout.scale, (0.625, 0.625));
}

#[test]
fn test_wheel_zoom_keeps_anchor_fixed() {
    let mut zoom = WheelZoom::default();
    let anchor = Vec2::new(100.0, 50.0);
    zoom.handle_wheel(-1.0, anchor);
    assert!((zoom.scale() - 1.1).abs() < 1e-6);
    assert!((zoom.apply(anchor) - anchor).length() < 1e-4);

    zoom.handle_wheel(3.0, anchor);
    assert!((zoom.scale() - 1.0).abs() < 1e-5);
    zoom.handle_wheel(3.0, anchor);
    assert_eq!(zoom.scale(), 1.0);
}
