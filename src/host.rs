//! Embedding bootstrap: query parameters, data arrival and the root view.

use crate::config::ScrollViewConfig;
use crate::layout::TimeseriesLayoutOpts;
use crate::media::FrameSource;
use crate::selection_model::SelectionModel;
use crate::selection_store::TimeseriesSelectionStore;
use crate::scroll_view::TimeScrollElement;
use crate::views::{
    load_view, AnnotatedVideoElement, AnnotatedVideoView, FiringRatesView, LoadedView,
    SpectrogramView, TimeseriesGraphView, ViewData,
};
use gpui::prelude::*;
use gpui::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

pub const NOT_EMBEDDED_MESSAGE: &str = "This page is not being embedded as a figurl figure.";
pub const WAITING_MESSAGE: &str = "Waiting for data";
pub const NO_DATA_MESSAGE: &str = "No data returned by getFigureData()";
pub const FETCH_ERROR_MESSAGE: &str = "Error getting figure data";

/// Border kept free around the root view.
const WINDOW_INSET: f32 = 3.0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostParams {
    pub figure_id: Option<String>,
    pub test: bool,
}

impl HostParams {
    /// Parses an embedding URL query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "figureId" if !value.is_empty() => params.figure_id = Some(value.to_string()),
                "test" => params.test = value == "1",
                _ => {}
            }
        }
        params
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostState {
    NotEmbedded,
    /// Local testing without a parent frame; nothing is loaded.
    TestMode,
    WaitingForData,
    Error(String),
    Ready(LoadedView),
}

impl HostState {
    pub fn from_params(params: &HostParams) -> Self {
        if params.figure_id.is_none() {
            Self::NotEmbedded
        } else if params.test {
            Self::TestMode
        } else {
            Self::WaitingForData
        }
    }

    /// Result of fetching the figure data. Only a state still waiting for
    /// data moves on.
    pub fn receive(self, result: eyre::Result<Option<Value>>) -> Self {
        if self != Self::WaitingForData {
            return self;
        }
        match result {
            Ok(Some(value)) => {
                let loaded = load_view(&value);
                info!(valid = loaded.is_valid(), "figure data received");
                Self::Ready(loaded)
            }
            Ok(None) => Self::Error(NO_DATA_MESSAGE.to_string()),
            Err(err) => {
                error!(error = %err, "{FETCH_ERROR_MESSAGE}");
                Self::Error(FETCH_ERROR_MESSAGE.to_string())
            }
        }
    }

    /// Line shown instead of a view, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::NotEmbedded => Some(NOT_EMBEDDED_MESSAGE.to_string()),
            Self::TestMode => None,
            Self::WaitingForData => Some(WAITING_MESSAGE.to_string()),
            Self::Error(message) => Some(message.clone()),
            Self::Ready(loaded) => loaded.placeholder_text(),
        }
    }
}

/// Root GPUI view: owns the shared selection and mounts the loaded view.
pub struct FigureHost {
    state: HostState,
    selection: Entity<SelectionModel>,
    config: ScrollViewConfig,
    frame_source: Option<Arc<dyn FrameSource>>,
    selected_units: HashSet<crate::views::UnitId>,
    content: Option<AnyView>,
}

impl FigureHost {
    pub fn new(params: &HostParams, config: ScrollViewConfig, cx: &mut Context<Self>) -> Self {
        let store = TimeseriesSelectionStore::new();
        Self {
            state: HostState::from_params(params),
            selection: cx.new(|_| SelectionModel::new(store)),
            config,
            frame_source: None,
            selected_units: HashSet::new(),
            content: None,
        }
    }

    pub fn with_frame_source(mut self, source: Arc<dyn FrameSource>) -> Self {
        self.frame_source = Some(source);
        self
    }

    pub fn state(&self) -> &HostState {
        &self.state
    }

    pub fn selection(&self) -> &Entity<SelectionModel> {
        &self.selection
    }

    pub fn set_selected_units(&mut self, units: HashSet<crate::views::UnitId>, cx: &mut Context<Self>) {
        self.selected_units = units;
        self.content = None;
        cx.notify();
    }

    pub fn receive(&mut self, result: eyre::Result<Option<Value>>, cx: &mut Context<Self>) {
        let state = std::mem::replace(&mut self.state, HostState::WaitingForData);
        self.state = state.receive(result);
        self.content = None;
        cx.notify();
    }

    fn mount(&self, data: &ViewData, width: f32, height: f32, cx: &mut Context<Self>) -> Option<AnyView> {
        let store = self.selection.read(cx).store.clone();
        let selection = self.selection.clone();
        let config = self.config.clone();
        let view: AnyView = match data {
            ViewData::TimeseriesGraph(data) => {
                let graph = TimeseriesGraphView::new(data);
                graph.initialize(&store);
                let scroll = graph.scroll_view(width, height);
                cx.new(|cx| TimeScrollElement::new(scroll, selection, config, cx))
                    .into()
            }
            ViewData::FiringRatesPlot(data) => {
                let rates = FiringRatesView::new(data);
                rates.initialize(&store);
                let scroll = rates.scroll_view(
                    width,
                    height,
                    &self.selected_units,
                    TimeseriesLayoutOpts::default(),
                );
                cx.new(|cx| TimeScrollElement::new(scroll, selection, config, cx))
                    .into()
            }
            ViewData::SparseAudioSpectrogram(data) => {
                let spectrogram = SpectrogramView::new(data);
                spectrogram.initialize(&store);
                let scroll = spectrogram.scroll_view(width, height, TimeseriesLayoutOpts::default());
                cx.new(|cx| TimeScrollElement::new(scroll, selection, config, cx))
                    .into()
            }
            ViewData::AnnotatedVideo(data) => {
                let video = AnnotatedVideoView::new(data.clone());
                let source = self.frame_source.clone();
                cx.new(|cx| AnnotatedVideoElement::new(video, selection, source, width, height, cx))
                    .into()
            }
            ViewData::Empty => return None,
        };
        self.selection.update(cx, |model, cx| model.sync(cx));
        Some(view)
    }
}

impl Render for FigureHost {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let viewport = window.viewport_size();
        let width = (f32::from(viewport.width) - WINDOW_INSET).max(0.0);
        let height = (f32::from(viewport.height) - WINDOW_INSET).max(0.0);

        if self.content.is_none() {
            if let HostState::Ready(LoadedView::View(data)) = &self.state {
                let data = data.clone();
                self.content = self.mount(&data, width, height, cx);
            }
        }

        let root = div().size_full().bg(gpui::white());
        match (&self.content, self.state.message()) {
            (Some(view), _) => root.child(view.clone()),
            (None, Some(message)) => {
                let color = match self.state {
                    HostState::Error(_) => gpui::red(),
                    _ => gpui::black(),
                };
                root.p(px(20.0)).text_color(color).child(message)
            }
            (None, None) => root,
        }
    }
}
