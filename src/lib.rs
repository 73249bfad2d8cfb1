//! gpui_timescroll: time-scroll views for neuroscience figures in GPUI

pub mod colors;
pub mod config;
pub mod data_types;
pub mod error;
pub mod host;
pub mod layout;
pub mod media;
pub mod playback;
pub mod rendering;
pub mod scales;
pub mod scroll_view;
pub mod selection_model;
pub mod selection_store;
pub mod spans;
pub mod theme;
pub mod ticks;
pub mod utils;
pub mod view_controller;
pub mod views;

pub use config::ScrollViewConfig;
pub use data_types::{
    selection_is_valid, Annotation, HighlightIntervalSet, PanDirection, SelectionAction,
    TimeseriesSelection, WindowedSelection, ZoomDirection,
};
pub use error::ValidationError;
pub use host::{FigureHost, HostParams, HostState};
pub use rendering::{DisplayList, DrawCommand, Layer, PanelCanvas};
pub use scroll_view::actions::init;
pub use scroll_view::{Panel, TimeScrollElement, TimeScrollView};
pub use selection_model::SelectionModel;
pub use selection_store::TimeseriesSelectionStore;
pub use view_controller::ViewController;
pub use views::{load_view, LoadedView, ViewData};
