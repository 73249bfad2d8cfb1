use crate::config::ScrollViewConfig;
use crate::data_types::{PanDirection, SelectionAction, ZoomDirection};
use crate::selection_store::TimeseriesSelectionStore;
use gpui::*;
use std::sync::Arc;

actions!(
    gpui_timescroll,
    [PanBack, PanForward, ZoomIn, ZoomOut, ResetView]
);

/// Key context the scroll view registers itself under.
pub const KEY_CONTEXT: &str = "TimeScrollView";

/// Registers the default key bindings of the scroll view.
pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("left", PanBack, Some(KEY_CONTEXT)),
        KeyBinding::new("right", PanForward, Some(KEY_CONTEXT)),
        KeyBinding::new("=", ZoomIn, Some(KEY_CONTEXT)),
        KeyBinding::new("+", ZoomIn, Some(KEY_CONTEXT)),
        KeyBinding::new("-", ZoomOut, Some(KEY_CONTEXT)),
        KeyBinding::new("home", ResetView, Some(KEY_CONTEXT)),
    ]);
}

pub type CustomCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub enum ToolbarCommand {
    Selection(SelectionAction),
    /// Returns the visible window to the full timeseries.
    Reset,
    Custom(CustomCallback),
}

impl std::fmt::Debug for ToolbarCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selection(action) => f.debug_tuple("Selection").field(action).finish(),
            Self::Reset => f.write_str("Reset"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToolbarItem {
    pub id: String,
    /// Short glyph shown in the toolbar strip.
    pub icon: String,
    pub tooltip: String,
    pub selected: bool,
    pub command: ToolbarCommand,
}

impl ToolbarItem {
    pub fn custom(
        id: impl Into<String>,
        icon: impl Into<String>,
        tooltip: impl Into<String>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            icon: icon.into(),
            tooltip: tooltip.into(),
            selected: false,
            command: ToolbarCommand::Custom(Arc::new(callback)),
        }
    }

    fn selection(id: &str, icon: &str, tooltip: &str, action: SelectionAction) -> Self {
        Self {
            id: id.to_string(),
            icon: icon.to_string(),
            tooltip: tooltip.to_string(),
            selected: false,
            command: ToolbarCommand::Selection(action),
        }
    }
}

/// Extra toolbar items placed above or below the default controls.
#[derive(Clone, Debug, Default)]
pub struct ToolbarActions {
    pub above_defaults: Vec<ToolbarItem>,
    pub below_defaults: Vec<ToolbarItem>,
}

/// Default controls: zoom in, zoom out, pan back, pan forward.
pub fn default_toolbar_items(config: &ScrollViewConfig) -> Vec<ToolbarItem> {
    vec![
        ToolbarItem::selection(
            "zoom-in",
            "+",
            "Zoom in (=)",
            SelectionAction::Zoom {
                direction: ZoomDirection::In,
                factor: Some(config.zoom_factor),
            },
        ),
        ToolbarItem::selection(
            "zoom-out",
            "−",
            "Zoom out (-)",
            SelectionAction::Zoom {
                direction: ZoomDirection::Out,
                factor: Some(config.zoom_factor),
            },
        ),
        ToolbarItem::selection(
            "pan-back",
            "‹",
            "Pan back (left arrow)",
            SelectionAction::Pan {
                direction: PanDirection::Back,
                percent: config.pan_percent,
            },
        ),
        ToolbarItem::selection(
            "pan-forward",
            "›",
            "Pan forward (right arrow)",
            SelectionAction::Pan {
                direction: PanDirection::Forward,
                percent: config.pan_percent,
            },
        ),
    ]
}

pub fn toolbar_items(optional: Option<&ToolbarActions>, config: &ScrollViewConfig) -> Vec<ToolbarItem> {
    let mut items = Vec::new();
    if let Some(extra) = optional {
        items.extend(extra.above_defaults.iter().cloned());
    }
    items.extend(default_toolbar_items(config));
    if let Some(extra) = optional {
        items.extend(extra.below_defaults.iter().cloned());
    }
    items
}

/// Keyboard action to selection action.
pub fn key_action(action: &dyn Action, config: &ScrollViewConfig) -> Option<SelectionAction> {
    let any = action.as_any();
    if any.is::<PanBack>() {
        Some(SelectionAction::Pan {
            direction: PanDirection::Back,
            percent: config.keyboard_pan_percent,
        })
    } else if any.is::<PanForward>() {
        Some(SelectionAction::Pan {
            direction: PanDirection::Forward,
            percent: config.keyboard_pan_percent,
        })
    } else if any.is::<ZoomIn>() {
        Some(SelectionAction::Zoom {
            direction: ZoomDirection::In,
            factor: Some(config.zoom_factor),
        })
    } else if any.is::<ZoomOut>() {
        Some(SelectionAction::Zoom {
            direction: ZoomDirection::Out,
            factor: Some(config.zoom_factor),
        })
    } else {
        None
    }
}

/// Executes toolbar and keyboard commands against the shared store.
#[derive(Clone)]
pub struct ScrollActionHandler {
    pub store: TimeseriesSelectionStore,
    pub config: ScrollViewConfig,
}

impl ScrollActionHandler {
    pub fn new(store: TimeseriesSelectionStore, config: ScrollViewConfig) -> Self {
        Self { store, config }
    }

    pub fn run(&self, command: &ToolbarCommand) -> bool {
        match command {
            ToolbarCommand::Selection(action) => self.store.dispatch(action.clone()),
            ToolbarCommand::Reset => self.reset(),
            ToolbarCommand::Custom(callback) => {
                callback();
                false
            }
        }
    }

    /// Runs a keyboard action; returns whether the selection changed.
    pub fn run_key(&self, action: &dyn Action) -> bool {
        if action.as_any().is::<ResetView>() {
            return self.reset();
        }
        key_action(action, &self.config).is_some_and(|a| self.store.dispatch(a))
    }

    pub fn reset(&self) -> bool {
        match self.store.snapshot().timeseries_bounds() {
            Some((start, end)) => self.store.set_visible_range(start, end),
            None => false,
        }
    }
}
