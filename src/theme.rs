use gpui::*;

#[derive(Clone, Debug)]
pub struct TimeScrollTheme {
    pub background: Hsla,
    pub grid_line: Hsla,
    pub axis_line: Hsla,
    pub axis_label: Hsla,
    pub axis_label_size: Pixels,
    pub panel_label: Hsla,
    pub selected_panel: Hsla,
    pub highlight_span: Hsla,
    pub cursor_line: Hsla,
    pub interval_fill: Hsla,
    pub annotation: Hsla,
    pub annotation_label_size: Pixels,
    pub toolbar_background: Hsla,
    pub toolbar_icon: Hsla,
    pub placeholder_text: Hsla,
}

impl Default for TimeScrollTheme {
    fn default() -> Self {
        Self {
            background: gpui::white(),
            grid_line: gpui::black().alpha(0.08),
            axis_line: gpui::black().alpha(0.6),
            axis_label: gpui::black().alpha(0.8),
            axis_label_size: px(11.0),
            panel_label: gpui::black().alpha(0.7),
            selected_panel: hsla(0.58, 0.8, 0.6, 0.15),
            highlight_span: hsla(0.15, 1.0, 0.5, 0.25),
            cursor_line: hsla(0.0, 1.0, 0.5, 0.6),
            interval_fill: hsla(0.58, 0.6, 0.5, 0.2),
            annotation: hsla(0.33, 0.7, 0.35, 0.8),
            annotation_label_size: px(10.0),
            toolbar_background: gpui::black().alpha(0.04),
            toolbar_icon: gpui::black().alpha(0.7),
            placeholder_text: gpui::black().alpha(0.5),
        }
    }
}
