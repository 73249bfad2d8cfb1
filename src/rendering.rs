//! Renderer-agnostic drawing instructions produced by the scroll view.
//!
//! Everything is in pixel coordinates local to the scroll-view surface (the
//! toolbar strip excluded). The GPUI element replays a [`DisplayList`] in
//! layer order; tests inspect it directly.

use crate::scales::AffineScale;
use gpui::{point, px, Bounds, Hsla, Pixels, Point, RenderImage, Size};
use std::sync::Arc;

/// Paint layers, in the order they are composited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Axes,
    Main,
    Highlight,
    Cursor,
    Annotations,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Axes,
        Layer::Main,
        Layer::Highlight,
        Layer::Cursor,
        Layer::Annotations,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        bounds: Bounds<Pixels>,
        color: Hsla,
    },
    StrokeRect {
        bounds: Bounds<Pixels>,
        color: Hsla,
    },
    Line {
        from: Point<Pixels>,
        to: Point<Pixels>,
        color: Hsla,
        width: Pixels,
    },
    Polyline {
        points: Vec<Point<Pixels>>,
        color: Hsla,
        width: Pixels,
        dash: Option<Vec<f32>>,
    },
    Marker {
        center: Point<Pixels>,
        radius: Pixels,
        shape: MarkerShape,
        color: Hsla,
    },
    /// `origin` is the anchor point on the vertical middle of the line.
    Text {
        origin: Point<Pixels>,
        text: String,
        color: Hsla,
        size: Pixels,
        anchor: TextAnchor,
    },
    /// Decoded image stretched over `bounds`.
    Image {
        bounds: Bounds<Pixels>,
        image: Arc<RenderImage>,
    },
}

impl DrawCommand {
    fn translated(self, offset: Point<Pixels>) -> Self {
        let shift = |p: Point<Pixels>| point(p.x + offset.x, p.y + offset.y);
        match self {
            Self::FillRect { bounds, color } => Self::FillRect {
                bounds: Bounds::new(shift(bounds.origin), bounds.size),
                color,
            },
            Self::StrokeRect { bounds, color } => Self::StrokeRect {
                bounds: Bounds::new(shift(bounds.origin), bounds.size),
                color,
            },
            Self::Line {
                from,
                to,
                color,
                width,
            } => Self::Line {
                from: shift(from),
                to: shift(to),
                color,
                width,
            },
            Self::Polyline {
                points,
                color,
                width,
                dash,
            } => Self::Polyline {
                points: points.into_iter().map(shift).collect(),
                color,
                width,
                dash,
            },
            Self::Marker {
                center,
                radius,
                shape,
                color,
            } => Self::Marker {
                center: shift(center),
                radius,
                shape,
                color,
            },
            Self::Text {
                origin,
                text,
                color,
                size,
                anchor,
            } => Self::Text {
                origin: shift(origin),
                text,
                color,
                size,
                anchor,
            },
            Self::Image { bounds, image } => Self::Image {
                bounds: Bounds::new(shift(bounds.origin), bounds.size),
                image,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub layer: Layer,
    /// Painting is masked to these bounds when set.
    pub clip: Option<Bounds<Pixels>>,
    pub command: DrawCommand,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer, clip: Option<Bounds<Pixels>>, command: DrawCommand) {
        self.items.push(DrawItem {
            layer,
            clip,
            command,
        });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(move |item| item.layer == layer)
    }

    /// Items sorted by layer; insertion order is kept within a layer.
    pub fn in_paint_order(&self) -> Vec<&DrawItem> {
        let mut items: Vec<&DrawItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.layer);
        items
    }

    /// Every text string in paint order, mostly useful for assertions.
    pub fn texts(&self) -> Vec<&str> {
        self.in_paint_order()
            .into_iter()
            .filter_map(|item| match &item.command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Drawing context handed to a panel's paint callback.
///
/// Coordinates are local to the panel row: `(0, 0)` is its top-left corner
/// and `(width, height)` its bottom-right. The canvas translates everything
/// to surface coordinates and clips it to the row.
pub struct PanelCanvas<'a> {
    list: &'a mut DisplayList,
    bounds: Bounds<Pixels>,
    time_scale: AffineScale,
    visible_window: (f64, f64),
}

impl<'a> PanelCanvas<'a> {
    pub fn new(
        list: &'a mut DisplayList,
        bounds: Bounds<Pixels>,
        visible_window: (f64, f64),
    ) -> Self {
        let width = f32::from(bounds.size.width);
        Self {
            list,
            bounds,
            time_scale: AffineScale::new(visible_window, (0.0, width)),
            visible_window,
        }
    }

    pub fn width(&self) -> f32 {
        f32::from(self.bounds.size.width)
    }

    pub fn height(&self) -> f32 {
        f32::from(self.bounds.size.height)
    }

    /// Row bounds in surface coordinates.
    pub fn bounds(&self) -> Bounds<Pixels> {
        self.bounds
    }

    pub fn visible_window(&self) -> (f64, f64) {
        self.visible_window
    }

    /// Time mapped onto `[0, width]`.
    pub fn time_scale(&self) -> &AffineScale {
        &self.time_scale
    }

    pub fn time_to_x(&self, t: f64) -> f32 {
        self.time_scale.map(t)
    }

    pub fn draw(&mut self, command: DrawCommand) {
        let command = command.translated(self.bounds.origin);
        self.list.push(Layer::Main, Some(self.bounds), command);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Hsla) {
        self.draw(DrawCommand::FillRect {
            bounds: Bounds::new(point(px(x), px(y)), Size::new(px(w), px(h))),
            color,
        });
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Hsla) {
        self.draw(DrawCommand::StrokeRect {
            bounds: Bounds::new(point(px(x), px(y)), Size::new(px(w), px(h))),
            color,
        });
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Hsla, width: f32) {
        self.draw(DrawCommand::Line {
            from: point(px(from.0), px(from.1)),
            to: point(px(to.0), px(to.1)),
            color,
            width: px(width),
        });
    }

    pub fn polyline(
        &mut self,
        points: impl IntoIterator<Item = (f32, f32)>,
        color: Hsla,
        width: f32,
        dash: Option<Vec<f32>>,
    ) {
        let points: Vec<Point<Pixels>> = points
            .into_iter()
            .map(|(x, y)| point(px(x), px(y)))
            .collect();
        if points.len() < 2 {
            return;
        }
        self.draw(DrawCommand::Polyline {
            points,
            color,
            width: px(width),
            dash,
        });
    }

    pub fn marker(&mut self, center: (f32, f32), radius: f32, shape: MarkerShape, color: Hsla) {
        self.draw(DrawCommand::Marker {
            center: point(px(center.0), px(center.1)),
            radius: px(radius),
            shape,
            color,
        });
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, color: Hsla, size: f32) {
        self.draw(DrawCommand::Text {
            origin: point(px(x), px(y)),
            text: text.into(),
            color,
            size: px(size),
            anchor: TextAnchor::Start,
        });
    }
}

/// Splits a polyline into the "on" segments of a dash pattern. An empty or
/// non-positive pattern yields the polyline unchanged.
pub fn dash_segments(points: &[Point<Pixels>], pattern: &[f32]) -> Vec<Vec<Point<Pixels>>> {
    let total: f32 = pattern.iter().sum();
    if points.len() < 2 || pattern.is_empty() || pattern.iter().any(|d| *d < 0.0) || total <= 0.0
    {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current: Vec<Point<Pixels>> = vec![points[0]];
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut on = true;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (ax, ay) = (f32::from(a.x), f32::from(a.y));
        let (dx, dy) = (f32::from(b.x) - ax, f32::from(b.y) - ay);
        let length = (dx * dx + dy * dy).sqrt();
        let mut travelled = 0.0;

        while length - travelled > remaining {
            travelled += remaining;
            let t = travelled / length;
            let p = point(px(ax + dx * t), px(ay + dy * t));
            if on {
                current.push(p);
                segments.push(std::mem::take(&mut current));
            } else {
                current = vec![p];
            }
            on = !on;
            index = (index + 1) % pattern.len();
            remaining = pattern[index];
        }
        remaining -= length - travelled;
        if on {
            current.push(b);
        }
    }
    if on && current.len() >= 2 {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::{black, size};

    #[test]
    fn canvas_translates_and_clips_to_row() {
        let mut list = DisplayList::new();
        let row = Bounds::new(point(px(30.0), px(100.0)), size(px(200.0), px(50.0)));
        let mut canvas = PanelCanvas::new(&mut list, row, (0.0, 10.0));
        assert_eq!(canvas.time_to_x(5.0), 100.0);
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, black());

        let item = &list.items()[0];
        assert_eq!(item.layer, Layer::Main);
        assert_eq!(item.clip, Some(row));
        match &item.command {
            DrawCommand::FillRect { bounds, .. } => {
                assert_eq!(bounds.origin, point(px(30.0), px(100.0)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn paint_order_is_stable_within_layers() {
        let mut list = DisplayList::new();
        let text = |s: &str| DrawCommand::Text {
            origin: point(px(0.0), px(0.0)),
            text: s.to_string(),
            color: black(),
            size: px(10.0),
            anchor: TextAnchor::Start,
        };
        list.push(Layer::Cursor, None, text("cursor"));
        list.push(Layer::Axes, None, text("axis-1"));
        list.push(Layer::Annotations, None, text("note"));
        list.push(Layer::Axes, None, text("axis-2"));
        assert_eq!(list.texts(), vec!["axis-1", "axis-2", "cursor", "note"]);
    }

    #[test]
    fn dashes_split_a_straight_line() {
        let pts = [point(px(0.0), px(0.0)), point(px(10.0), px(0.0))];
        let segments = dash_segments(&pts, &[2.0, 3.0]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![point(px(0.0), px(0.0)), point(px(2.0), px(0.0))]);
        assert_eq!(segments[1], vec![point(px(5.0), px(0.0)), point(px(7.0), px(0.0))]);
    }
}
