use serde::{Deserialize, Serialize};

/// A labelled tick on a value axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
    #[serde(default)]
    pub is_major: bool,
}

/// A set of value-axis ticks together with the data range they cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickSet {
    pub datamin: f64,
    pub datamax: f64,
    pub ticks: Vec<Tick>,
}

/// A tick on the time axis, already projected into pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeTick {
    pub value: f64,
    pub pixel_x: f32,
    pub label: String,
    pub is_major: bool,
}
