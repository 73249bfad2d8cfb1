pub mod annotations;
pub mod selection;
pub mod ticks;

pub use annotations::*;
pub use selection::*;
pub use ticks::*;
