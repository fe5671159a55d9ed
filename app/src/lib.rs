pub mod events;
pub mod quiz;
pub mod render;

pub use events::{AppEvent, spawn_line_reader};
pub use quiz::{Exports, Flow, Popup, Quiz};
