mod app;
pub mod components;
pub mod layout;
mod screen;
pub mod text;
pub mod theme;

pub use app::App;
pub use layout::{inner_width, render_frame, RenderLine, DEFAULT_INNER_WIDTH};
pub use screen::{Screen, WidthProbe};
