//! Terminal front end: the main window, entity forms and the event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;
mod theme;

pub use app::App;
pub use terminal::run_app;
pub use theme::Theme;
