//! UI layer: app shell, screens and theme.

pub mod app;
pub mod theme;

pub use app::NotesDesktopApp;
