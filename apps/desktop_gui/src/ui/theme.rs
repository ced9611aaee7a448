//! Colors for the dark notes theme.

use eframe::egui::{self, Color32};
use shared::domain::{NoteColor, NoteStatus};

pub const BACKGROUND: Color32 = Color32::from_rgb(0x0b, 0x10, 0x1b);
pub const SIDEBAR: Color32 = Color32::from_rgb(0x16, 0x1c, 0x2a);
pub const SIDEBAR_ACTIVE: Color32 = Color32::from_rgb(0x2a, 0x33, 0x48);
pub const PANEL: Color32 = Color32::from_rgb(0x1c, 0x23, 0x33);
pub const BORDER: Color32 = Color32::from_rgb(0x33, 0x3c, 0x52);
pub const ACCENT: Color32 = Color32::from_rgb(0xa8, 0xc5, 0xda);
pub const STAR: Color32 = Color32::from_rgb(0xf5, 0xc5, 0x42);
pub const MUTED: Color32 = Color32::from_rgb(0x8a, 0x93, 0xa6);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(0xf8, 0x71, 0x71);
pub const ERROR_FILL: Color32 = Color32::from_rgb(0x3b, 0x16, 0x1a);
pub const WARNING_TEXT: Color32 = Color32::from_rgb(0xfa, 0xcc, 0x15);
pub const WARNING_FILL: Color32 = Color32::from_rgb(0x38, 0x2e, 0x10);
pub const DANGER: Color32 = Color32::from_rgb(0x7f, 0x1d, 0x1d);

pub fn note_fill(color: NoteColor) -> Color32 {
    let [r, g, b] = color.rgb();
    Color32::from_rgb(r, g, b)
}

pub fn note_text(color: NoteColor) -> Color32 {
    if color.prefers_dark_text() {
        Color32::from_rgb(0x1f, 0x24, 0x30)
    } else {
        Color32::WHITE
    }
}

pub fn status_marker(status: NoteStatus) -> &'static str {
    match status {
        NoteStatus::Note => "✎",
        NoteStatus::TodoInProgress => "◔",
        NoteStatus::TodoDone => "✔",
        NoteStatus::TodoNoStatus => "○",
    }
}

pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = PANEL;
    visuals.extreme_bg_color = PANEL;
    visuals.selection.bg_fill = SIDEBAR_ACTIVE;
    ctx.set_visuals(visuals);
}
