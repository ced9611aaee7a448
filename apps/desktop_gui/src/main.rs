mod backend_bridge;
mod controller;
mod ui;

use client_core::{config, FileTokenStore, TokenStore};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::NotesDesktopApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load_settings();
    let authenticated = match FileTokenStore::new(&settings.token_path).load() {
        Ok(token) => token.is_some(),
        Err(err) => {
            tracing::warn!(path = %settings.token_path.display(), "failed to read stored session: {err}");
            false
        }
    };
    let api_base_url = settings.api_base_url.clone();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Notes")
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([760.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Notes",
        options,
        Box::new(move |cc| {
            Ok(Box::new(NotesDesktopApp::new(
                cc,
                cmd_tx,
                ui_rx,
                authenticated,
                api_base_url,
            )))
        }),
    )
}
