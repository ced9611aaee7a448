//! Backend worker: owns the tokio runtime and the API client, turns commands into UI events.

use std::{sync::Arc, thread};

use client_core::{
    forms, ClientError, ClientSettings, CreatedNote, FileTokenStore, NotesApi, NotesClient,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::startup(format!(
                        "Backend worker failed to start: {err}"
                    ))),
                );
                return;
            }
        };

        let tokens = Arc::new(FileTokenStore::new(&settings.token_path));
        let client = match NotesClient::from_settings(&settings, tokens) {
            Ok(client) => client,
            Err(err) => {
                tracing::error!("failed to build API client: {err}");
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_client_error(
                        UiErrorContext::BackendStartup,
                        &err,
                    )),
                );
                return;
            }
        };
        tracing::info!(api = client.base_url(), "backend worker started");

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let event = handle_command(&client, cmd).await;
                emit(&ui_tx, event);
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    })
}

pub async fn handle_command<A: NotesApi + ?Sized>(api: &A, cmd: BackendCommand) -> UiEvent {
    let name = cmd.name();
    tracing::debug!(command = name, "handling backend command");
    match cmd {
        BackendCommand::Login(credentials) => match api.login(&credentials).await {
            Ok(_) => UiEvent::Authenticated {
                email: credentials.email,
            },
            Err(err) => failure(api, UiErrorContext::Login, &err),
        },
        BackendCommand::Signup(credentials) => match api.signup(&credentials).await {
            Ok(_) => UiEvent::Authenticated {
                email: credentials.email,
            },
            Err(err) => failure(api, UiErrorContext::Signup, &err),
        },
        BackendCommand::Logout => match api.logout() {
            Ok(()) => UiEvent::LoggedOut,
            Err(err) => failure(api, UiErrorContext::General, &err),
        },
        BackendCommand::LoadNotes => match api.list_notes().await {
            Ok(notes) => UiEvent::NotesLoaded(notes),
            Err(err) => failure(api, UiErrorContext::LoadNotes, &err),
        },
        BackendCommand::LoadNote(id) => match api.get_note(id).await {
            Ok(note) => UiEvent::NoteLoaded(note),
            Err(err) => failure(api, UiErrorContext::LoadNote, &err),
        },
        BackendCommand::CreateNote(form) => match forms::create_from_form(api, &form).await {
            Ok(CreatedNote {
                note,
                star_error: None,
            }) => UiEvent::NoteSaved(note),
            Ok(CreatedNote {
                note,
                star_error: Some(err),
            }) => UiEvent::CreatedWithoutStar {
                note,
                error: classify(api, UiErrorContext::ToggleStar, &err),
            },
            Err(err) => failure(api, UiErrorContext::SaveNote, &err),
        },
        BackendCommand::UpdateNote { id, form } => {
            match forms::save_from_form(api, id, &form).await {
                Ok(note) => UiEvent::NoteSaved(note),
                Err(err) => failure(api, UiErrorContext::SaveNote, &err),
            }
        }
        BackendCommand::DeleteNote(id) => match api.delete_note(id).await {
            Ok(()) => UiEvent::NoteDeleted(id),
            Err(err) => failure(api, UiErrorContext::DeleteNote, &err),
        },
        BackendCommand::ToggleStar(id) => match api.toggle_star(id).await {
            Ok(note) => UiEvent::StarToggled(note),
            Err(err) => UiEvent::StarToggleFailed {
                id,
                error: classify(api, UiErrorContext::ToggleStar, &err),
            },
        },
    }
}

fn failure<A: NotesApi + ?Sized>(api: &A, context: UiErrorContext, err: &ClientError) -> UiEvent {
    UiEvent::Error(classify(api, context, err))
}

fn classify<A: NotesApi + ?Sized>(api: &A, context: UiErrorContext, err: &ClientError) -> UiError {
    tracing::warn!(?context, "backend command failed: {err}");
    if !context.is_sign_in() && api.end_session_on_auth_failure(err) {
        tracing::info!("stored session cleared after auth failure");
    }
    UiError::from_client_error(context, err)
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("ui event queue full; dropping event"),
        Err(TrySendError::Disconnected(_)) => tracing::debug!("ui event receiver gone"),
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
