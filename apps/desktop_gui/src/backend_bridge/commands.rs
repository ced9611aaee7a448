//! Commands sent from the UI thread to the backend worker.

use client_core::NoteForm;
use shared::{domain::NoteId, protocol::Credentials};

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Login(Credentials),
    Signup(Credentials),
    Logout,
    LoadNotes,
    LoadNote(NoteId),
    CreateNote(NoteForm),
    UpdateNote { id: NoteId, form: NoteForm },
    DeleteNote(NoteId),
    ToggleStar(NoteId),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Login(_) => "login",
            BackendCommand::Signup(_) => "signup",
            BackendCommand::Logout => "logout",
            BackendCommand::LoadNotes => "load_notes",
            BackendCommand::LoadNote(_) => "load_note",
            BackendCommand::CreateNote(_) => "create_note",
            BackendCommand::UpdateNote { .. } => "update_note",
            BackendCommand::DeleteNote(_) => "delete_note",
            BackendCommand::ToggleStar(_) => "toggle_star",
        }
    }
}
