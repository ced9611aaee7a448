//! Screen state for the desktop app and the transitions driven by user actions and backend events.
//!
//! Every transition that needs the network returns the commands to queue, so the model
//! stays free of channels and can be driven directly in tests.

use client_core::{AuthForm, AuthMode, FormError, NoteForm, NotesBoard, NotesView};
use shared::domain::NoteId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub const SESSION_ENDED: &str = "Your session has ended. Please sign in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Notes,
    Starred,
    CreateNote,
    EditNote(NoteId),
}

impl Route {
    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Notes => "My Notes",
            Route::Starred => "Starred Notes",
            Route::CreateNote => "Create Note",
            Route::EditNote(_) => "Edit Note",
        }
    }
}

#[derive(Debug)]
pub struct AppModel {
    route: Route,
    authenticated: bool,
    pub signed_in_as: Option<String>,
    pub auth_mode: AuthMode,
    pub auth_form: AuthForm,
    pub board: NotesBoard,
    pub note_form: NoteForm,
    pub note_loading: bool,
    pub saving: bool,
    pub signing_in: bool,
    pub confirm_delete: bool,
    pub logout_menu_open: bool,
    /// Page-level error banner.
    pub error: Option<String>,
    /// Footer line for worker and queue notices.
    pub status: String,
}

impl AppModel {
    pub fn new(authenticated: bool) -> Self {
        Self {
            route: Route::Login,
            authenticated,
            signed_in_as: None,
            auth_mode: AuthMode::Login,
            auth_form: AuthForm::default(),
            board: NotesBoard::default(),
            note_form: NoteForm::default(),
            note_loading: false,
            saving: false,
            signing_in: false,
            confirm_delete: false,
            logout_menu_open: false,
            error: None,
            status: String::new(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Moves to `route`, falling back to Login when it needs a session that isn't there.
    pub fn navigate(&mut self, route: Route) -> Vec<BackendCommand> {
        let route = if route.requires_session() && !self.authenticated {
            Route::Login
        } else {
            route
        };
        self.route = route;
        self.error = None;
        self.saving = false;
        self.confirm_delete = false;
        self.logout_menu_open = false;
        self.note_loading = false;

        match route {
            Route::Login => {
                self.auth_form = AuthForm::default();
                Vec::new()
            }
            Route::Notes => self.open_board(NotesView::All),
            Route::Starred => self.open_board(NotesView::Starred),
            Route::CreateNote => {
                self.note_form = NoteForm::default();
                Vec::new()
            }
            Route::EditNote(id) => {
                self.note_form = NoteForm::default();
                self.note_loading = true;
                vec![BackendCommand::LoadNote(id)]
            }
        }
    }

    fn open_board(&mut self, view: NotesView) -> Vec<BackendCommand> {
        self.board.set_view(view);
        self.board.begin_loading();
        vec![BackendCommand::LoadNotes]
    }

    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        self.auth_mode = mode;
        self.auth_form.reset_errors();
        self.error = None;
    }

    pub fn submit_auth(&mut self) -> Option<BackendCommand> {
        if self.signing_in {
            return None;
        }
        self.error = None;
        let credentials = self.auth_form.submit()?;
        self.signing_in = true;
        Some(match self.auth_mode {
            AuthMode::Login => BackendCommand::Login(credentials),
            AuthMode::Signup => BackendCommand::Signup(credentials),
        })
    }

    pub fn submit_note(&mut self) -> Option<BackendCommand> {
        if self.saving || self.note_loading {
            return None;
        }
        if !self.note_form.can_submit() {
            self.error = Some(FormError::TitleRequired.to_string());
            return None;
        }
        let cmd = match self.route {
            Route::CreateNote => BackendCommand::CreateNote(self.note_form.clone()),
            Route::EditNote(id) => BackendCommand::UpdateNote {
                id,
                form: self.note_form.clone(),
            },
            _ => return None,
        };
        self.error = None;
        self.saving = true;
        Some(cmd)
    }

    pub fn toggle_star(&mut self, id: NoteId) -> Option<BackendCommand> {
        self.board
            .begin_star_toggle(id)
            .map(|_| BackendCommand::ToggleStar(id))
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn confirm_delete(&mut self) -> Option<BackendCommand> {
        if !self.confirm_delete {
            return None;
        }
        self.confirm_delete = false;
        match self.route {
            Route::EditNote(id) => Some(BackendCommand::DeleteNote(id)),
            _ => None,
        }
    }

    pub fn toggle_logout_menu(&mut self) {
        self.logout_menu_open = !self.logout_menu_open;
    }

    pub fn logout(&mut self) -> BackendCommand {
        self.end_session(None);
        BackendCommand::Logout
    }

    fn end_session(&mut self, notice: Option<&str>) {
        self.authenticated = false;
        self.signed_in_as = None;
        self.board.clear();
        self.note_form = NoteForm::default();
        self.navigate(Route::Login);
        self.signing_in = false;
        self.error = notice.map(str::to_string);
    }

    pub fn apply(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
                Vec::new()
            }
            UiEvent::Authenticated { email } => {
                self.authenticated = true;
                self.signing_in = false;
                self.signed_in_as = Some(email);
                self.auth_form = AuthForm::default();
                self.navigate(Route::Notes)
            }
            UiEvent::LoggedOut => {
                if self.authenticated {
                    self.end_session(None);
                }
                Vec::new()
            }
            UiEvent::Error(error) => {
                if !self.authenticated && !error.context().outlives_session() {
                    tracing::debug!(context = ?error.context(), "dropping error from a finished session");
                    return Vec::new();
                }
                self.fail(error)
            }
            // Anything below arriving after logout belongs to the previous session.
            _ if !self.authenticated => {
                tracing::debug!("dropping note event received while signed out");
                Vec::new()
            }
            UiEvent::NotesLoaded(notes) => {
                self.board.loaded(notes);
                Vec::new()
            }
            UiEvent::NoteLoaded(note) => {
                if self.route == Route::EditNote(note.id) {
                    self.note_form = NoteForm::from_note(&note);
                    self.note_loading = false;
                }
                self.board.upsert(note);
                Vec::new()
            }
            UiEvent::NoteSaved(note) => {
                self.saving = false;
                self.board.upsert(note);
                match self.route {
                    Route::CreateNote | Route::EditNote(_) => self.navigate(Route::Notes),
                    _ => Vec::new(),
                }
            }
            UiEvent::CreatedWithoutStar { note, error } => {
                self.saving = false;
                self.board.upsert(note);
                if error.requires_reauth() {
                    return self.fail(error);
                }
                let cmds = self.navigate(Route::Notes);
                self.error = Some(format!(
                    "Note created, but starring it failed: {}",
                    error.message()
                ));
                cmds
            }
            UiEvent::NoteDeleted(id) => {
                self.board.remove(id);
                if self.route == Route::EditNote(id) {
                    self.navigate(Route::Notes)
                } else {
                    Vec::new()
                }
            }
            UiEvent::StarToggled(note) => {
                self.board.complete_star_toggle(note);
                Vec::new()
            }
            UiEvent::StarToggleFailed { id, error } => {
                self.board.fail_star_toggle(id);
                self.fail(error)
            }
        }
    }

    fn fail(&mut self, error: UiError) -> Vec<BackendCommand> {
        let context = error.context();
        if error.requires_reauth() && !context.is_sign_in() {
            tracing::info!(?context, "auth failure, returning to login");
            if self.authenticated {
                self.end_session(Some(SESSION_ENDED));
            }
            return Vec::new();
        }

        let message = error.message().to_string();
        match context {
            UiErrorContext::Login | UiErrorContext::Signup => self.signing_in = false,
            UiErrorContext::LoadNotes => {
                self.board.load_failed(message);
                return Vec::new();
            }
            UiErrorContext::LoadNote => self.note_loading = false,
            UiErrorContext::SaveNote => self.saving = false,
            UiErrorContext::DeleteNote
            | UiErrorContext::ToggleStar
            | UiErrorContext::BackendStartup
            | UiErrorContext::General => {}
        }
        self.error = Some(message);
        Vec::new()
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
