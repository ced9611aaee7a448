use std::sync::Mutex;

use async_trait::async_trait;
use client_core::{NoteForm, Result};
use shared::{
    domain::{Note, NoteColor, NoteId, NoteStatus},
    error::ApiError,
    protocol::{AuthResponse, Credentials, NoteDraft, NoteUpdate},
};

use super::*;
use crate::controller::events::UiErrorCategory;

struct StubApi {
    token: Mutex<Option<String>>,
    failure: Option<(u16, &'static str)>,
    star_failure: Option<(u16, &'static str)>,
}

impl StubApi {
    fn signed_in() -> Self {
        Self {
            token: Mutex::new(Some("tok-demo".into())),
            failure: None,
            star_failure: None,
        }
    }

    fn failing(status: u16, message: &'static str) -> Self {
        Self {
            failure: Some((status, message)),
            ..Self::signed_in()
        }
    }

    fn check(&self) -> Result<()> {
        fail_with(self.failure)
    }

    fn has_token(&self) -> bool {
        self.token.lock().map(|t| t.is_some()).unwrap_or(false)
    }
}

fn fail_with(failure: Option<(u16, &'static str)>) -> Result<()> {
    match failure {
        Some((status, message)) => Err(ApiError::new(status, message).into()),
        None => Ok(()),
    }
}

fn note(id: i64, title: &str, starred: bool) -> Note {
    Note {
        id: NoteId(id),
        user_id: None,
        title: title.into(),
        content: String::new(),
        color: NoteColor::Red,
        status: NoteStatus::Note,
        starred,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl NotesApi for StubApi {
    async fn signup(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.login(credentials).await
    }

    async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse> {
        self.check()?;
        *self.token.lock().expect("token lock") = Some("tok-new".into());
        Ok(AuthResponse {
            token: "tok-new".into(),
            user: None,
        })
    }

    fn logout(&self) -> Result<()> {
        *self.token.lock().expect("token lock") = None;
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.has_token()
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.check()?;
        Ok(vec![note(1, "Groceries", false)])
    }

    async fn get_note(&self, id: NoteId) -> Result<Note> {
        self.check()?;
        Ok(note(id.0, "Loaded", false))
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Note> {
        self.check()?;
        Ok(note(11, &draft.title, false))
    }

    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<Note> {
        self.check()?;
        Ok(note(id.0, &update.title, update.starred.unwrap_or(false)))
    }

    async fn delete_note(&self, _id: NoteId) -> Result<()> {
        self.check()
    }

    async fn toggle_star(&self, id: NoteId) -> Result<Note> {
        self.check()?;
        fail_with(self.star_failure)?;
        Ok(note(id.0, "Starred", true))
    }
}

fn credentials() -> Credentials {
    Credentials {
        email: "demo@example.com".into(),
        password: "demo123456".into(),
    }
}

#[tokio::test]
async fn login_reports_email() {
    let api = StubApi::signed_in();
    match handle_command(&api, BackendCommand::Login(credentials())).await {
        UiEvent::Authenticated { email } => assert_eq!(email, "demo@example.com"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_list_clears_token() {
    let api = StubApi::failing(401, "Unauthorized");
    match handle_command(&api, BackendCommand::LoadNotes).await {
        UiEvent::Error(err) => {
            assert_eq!(err.category(), UiErrorCategory::Auth);
            assert_eq!(err.context(), UiErrorContext::LoadNotes);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!api.has_token());
}

#[tokio::test]
async fn rejected_login_leaves_token_alone() {
    let api = StubApi::failing(401, "Invalid email or password");
    match handle_command(&api, BackendCommand::Login(credentials())).await {
        UiEvent::Error(err) => assert_eq!(err.message(), "Invalid email or password"),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(api.has_token());
}

#[tokio::test]
async fn missing_note_keeps_session() {
    let api = StubApi::failing(404, "Note not found");
    match handle_command(&api, BackendCommand::LoadNote(NoteId(3))).await {
        UiEvent::Error(err) => {
            assert_eq!(err.category(), UiErrorCategory::NotFound);
            assert!(!err.requires_reauth());
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(api.has_token());
}

#[tokio::test]
async fn failed_star_toggle_names_the_note() {
    let api = StubApi::failing(500, "Failed to update note");
    match handle_command(&api, BackendCommand::ToggleStar(NoteId(8))).await {
        UiEvent::StarToggleFailed { id, error } => {
            assert_eq!(id, NoteId(8));
            assert_eq!(error.context(), UiErrorContext::ToggleStar);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn create_with_star_returns_starred_note() {
    let api = StubApi::signed_in();
    let form = NoteForm {
        title: "Launch".into(),
        starred: true,
        ..NoteForm::default()
    };
    match handle_command(&api, BackendCommand::CreateNote(form)).await {
        UiEvent::NoteSaved(note) => {
            assert_eq!(note.id, NoteId(11));
            assert!(note.starred);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn blank_title_is_a_validation_error() {
    let api = StubApi::signed_in();
    let cmd = BackendCommand::UpdateNote {
        id: NoteId(2),
        form: NoteForm::default(),
    };
    match handle_command(&api, cmd).await {
        UiEvent::Error(err) => {
            assert_eq!(err.category(), UiErrorCategory::Validation);
            assert_eq!(err.message(), "Title is required");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn create_survives_failed_star() {
    let api = StubApi {
        star_failure: Some((500, "Failed to toggle star")),
        ..StubApi::signed_in()
    };
    let form = NoteForm {
        title: "Groceries".into(),
        starred: true,
        ..NoteForm::default()
    };
    match handle_command(&api, BackendCommand::CreateNote(form)).await {
        UiEvent::CreatedWithoutStar { note, error } => {
            assert_eq!(note.id, NoteId(11));
            assert!(!note.starred);
            assert_eq!(error.context(), UiErrorContext::ToggleStar);
            assert_eq!(error.message(), "Failed to toggle star");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(api.has_token());
}
