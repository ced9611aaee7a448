use super::*;
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use shared::{
    domain::{NoteColor, NoteStatus},
    error::{ErrorCode, GENERIC_API_FAILURE},
};
use tokio::{net::TcpListener, sync::Mutex};

const VALID_TOKEN: &str = "tok-demo";

#[derive(Default)]
struct Backend {
    notes: Vec<Value>,
    next_id: i64,
    seen_auth_headers: Vec<Option<String>>,
    last_body: Option<Value>,
}

#[derive(Clone, Default)]
struct ServerState {
    backend: Arc<Mutex<Backend>>,
}

fn err(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn authorize(state: &ServerState, headers: &HeaderMap) -> bool {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {VALID_TOKEN}");
    let ok = header.as_deref() == Some(expected.as_str());
    state.backend.lock().await.seen_auth_headers.push(header);
    ok
}

async fn handle_login(Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == "demo@example.com" && body["password"] == "demo123456" {
        Json(json!({
            "token": VALID_TOKEN,
            "user": { "id": 1, "email": "demo@example.com" }
        }))
        .into_response()
    } else {
        err(StatusCode::UNAUTHORIZED, "Invalid email or password")
    }
}

async fn handle_signup(Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == "taken@example.com" {
        return err(StatusCode::CONFLICT, "User already exists");
    }
    (StatusCode::CREATED, Json(json!({ "token": VALID_TOKEN }))).into_response()
}

async fn handle_list(State(state): State<ServerState>, headers: HeaderMap) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Invalid or expired token");
    }
    let backend = state.backend.lock().await;
    Json(json!({ "data": backend.notes })).into_response()
}

async fn handle_create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut backend = state.backend.lock().await;
    backend.next_id += 1;
    let note = json!({
        "id": backend.next_id,
        "user_id": 1,
        "title": body["title"],
        "content": body["content"],
        "color": body["color"],
        "status": body["status"],
        "starred": false,
        "created_at": "2024-03-01T12:00:00Z",
        "updated_at": "2024-03-01T12:00:00Z"
    });
    backend.last_body = Some(body);
    backend.notes.push(note.clone());
    (StatusCode::CREATED, Json(json!({ "data": note }))).into_response()
}

fn find_note(backend: &mut Backend, id: i64) -> Option<&mut Value> {
    backend.notes.iter_mut().find(|note| note["id"] == id)
}

async fn handle_get(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if id == 999 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    let mut backend = state.backend.lock().await;
    match find_note(&mut backend, id) {
        Some(note) => Json(json!({ "data": note })).into_response(),
        None => err(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn handle_update(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut backend = state.backend.lock().await;
    backend.last_body = Some(body.clone());
    let Some(note) = find_note(&mut backend, id) else {
        return err(StatusCode::NOT_FOUND, "Note not found");
    };
    for key in ["title", "content", "color", "status", "starred"] {
        if let Some(value) = body.get(key) {
            note[key] = value.clone();
        }
    }
    let note = note.clone();
    Json(json!({ "data": note })).into_response()
}

async fn handle_delete(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut backend = state.backend.lock().await;
    let before = backend.notes.len();
    backend.notes.retain(|note| note["id"] != id);
    if backend.notes.len() == before {
        return err(StatusCode::NOT_FOUND, "Note not found");
    }
    Json(json!({ "message": "Note deleted successfully" })).into_response()
}

async fn handle_star(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if !authorize(&state, &headers).await {
        return err(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut backend = state.backend.lock().await;
    let Some(note) = find_note(&mut backend, id) else {
        return err(StatusCode::NOT_FOUND, "Note not found");
    };
    let starred = note["starred"].as_bool().unwrap_or(false);
    note["starred"] = json!(!starred);
    let note = note.clone();
    Json(json!({ "data": note })).into_response()
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Notes API is running" }))
}

async fn spawn_notes_server() -> std::io::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/signup", post(handle_signup))
        .route("/api/notes", get(handle_list).post(handle_create))
        .route(
            "/api/notes/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/api/notes/:id/star", patch(handle_star))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

fn client_with(base_url: &str, tokens: Arc<MemoryTokenStore>) -> NotesClient {
    NotesClient::new(base_url, tokens)
}

fn demo_credentials() -> Credentials {
    Credentials {
        email: "demo@example.com".into(),
        password: "demo123456".into(),
    }
}

fn sample_draft(title: &str) -> NoteDraft {
    NoteDraft {
        title: title.into(),
        content: "body".into(),
        color: NoteColor::Blue,
        status: NoteStatus::TodoInProgress,
    }
}

#[tokio::test]
async fn login_persists_token_and_later_requests_carry_bearer() {
    let (base_url, state) = spawn_notes_server().await.expect("spawn server");
    let tokens = Arc::new(MemoryTokenStore::default());
    let client = client_with(&base_url, tokens.clone());
    assert!(!client.is_authenticated());

    let auth = client.login(&demo_credentials()).await.expect("login");
    assert_eq!(auth.token, VALID_TOKEN);
    assert_eq!(auth.user.expect("user").email, "demo@example.com");
    assert_eq!(tokens.load().expect("load").as_deref(), Some(VALID_TOKEN));
    assert!(client.is_authenticated());

    let notes = client.list_notes().await.expect("list");
    assert!(notes.is_empty());
    let backend = state.backend.lock().await;
    assert_eq!(
        backend.seen_auth_headers,
        vec![Some(format!("Bearer {VALID_TOKEN}"))]
    );
}

#[tokio::test]
async fn rejected_login_surfaces_server_message_and_keeps_signed_out() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let tokens = Arc::new(MemoryTokenStore::default());
    let client = client_with(&base_url, tokens.clone());

    let err = client
        .login(&Credentials {
            email: "demo@example.com".into(),
            password: "wrong-password".into(),
        })
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(err.status(), Some(401));
    assert!(tokens.load().expect("load").is_none());
}

#[tokio::test]
async fn signup_stores_token_and_reports_conflicts() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let tokens = Arc::new(MemoryTokenStore::default());
    let client = client_with(&base_url, tokens.clone());

    let err = client
        .signup(&Credentials {
            email: "taken@example.com".into(),
            password: "secret123".into(),
        })
        .await
        .expect_err("conflict");
    match &err {
        ClientError::Api(api) => assert_eq!(api.code, ErrorCode::Conflict),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.requires_reauth());

    client
        .signup(&Credentials {
            email: "new@example.com".into(),
            password: "secret123".into(),
        })
        .await
        .expect("signup");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn note_lifecycle_unwraps_data_envelopes() {
    let (base_url, state) = spawn_notes_server().await.expect("spawn server");
    let client = client_with(&base_url, Arc::new(MemoryTokenStore::with_token(VALID_TOKEN)));

    let created = client
        .create_note(&sample_draft("Plan sprint"))
        .await
        .expect("create");
    assert_eq!(created.title, "Plan sprint");
    assert_eq!(created.color, NoteColor::Blue);
    assert_eq!(created.status, NoteStatus::TodoInProgress);
    assert!(!created.starred);
    assert_eq!(
        state.backend.lock().await.last_body,
        Some(json!({
            "title": "Plan sprint",
            "content": "body",
            "color": "customblue",
            "status": "todo:inprogress"
        }))
    );

    let fetched = client.get_note(created.id).await.expect("get");
    assert_eq!(fetched, created);

    let updated = client
        .update_note(
            created.id,
            &NoteUpdate {
                title: "Plan sprint 12".into(),
                content: "body".into(),
                color: NoteColor::Red,
                status: NoteStatus::TodoDone,
                starred: Some(true),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.title, "Plan sprint 12");
    assert_eq!(updated.status, NoteStatus::TodoDone);
    assert!(updated.starred);

    let toggled = client.toggle_star(created.id).await.expect("star");
    assert!(!toggled.starred);

    client.delete_note(created.id).await.expect("delete");
    assert!(client.list_notes().await.expect("list").is_empty());

    let missing = client.get_note(created.id).await.expect_err("gone");
    assert_eq!(missing.to_string(), "Note not found");
    assert!(!missing.requires_reauth());
}

#[tokio::test]
async fn non_json_failure_uses_generic_message() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let client = client_with(&base_url, Arc::new(MemoryTokenStore::with_token(VALID_TOKEN)));

    let err = client.get_note(NoteId(999)).await.expect_err("500");
    assert_eq!(err.to_string(), GENERIC_API_FAILURE);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn stale_token_requires_reauth_and_ends_session() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let tokens = Arc::new(MemoryTokenStore::with_token("expired"));
    let client = client_with(&base_url, tokens.clone());

    let err = client.list_notes().await.expect_err("401");
    assert!(err.requires_reauth());
    assert!(client.end_session_on_auth_failure(&err));
    assert!(tokens.load().expect("load").is_none());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn note_calls_without_token_fail_before_sending() {
    let (base_url, state) = spawn_notes_server().await.expect("spawn server");
    let client = client_with(&base_url, Arc::new(MemoryTokenStore::default()));

    let err = client.list_notes().await.expect_err("signed out");
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(err.requires_reauth());
    assert!(state.backend.lock().await.seen_auth_headers.is_empty());
}

#[tokio::test]
async fn non_auth_failures_keep_the_session() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let tokens = Arc::new(MemoryTokenStore::with_token(VALID_TOKEN));
    let client = client_with(&base_url, tokens.clone());

    let err = client.toggle_star(NoteId(404)).await.expect_err("404");
    assert!(!client.end_session_on_auth_failure(&err));
    assert_eq!(tokens.load().expect("load").as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn logout_clears_token() {
    let tokens = Arc::new(MemoryTokenStore::with_token(VALID_TOKEN));
    let client = client_with("http://127.0.0.1:9/api", tokens.clone());
    assert!(client.is_authenticated());
    client.logout().expect("logout");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn health_check_reads_status() {
    let (base_url, _state) = spawn_notes_server().await.expect("spawn server");
    let client = client_with(&base_url, Arc::new(MemoryTokenStore::default()));
    let health = client.health().await.expect("health");
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = NotesClient::from_settings(
        &ClientSettings {
            api_base_url: "http://127.0.0.1:9/api/".into(),
            request_timeout_secs: 2,
            ..ClientSettings::default()
        },
        Arc::new(MemoryTokenStore::with_token(VALID_TOKEN)),
    )
    .expect("client");
    assert_eq!(client.base_url(), "http://127.0.0.1:9/api");

    let err = client.list_notes().await.expect_err("unreachable");
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(!err.requires_reauth());
}
