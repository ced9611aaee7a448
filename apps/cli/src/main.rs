use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config, forms, ClientError, FileTokenStore, NoteForm, NotesApi, NotesBoard, NotesClient,
    NotesView,
};
use shared::{
    domain::{Note, NoteColor, NoteId, NoteStatus, UnknownVariant},
    validation,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notes", about = "Command-line client for the notes API")]
struct Cli {
    /// API base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Where the session token is kept
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the configured server, its health and whether a session is stored
    Status,
    /// List notes, optionally filtered by title
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        starred: bool,
    },
    /// List starred notes
    Starred {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Print one note
    Show { id: NoteId },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "yellow", value_parser = parse_color)]
        color: NoteColor,
        #[arg(long, default_value = "note", value_parser = parse_status)]
        status: NoteStatus,
        #[arg(long)]
        star: bool,
    },
    /// Change fields of an existing note; omitted fields keep their value
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_parser = parse_color)]
        color: Option<NoteColor>,
        #[arg(long, value_parser = parse_status)]
        status: Option<NoteStatus>,
        #[arg(long, conflicts_with = "unstar")]
        star: bool,
        #[arg(long)]
        unstar: bool,
    },
    Delete {
        id: NoteId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Toggle the starred flag
    Star { id: NoteId },
}

impl Command {
    /// Failures of these commands concern the credentials typed, not the stored session.
    fn signs_in(&self) -> bool {
        matches!(self, Command::Signup { .. } | Command::Login { .. })
    }
}

// Accepts the wire token, short name or label; anything else is a usage error.
fn parse_color(value: &str) -> Result<NoteColor, UnknownVariant> {
    value.parse()
}

fn parse_status(value: &str) -> Result<NoteStatus, UnknownVariant> {
    value.parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Failed,
    SessionEnded,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
            Outcome::SessionEnded => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = config::load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = config::normalize_base_url(&api_url);
    }
    if let Some(token_path) = cli.token_path {
        settings.token_path = token_path;
    }

    let tokens = Arc::new(FileTokenStore::new(&settings.token_path));
    let client = match NotesClient::from_settings(&settings, tokens) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error: failed to build HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };

    let signs_in = cli.command.signs_in();
    let result = run(&client, cli.command).await;
    settle(&client, signs_in, result).exit_code()
}

fn settle<A: NotesApi + ?Sized>(client: &A, signs_in: bool, result: Result<()>) -> Outcome {
    let Err(err) = result else {
        return Outcome::Done;
    };
    eprintln!("error: {err:#}");
    let ended = !signs_in
        && err
            .downcast_ref::<ClientError>()
            .is_some_and(|client_err| client.end_session_on_auth_failure(client_err));
    if ended {
        eprintln!("Session ended; run `notes login` to sign in again.");
        Outcome::SessionEnded
    } else {
        Outcome::Failed
    }
}

async fn run(client: &NotesClient, command: Command) -> Result<()> {
    match command {
        Command::Signup { email, password } => {
            let password = password_or_prompt(password)?;
            let credentials = validation::validate_credentials(&email, &password)?;
            client.signup(&credentials).await.context("sign up failed")?;
            println!("Signed up and signed in as {}", credentials.email);
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let credentials = validation::validate_credentials(&email, &password)?;
            client.login(&credentials).await.context("login failed")?;
            println!("Signed in as {}", credentials.email);
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Status => {
            println!("API: {}", client.base_url());
            match client.health().await {
                Ok(health) => println!("Server: {} {}", health.status, health.message),
                Err(err) => println!("Server: unreachable ({err})"),
            }
            let session = if client.is_authenticated() {
                "signed in"
            } else {
                "signed out"
            };
            println!("Session: {session}");
        }
        Command::List { search, starred } => {
            let view = if starred {
                NotesView::Starred
            } else {
                NotesView::All
            };
            print_board(client, view, search).await?;
        }
        Command::Starred { search } => print_board(client, NotesView::Starred, search).await?,
        Command::Show { id } => {
            let note = client.get_note(id).await?;
            print!("{}", render_note(&note));
        }
        Command::Create {
            title,
            content,
            color,
            status,
            star,
        } => {
            let form = NoteForm {
                title,
                content,
                color,
                status,
                starred: star,
            };
            let created = forms::create_from_form(client, &form).await?;
            let id = created.note.id;
            println!("Created note {id}");
            println!("{}", render_row(&created.note));
            if let Some(err) = created.star_error {
                return Err(anyhow::Error::new(err).context(format!(
                    "note {id} was created but could not be starred; run `notes star {id}` to retry"
                )));
            }
        }
        Command::Edit {
            id,
            title,
            content,
            color,
            status,
            star,
            unstar,
        } => {
            let current = client.get_note(id).await?;
            let mut form = NoteForm::from_note(&current);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(content) = content {
                form.content = content;
            }
            if let Some(color) = color {
                form.color = color;
            }
            if let Some(status) = status {
                form.status = status;
            }
            if star {
                form.starred = true;
            } else if unstar {
                form.starred = false;
            }
            let note = forms::save_from_form(client, id, &form).await?;
            println!("Saved note {}", note.id);
            println!("{}", render_row(&note));
        }
        Command::Delete { id, yes } => {
            if !yes
                && !confirm(
                    "Are you sure you want to delete this note? This action cannot be undone.",
                )?
            {
                println!("Cancelled");
                return Ok(());
            }
            client.delete_note(id).await?;
            println!("Deleted note {id}");
        }
        Command::Star { id } => {
            let note = client.toggle_star(id).await?;
            let state = if note.starred { "Starred" } else { "Unstarred" };
            println!("{state} note {}", note.id);
        }
    }
    Ok(())
}

async fn print_board(client: &NotesClient, view: NotesView, search: String) -> Result<()> {
    let mut board = NotesBoard::new(view);
    board.loaded(client.list_notes().await?);
    board.set_search(search);

    let visible = board.visible();
    if visible.is_empty() {
        println!("{}", board.empty_message());
        return Ok(());
    }
    for note in visible {
        println!("{}", render_row(note));
    }
    Ok(())
}

fn render_row(note: &Note) -> String {
    let star = if note.starred { '*' } else { ' ' };
    format!(
        "{star} {:>5}  {:<40}  {:<11}  {:<8}  {}",
        note.id.0,
        truncate(&note.title, 40),
        note.status.label(),
        note.color.label(),
        note.display_date()
    )
}

fn render_note(note: &Note) -> String {
    let mut out = format!("{}{}\n", note.title, if note.starred { " *" } else { "" });
    out.push_str(&format!(
        "id {} | {} | {} | {}\n",
        note.id,
        note.status.label(),
        note.color.label(),
        note.display_date()
    ));
    if !note.content.is_empty() {
        out.push('\n');
        out.push_str(&note.content);
        out.push('\n');
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let line = read_line()?;
    if line.is_empty() {
        bail!("no password given");
    }
    Ok(line)
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let answer = read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
