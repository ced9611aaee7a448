use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const SETTINGS_FILE: &str = "notes.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            token_path: default_token_path(),
            request_timeout_secs: 15,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    token_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

/// Per-user token location, falling back to the working directory.
pub fn default_token_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notes_client")
        .join("token")
}

/// Defaults, then `notes.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.token_path {
                    settings.token_path = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
            }
            Err(err) => warn!(path = %file.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    if let Some(v) = env("NOTES_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("NOTES_TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("notes_client_{tag}_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let settings = load_settings_from(Path::new("/nonexistent/notes.toml"), |_| None);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.request_timeout_secs, 15);
        assert!(settings.token_path.ends_with("notes_client/token"));
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = temp_dir("settings");
        let file = dir.join("notes.toml");
        fs::write(
            &file,
            "api_base_url = \"http://notes.internal/api/\"\nrequest_timeout_secs = 3\ntoken_path = \"/tmp/file-token\"\n",
        )
        .expect("write settings");

        let from_file = load_settings_from(&file, |_| None);
        assert_eq!(from_file.api_base_url, "http://notes.internal/api");
        assert_eq!(from_file.request_timeout_secs, 3);
        assert_eq!(from_file.token_path, PathBuf::from("/tmp/file-token"));

        let vars = HashMap::from([
            ("NOTES_API_URL", "http://ignored:1/api"),
            ("APP__API_BASE_URL", "http://127.0.0.1:9000/api"),
            ("NOTES_TOKEN_PATH", "/tmp/env-token"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]);
        let merged = load_settings_from(&file, |key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(merged.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(merged.token_path, PathBuf::from("/tmp/env-token"));
        assert_eq!(merged.request_timeout_secs, 3);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = temp_dir("bad_settings");
        let file = dir.join("notes.toml");
        fs::write(&file, "api_base_url = [").expect("write settings");

        let settings = load_settings_from(&file, |_| None);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(normalize_base_url(" http://x/api// "), "http://x/api");
        assert_eq!(normalize_base_url(""), DEFAULT_API_BASE_URL);
    }
}
