use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::error::TodoClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_FILE: &str = "todo.toml";

/// How local state is brought back in line with the service after a
/// successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Apply the requested change to the local record.
    #[default]
    Mirror,
    /// Re-fetch the whole collection.
    Refetch,
}

impl FromStr for ReconcileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mirror" => Ok(ReconcileMode::Mirror),
            "refetch" => Ok(ReconcileMode::Refetch),
            other => Err(format!(
                "unknown reconcile mode '{other}' (expected mirror or refetch)"
            )),
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileMode::Mirror => f.write_str("mirror"),
            ReconcileMode::Refetch => f.write_str("refetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub reconcile: ReconcileMode,
    /// `None` keeps the transport default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            reconcile: ReconcileMode::default(),
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    reconcile: Option<ReconcileMode>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then environment overrides.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let path = std::env::var("TODO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut settings = ClientSettings::default();
    apply_file(&mut settings, &path)?;
    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, path: &Path) -> anyhow::Result<()> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };

    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.reconcile {
        settings.reconcile = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("TODO_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__RECONCILE") {
        match v.parse() {
            Ok(mode) => settings.reconcile = mode,
            Err(err) => tracing::warn!("ignoring APP__RECONCILE: {err}"),
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}

/// Validates the base url and gives it a trailing slash, so that
/// `todos` joins under any path prefix the service is mounted at.
pub fn normalize_api_base_url(raw: &str) -> Result<Url, TodoClientError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| TodoClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("empty".to_string()));
    }

    let mut url = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base url".to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_local_service() {
        let settings = ClientSettings::default();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.reconcile, ReconcileMode::Mirror);
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn env_overrides_prefer_app_prefix() {
        let mut settings = ClientSettings::default();
        apply_env(
            &mut settings,
            lookup_from(&[
                ("TODO_API_URL", "http://todo.internal:9000"),
                ("APP__API_URL", "https://api.example.com"),
                ("APP__RECONCILE", "Refetch"),
                ("APP__REQUEST_TIMEOUT_SECS", "15"),
            ]),
        );
        assert_eq!(settings.api_base_url, "https://api.example.com");
        assert_eq!(settings.reconcile, ReconcileMode::Refetch);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut settings = ClientSettings::default();
        apply_env(
            &mut settings,
            lookup_from(&[
                ("APP__RECONCILE", "sometimes"),
                ("APP__REQUEST_TIMEOUT_SECS", "soon"),
            ]),
        );
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn file_settings_layer_over_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("todo_client_settings_{suffix}.toml"));
        fs::write(
            &path,
            "api_base_url = \"http://10.0.0.5:8000\"\nreconcile = \"refetch\"\n",
        )
        .expect("write config");

        let mut settings = ClientSettings::default();
        apply_file(&mut settings, &path).expect("apply file");
        assert_eq!(settings.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(settings.reconcile, ReconcileMode::Refetch);
        assert_eq!(settings.request_timeout_secs, None);

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut settings = ClientSettings::default();
        apply_file(
            &mut settings,
            Path::new("/nonexistent/definitely/not/here/todo.toml"),
        )
        .expect("missing file is fine");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn zero_timeout_means_transport_default() {
        let settings = ClientSettings {
            request_timeout_secs: Some(0),
            ..ClientSettings::default()
        };
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn normalizes_base_url_with_trailing_slash() {
        let url = normalize_api_base_url(" http://localhost:8000 ").expect("url");
        assert_eq!(url.as_str(), "http://localhost:8000/");

        let prefixed = normalize_api_base_url("https://example.com/api?x=1").expect("url");
        assert_eq!(prefixed.as_str(), "https://example.com/api/");
        assert_eq!(
            prefixed.join("todos").expect("join").as_str(),
            "https://example.com/api/todos"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(normalize_api_base_url("").is_err());
        assert!(normalize_api_base_url("localhost:8000/todos").is_err());
        assert!(normalize_api_base_url("ftp://example.com").is_err());
        assert!(matches!(
            normalize_api_base_url("not a url"),
            Err(TodoClientError::InvalidBaseUrl { .. })
        ));
    }
}
