use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub wikipedia: WikipediaSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served under `/static`. Relative paths resolve against the
    /// application directory.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Standalone Prometheus scrape listener, separate from the app's `/metrics` route.
#[derive(Deserialize, Clone, Debug)]
pub struct MetricsSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_metrics_port(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct WikipediaSettings {
    /// MediaWiki Action API endpoint (e.g., https://en.wikipedia.org/w/api.php).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Resolve the term through a search query first and use the top hit or suggestion.
    #[serde(default = "default_true")]
    pub auto_suggest: bool,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
    /// Unset means lookups are never cut short.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl WikipediaSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            auto_suggest: true,
            follow_redirects: true,
            timeout_secs: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_metrics_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "ico".to_string()
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    format!("wiki-search/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Directory holding `config/`, `ico/` and friends.
///
/// Works both when launched from the crate directory and from the workspace root.
pub fn app_directory() -> std::io::Result<PathBuf> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with("wiki-search") {
        Ok(base_path)
    } else {
        Ok(base_path.join("wiki-search"))
    }
}

/// Resolve a possibly relative path against the application directory.
pub fn resolve_path(app_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        app_dir.join(path)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let app_dir = app_directory().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    load_from(&app_dir.join("config"))
}

/// Build settings from `<dir>/base.yaml` (optional) and `APP_*` environment overrides.
pub fn load_from(configuration_directory: &Path) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
