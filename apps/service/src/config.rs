use std::time::Duration;
use std::{env, fmt, fs, io, path};

use checks::{DEFAULT_WINDOW_SIZE, ManagerConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {0}: {1}")]
    ReadFailed(path::PathBuf, #[source] io::Error),

    #[error("Failed to write {0}: {1}")]
    WriteFailed(path::PathBuf, #[source] io::Error),

    #[error("Failed to parse {0}: {1}")]
    ParseFailed(path::PathBuf, #[source] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("No configuration directory available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub manager: Manager,
    #[serde(default)]
    pub monitors: Vec<MonitorDefinition>,
}

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manager {
    pub threads: usize,
    pub window_size: usize,
    pub queue_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_redirects: usize,
    pub report_interval_secs: u64,
}

impl Default for Manager {
    fn default() -> Self {
        Self {
            threads: 10,
            window_size: DEFAULT_WINDOW_SIZE,
            queue_timeout_secs: 3,
            request_timeout_secs: 30,
            max_redirects: 10,
            report_interval_secs: 30,
        }
    }
}

impl Manager {
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::default()
            .with_thread_count(self.threads)
            .with_window_size(self.window_size)
            .with_queue_timeout(Duration::from_secs(self.queue_timeout_secs.max(1)))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs.max(1)))
            .with_max_redirects(self.max_redirects)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }
}

/// Either a number or a string holding one, as stored monitor definitions
/// may carry either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{n}"),
            NumberOrText::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDefinition {
    pub key: String,
    pub value: String,
}

/// A monitor as stored by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorDefinition {
    pub name: String,
    pub slug: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    pub server: String,
    #[serde(default = "default_port")]
    pub port: NumberOrText,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_verb")]
    pub verb: NumberOrText,
    pub frequency: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderDefinition>,
}

fn default_scheme() -> String {
    checks::endpoint::DEFAULT_SCHEME.to_string()
}

fn default_port() -> NumberOrText {
    NumberOrText::Number(i64::from(checks::endpoint::DEFAULT_PORT))
}

fn default_verb() -> NumberOrText {
    NumberOrText::Text(checks::HttpVerb::Get.to_string())
}

fn default_enabled() -> bool {
    true
}

/// Monitor files given on the command line are always read as `.toml`,
/// whatever extension was typed.
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Where the monitor definitions live when `--config` is not given.
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("epmonitor/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manager: Manager::default(),
            monitors: vec![MonitorDefinition {
                name: "Example".into(),
                slug: "example".into(),
                scheme: default_scheme(),
                server: "example.com".into(),
                port: default_port(),
                path: String::new(),
                verb: default_verb(),
                frequency: 60,
                enabled: false,
                payload: None,
                headers: Vec::new(),
            }],
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_title_2 = write_title_indented(2);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Manager")?;
        write_1(f, "Threads", &self.manager.threads)?;
        write_1(f, "Window Size", &self.manager.window_size)?;
        write_1(f, "Queue Timeout (s)", &self.manager.queue_timeout_secs)?;
        write_1(f, "Request Timeout (s)", &self.manager.request_timeout_secs)?;
        write_1(f, "Max Redirects", &self.manager.max_redirects)?;
        write_1(f, "Report Interval (s)", &self.manager.report_interval_secs)?;

        write_title_1(f, "Monitors")?;
        for monitor in &self.monitors {
            write_title_2(f, &format!("{} ({})", monitor.name, monitor.slug))?;
            let target = format!(
                "{} {}://{}:{}/{}",
                monitor.verb,
                monitor.scheme,
                monitor.server,
                monitor.port,
                monitor.path.trim_start_matches('/'),
            );
            write_2(f, "Target", &target)?;
            write_2(f, "Frequency (s)", &monitor.frequency)?;
            write_2(f, "Enabled", &monitor.enabled)?;
            write_2(f, "Headers", &monitor.headers.len())?;
        }

        Ok(())
    }
}

impl Config {
    /// Load the manager settings and monitor definitions.
    ///
    /// A missing file is created with the defaults and a single disabled
    /// example monitor, so a first run leaves something to edit.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|err| Error::ReadFailed(config_path.clone(), err))?;
            toml::from_str(raw_string.as_str()).map_err(|err| Error::ParseFailed(config_path, err))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::WriteFailed(path.to_path_buf(), err))?;
        }

        fs::write(path, config_str).map_err(|err| Error::WriteFailed(path.to_path_buf(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[manager]
threads = 4
report_interval_secs = 15

[[monitors]]
name = "Homepage"
slug = "homepage"
server = "example.com"
frequency = 10

[[monitors]]
name = "Orders API"
slug = "orders-api"
scheme = "http"
server = "10.0.0.8"
port = "8080"
path = "/v1/orders"
verb = 2
frequency = 30
enabled = false
payload = '{"probe":true}'
headers = [
    { key = "Content-Type", value = "application/json" },
    { key = "X-Trace", value = "1" },
]
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.manager.threads, 4);
        assert_eq!(config.manager.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(config.manager.report_interval(), Duration::from_secs(15));

        let homepage = &config.monitors[0];
        assert_eq!(homepage.scheme, "https");
        assert_eq!(homepage.port, NumberOrText::Number(443));
        assert_eq!(homepage.verb, NumberOrText::Text("GET".into()));
        assert!(homepage.enabled);
        assert!(homepage.headers.is_empty());

        let orders = &config.monitors[1];
        assert_eq!(orders.port, NumberOrText::Text("8080".into()));
        assert_eq!(orders.verb, NumberOrText::Number(2));
        assert!(!orders.enabled);
        assert_eq!(orders.headers.len(), 2);
        assert_eq!(orders.headers[1].key, "X-Trace");
    }

    #[test]
    fn test_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/epmonitor");

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config, Config::default());

        let written = dir.path().join("nested/epmonitor.toml");
        assert!(written.exists());
        assert_eq!(Config::from_config(Some(&written)).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[manager]\nthreads = \"many\"\n").unwrap();

        let err = Config::from_config(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ParseFailed(..)));
    }

    #[test]
    fn test_manager_config_conversion() {
        let manager = Manager {
            threads: 3,
            window_size: 5,
            request_timeout_secs: 0,
            ..Manager::default()
        };
        let config = manager.manager_config();
        assert_eq!(config.thread_count, 3);
        assert_eq!(config.window_size, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_display_lists_monitors() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let rendered = config.to_string();
        assert!(rendered.contains("Threads: 4"));
        assert!(rendered.contains("Orders API (orders-api)"));
        assert!(rendered.contains("2 http://10.0.0.8:8080/v1/orders"));
    }
}
