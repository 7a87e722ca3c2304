//! Configuration for the pushling workspace.
//!
//! Loads a TOML file (default `$XDG_CONFIG_HOME/pushling/config.toml`),
//! applies `PUSHLING_*` environment overrides and validates the result.
//! Loading always produces a fresh immutable snapshot; the daemon re-reads
//! the file on SIGHUP and swaps snapshots instead of mutating shared state.

use std::{
    collections::{BTreeMap, BTreeSet},
    env, fmt, fs, path,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("no config path available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
}

/// Sensitive string (push tokens, passwords, signing secrets).
///
/// `Debug` and `Display` render a placeholder so secrets cannot leak through
/// logs or error messages; call [`Secret::expose`] at the point of use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(**********)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**********")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".into(), format: "compact".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub username: Option<String>,
    pub password: Option<Secret>,
    /// Whether protected endpoints require a Bearer token.
    pub required: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { username: None, password: None, required: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub secret: Option<Secret>,
    pub expire_seconds: u64,
    pub leeway_seconds: u64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self { secret: None, expire_seconds: 900, leeway_seconds: 15 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreeterSettings {
    pub prefix: String,
}

impl Default for GreeterSettings {
    fn default() -> Self {
        Self { prefix: "hello".into() }
    }
}

/// HTTP API settings consumed by `pushling-server`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub auth: AuthSettings,
    pub jwt: JwtSettings,
    pub greeter: GreeterSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            auth: AuthSettings::default(),
            jwt: JwtSettings::default(),
            greeter: GreeterSettings::default(),
        }
    }
}

/// Descriptor for the process executor of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Command to run. The child environment is not inherited, so this
    /// should be an absolute path.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Supported output parsers. A closed set, selected per check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    #[default]
    Nagios,
}

/// Where a check result goes. A closed set, selected per check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublisherConfig {
    Stdout,
    UptimeKuma { url: String, push_token: Secret },
}

/// One configured unit of periodic monitoring work. Immutable after load;
/// its name keys the scheduler job and correlates log lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub parser: ParserKind,
    pub publisher: PublisherConfig,
    /// Interval between runs, in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogSettings,
    pub server: ServerSettings,
    pub checks: Vec<Check>,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/pushling/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("pushling/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  Log")?;
        writeln!(f, "    Level: {}", self.log.level)?;
        writeln!(f, "    Format: {}", self.log.format)?;
        writeln!(f, "  Server")?;
        writeln!(f, "    Address: {}:{}", self.server.host, self.server.port)?;
        writeln!(f, "  Checks")?;
        for check in &self.checks {
            let sink = match &check.publisher {
                PublisherConfig::Stdout => "stdout".to_string(),
                PublisherConfig::UptimeKuma { url, .. } => format!("uptime_kuma ({url})"),
            };
            writeln!(
                f,
                "    {}: {} every {}s -> {}",
                check.name, check.executor.command, check.interval, sink
            )?;
        }
        Ok(())
    }
}

impl Config {
    /// Load, overlay environment variables and validate.
    ///
    /// This is the entry point both binaries use; a config that fails
    /// validation is rejected before anything gets scheduled or served.
    /// When no path is given, `PUSHLING_CONFIG` is consulted before the
    /// default location.
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let mut config = match optional_path {
            Some(path) => Self::from_config(Some(path)),
            None => match env::var("PUSHLING_CONFIG") {
                Ok(path) => Self::from_config(Some(path::PathBuf::from(path))),
                Err(_) => Self::from_config(None::<&path::Path>),
            },
        }?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/pushling/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(Error::Read)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::Write)?;
        }

        fs::write(path, config_str).map_err(Error::Write)
    }

    /// Overlay scalar settings from `PUSHLING_*` environment variables.
    /// Nested fields use `__` as the delimiter, e.g. `PUSHLING_LOG__LEVEL`.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(level) = get("PUSHLING_LOG__LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = get("PUSHLING_LOG__FORMAT") {
            self.log.format = format;
        }
        if let Some(host) = get("PUSHLING_SERVER__HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PUSHLING_SERVER__PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(username) = get("PUSHLING_SERVER__AUTH__USERNAME") {
            self.server.auth.username = Some(username);
        }
        if let Some(password) = get("PUSHLING_SERVER__AUTH__PASSWORD") {
            self.server.auth.password = Some(Secret::new(password));
        }
        if let Some(secret) = get("PUSHLING_SERVER__JWT__SECRET") {
            self.server.jwt.secret = Some(Secret::new(secret));
        }
    }

    /// Reject configurations that would schedule a broken job.
    fn validate(&self) -> Result<(), Error> {
        let mut seen = BTreeSet::new();
        for check in &self.checks {
            if check.name.trim().is_empty() {
                return Err(Error::Invalid("check with an empty name".into()));
            }
            if !seen.insert(check.name.as_str()) {
                return Err(Error::Invalid(format!("duplicate check name: {}", check.name)));
            }
            if check.interval == 0 {
                return Err(Error::Invalid(format!(
                    "check {}: interval must be positive",
                    check.name
                )));
            }
            if check.executor.command.trim().is_empty() {
                return Err(Error::Invalid(format!("check {}: empty command", check.name)));
            }
            if let PublisherConfig::UptimeKuma { url, push_token } = &check.publisher {
                let parsed = url::Url::parse(url).map_err(|e| {
                    Error::Invalid(format!("check {}: invalid push url: {e}", check.name))
                })?;
                match parsed.scheme() {
                    "http" | "https" => {}
                    other => {
                        return Err(Error::Invalid(format!(
                            "check {}: unsupported push url scheme: {other}",
                            check.name
                        )));
                    }
                }
                if push_token.is_empty() {
                    return Err(Error::Invalid(format!("check {}: empty push token", check.name)));
                }
            }
        }
        if self.server.jwt.expire_seconds == 0 {
            return Err(Error::Invalid("jwt.expire_seconds must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [log]
        level = "debug"

        [server]
        port = 9000

        [[checks]]
        name = "disk"
        interval = 120

        [checks.executor]
        command = "/usr/lib/nagios/plugins/check_disk"
        args = ["-w", "20%"]

        [checks.publisher]
        kind = "uptime_kuma"
        url = "https://kuma.example.org"
        push_token = "tok123"

        [[checks]]
        name = "load"

        [checks.executor]
        command = "/usr/lib/nagios/plugins/check_load"

        [checks.publisher]
        kind = "stdout"
    "#;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("sample config should parse")
    }

    #[test]
    fn parses_full_config() {
        let config = parse(SAMPLE);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.checks.len(), 2);

        let disk = &config.checks[0];
        assert_eq!(disk.name, "disk");
        assert_eq!(disk.interval, 120);
        assert_eq!(disk.parser, ParserKind::Nagios);
        match &disk.publisher {
            PublisherConfig::UptimeKuma { url, push_token } => {
                assert_eq!(url, "https://kuma.example.org");
                assert_eq!(push_token.expose(), "tok123");
            }
            other => panic!("unexpected publisher: {other:?}"),
        }

        let load = &config.checks[1];
        assert_eq!(load.interval, 60);
        assert_eq!(load.publisher, PublisherConfig::Stdout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn writes_default_config_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let config = Config::from_config(Some(&path)).expect("default config");
        assert!(path.exists());
        assert!(config.checks.is_empty());

        // A second load reads the file that was just written.
        let reread = Config::from_config(Some(&path)).expect("reread");
        assert_eq!(reread.server.port, config.server.port);
    }

    #[test]
    fn normalizes_extension() {
        let normalized = normalize_toml_path(path::Path::new("/tmp/pushling/config"));
        assert_eq!(normalized, path::PathBuf::from("/tmp/pushling/config.toml"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut config = parse(SAMPLE);
        let mut copy = config.checks[0].clone();
        copy.interval = 30;
        config.checks.push(copy);
        assert!(matches!(config.validate(), Err(Error::Invalid(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = parse(SAMPLE);
        config.checks[0].interval = 0;
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn rejects_bad_push_url() {
        let mut config = parse(SAMPLE);
        config.checks[0].publisher = PublisherConfig::UptimeKuma {
            url: "not a url".into(),
            push_token: Secret::new("tok"),
        };
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn rejects_empty_push_token() {
        let mut config = parse(SAMPLE);
        config.checks[0].publisher = PublisherConfig::UptimeKuma {
            url: "https://kuma.example.org".into(),
            push_token: Secret::new(""),
        };
        assert!(matches!(config.validate(), Err(Error::Invalid(msg)) if msg.contains("token")));
    }

    #[test]
    fn env_overrides_scalars() {
        let mut config = parse(SAMPLE);
        config.apply_overrides_from(|key| match key {
            "PUSHLING_LOG__LEVEL" => Some("warn".into()),
            "PUSHLING_SERVER__PORT" => Some("8125".into()),
            "PUSHLING_SERVER__JWT__SECRET" => Some("sekrit".into()),
            _ => None,
        });
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.server.port, 8125);
        assert_eq!(config.server.jwt.secret.as_ref().map(Secret::expose), Some("sekrit"));
    }

    #[test]
    fn secrets_never_render() {
        let secret = Secret::new("push-token-value");
        assert!(!format!("{secret:?}").contains("push-token-value"));
        assert!(!format!("{secret}").contains("push-token-value"));
        assert_eq!(secret.expose(), "push-token-value");
    }
}
