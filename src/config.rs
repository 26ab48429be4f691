//! urqr runtime configuration handling
//!
//! The encoded URL, the encoding parameters and the output filename are
//! fixed. Config files and `URQR_*` environment variables only reach the
//! ambient knobs: logging, the display policy and output verification.

use crate::error::{Error, Result};
use crate::output::DisplayPolicy;
use crate::qr::QrRequest;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// URL encoded on every run
pub const DEFAULT_PAYLOAD: &str = "https://snivallus.github.io/Multi-agent/";
/// Output file written (and overwritten) on every run
pub const DEFAULT_OUTPUT: &str = "url_QR_code.png";

const CWD_CANDIDATES: [&str; 3] = ["urqr.toml", "urqr.yaml", "urqr.yml"];
const XDG_CANDIDATES: [&str; 2] = ["config.toml", "config.yaml"];

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrqrConfig {
    /// Output verification
    pub qr: QrOptions,
    /// Display behaviour
    pub output: OutputOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl UrqrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    ///
    /// Runs before logging is installed, so the chosen file is recorded in
    /// [`UrqrConfig::source`] rather than logged here.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let source = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let cwd = env::current_dir()
                    .map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
                let xdg = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
                discover_file(&cwd, xdg.as_deref())
            }
        };

        let mut config = match &source {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.source = source;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(verify) = lookup("URQR_VERIFY").as_deref().and_then(parse_flag) {
            self.qr.verify = verify;
        }
        if let Some(display) = lookup("URQR_DISPLAY") {
            if let Ok(parsed) = display.parse::<DisplayPolicy>() {
                self.output.display = parsed;
            }
        }
        self.logging.apply_overrides(&lookup);
    }
}

/// First existing config file: `urqr.{toml,yaml,yml}` in `cwd`, then
/// `config.{toml,yaml}` under `<xdg>/urqr`.
fn discover_file(cwd: &Path, xdg_config: Option<&Path>) -> Option<PathBuf> {
    let local = CWD_CANDIDATES.iter().map(|name| cwd.join(name));
    let xdg = xdg_config
        .map(|base| base.join("urqr"))
        .into_iter()
        .flat_map(|dir| XDG_CANDIDATES.iter().map(move |name| dir.join(name)));

    local.chain(xdg).find(|path| path.exists())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Encoding-side options. The payload and symbol parameters are not
/// configurable; unknown keys such as `payload` are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrOptions {
    /// Decode the rendered image and compare it with the payload before saving
    pub verify: bool,
}

impl QrOptions {
    /// The request every run encodes: [`DEFAULT_PAYLOAD`] at version 1 with
    /// fit, level L, 10px boxes, a 4-module border, black on white.
    pub fn to_request(&self) -> QrRequest {
        QrRequest::new(DEFAULT_PAYLOAD)
    }
}

/// Output file and display behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOptions {
    /// PNG file written (and overwritten) on every run. Not read from files
    /// or the environment.
    #[serde(skip)]
    pub path: PathBuf,
    /// What to do after saving
    pub display: DisplayPolicy,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            display: DisplayPolicy::BestEffort,
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `URQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in console logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("URQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = lookup("URQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = lookup("URQR_LOG_COLOR").as_deref().and_then(parse_flag) {
            self.color = color;
        }
        if let Some(rotation) = lookup("URQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::EcLevel;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_run() {
        let config = UrqrConfig::default();
        assert!(!config.qr.verify);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.output.display, DisplayPolicy::BestEffort);
        assert_eq!(config.logging.level, "info");
        assert!(config.source.is_none());
    }

    #[test]
    fn request_is_the_fixed_url() {
        let request = QrOptions { verify: true }.to_request();
        assert!(request.validate().is_ok());
        assert_eq!(request.payload().as_str(), Some(DEFAULT_PAYLOAD));
        assert_eq!(request.requested_version(), 1);
        assert!(request.fit_enabled());
        assert_eq!(request.level(), EcLevel::L);
        assert_eq!(request.module_pixels(), 10);
        assert_eq!(request.border_modules(), 4);
    }

    #[test]
    fn toml_file_sets_ambient_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urqr.toml");
        fs::write(
            &path,
            "[qr]\nverify = true\n\n[output]\ndisplay = \"skip\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = UrqrConfig::from_file(&path).unwrap();
        assert!(config.qr.verify);
        assert_eq!(config.output.display, DisplayPolicy::Skip);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn yaml_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urqr.yaml");
        fs::write(&path, "logging:\n  level: warn\n  rotation: daily\n").unwrap();

        let config = UrqrConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.rotation, Some(LogRotation::Daily));
    }

    #[test]
    fn payload_and_geometry_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for body in [
            "[qr]\npayload = \"https://other.example/\"\n",
            "[qr]\nbox_size = 3\n",
            "[output]\npath = \"elsewhere.png\"\n",
        ] {
            let path = dir.path().join("urqr.toml");
            fs::write(&path, body).unwrap();
            assert!(
                matches!(UrqrConfig::from_file(&path), Err(Error::Config(_))),
                "accepted: {body}"
            );
        }
    }

    #[test]
    fn unknown_extension_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urqr.ini");
        fs::write(&path, "verify=true").unwrap();
        assert!(matches!(
            UrqrConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn overrides_touch_only_ambient_options() {
        let mut config = UrqrConfig::default();
        config.apply_overrides(lookup_from(&[
            ("URQR_PAYLOAD", "https://other.example/"),
            ("URQR_BOX_SIZE", "3"),
            ("URQR_OUTPUT", "elsewhere.png"),
            ("URQR_VERIFY", "on"),
            ("URQR_DISPLAY", "require"),
            ("URQR_LOG_LEVEL", "trace"),
            ("URQR_LOG_ROTATION", "weekly"),
        ]));

        assert!(config.qr.verify);
        assert_eq!(config.output.display, DisplayPolicy::Require);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.logging.rotation, None);
        assert_eq!(
            config.qr.to_request().payload().as_str(),
            Some(DEFAULT_PAYLOAD)
        );
        assert_eq!(config.qr.to_request().module_pixels(), 10);
    }

    #[test]
    fn discovery_prefers_cwd_in_candidate_order() {
        let cwd = tempfile::tempdir().unwrap();
        let xdg = tempfile::tempdir().unwrap();
        fs::create_dir_all(xdg.path().join("urqr")).unwrap();
        fs::write(xdg.path().join("urqr/config.toml"), "").unwrap();

        fs::write(cwd.path().join("urqr.yml"), "").unwrap();
        assert_eq!(
            discover_file(cwd.path(), Some(xdg.path())),
            Some(cwd.path().join("urqr.yml"))
        );

        fs::write(cwd.path().join("urqr.yaml"), "").unwrap();
        fs::write(cwd.path().join("urqr.toml"), "").unwrap();
        assert_eq!(
            discover_file(cwd.path(), Some(xdg.path())),
            Some(cwd.path().join("urqr.toml"))
        );
    }

    #[test]
    fn discovery_falls_back_to_xdg() {
        let cwd = tempfile::tempdir().unwrap();
        let xdg = tempfile::tempdir().unwrap();
        assert_eq!(discover_file(cwd.path(), Some(xdg.path())), None);
        assert_eq!(discover_file(cwd.path(), None), None);

        fs::create_dir_all(xdg.path().join("urqr")).unwrap();
        fs::write(xdg.path().join("urqr/config.yaml"), "").unwrap();
        assert_eq!(
            discover_file(cwd.path(), Some(xdg.path())),
            Some(xdg.path().join("urqr/config.yaml"))
        );

        fs::write(xdg.path().join("urqr/config.toml"), "").unwrap();
        assert_eq!(
            discover_file(cwd.path(), Some(xdg.path())),
            Some(xdg.path().join("urqr/config.toml"))
        );
    }

    #[test]
    fn load_records_explicit_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "qr:\n  verify: true\n").unwrap();

        let config = UrqrConfig::load(Some(&path)).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }
}
