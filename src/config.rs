use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::mail::DEFAULT_SMTP_PORT;

const CANDIDATES: [&str; 4] = ["jeeves.toml", "jeeves.json", "jeeves.yaml", "jeeves.yml"];

/// Configuration file structure for Jeeves.
///
/// Holds the service endpoints and credentials the reminder run needs.
/// Every value can also be supplied or overridden on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Path to the YAML blocker file
    pub blockers: Option<PathBuf>,

    #[serde(default)]
    pub jenkins: JenkinsConfig,

    #[serde(default)]
    pub bugzilla: BugzillaConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins instance base URL
    pub url: Option<String>,

    /// User the API token belongs to
    pub user: Option<String>,

    pub api_token: Option<Token>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BugzillaConfig {
    /// Bugzilla base URL; bug lookups are skipped when unset
    pub url: Option<String>,

    pub api_key: Option<Token>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// Jira base URL; ticket lookups are skipped when unset
    pub url: Option<String>,

    /// Personal access token
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MailConfig {
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Sender address of every reminder
    pub from_address: Option<String>,

    pub from_name: Option<String>,

    /// Where reminders are saved when they cannot be mailed
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Extra label/value pairs printed at the top of every reminder
    #[serde(default)]
    pub labels: IndexMap<String, String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            from_address: None,
            from_name: None,
            fallback_dir: default_fallback_dir(),
        }
    }
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("archive").join("reminders")
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./jeeves.toml, ./jeeves.json, ./jeeves.yaml, ./jeeves.yml
    /// 3. The same names in the user config directory (e.g. ~/.config/jeeves/)
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        if let Some(config) = Self::load_from_dir(Path::new("."))? {
            return Ok(config);
        }

        if let Some(dir) = dirs::config_dir().map(|d| d.join("jeeves")) {
            if let Some(config) = Self::load_from_dir(&dir)? {
                return Ok(config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        for candidate in &CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                return Self::load_from_path(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
