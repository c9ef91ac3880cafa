#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;

use crate::utils::error::{LinkerError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use url::Url;

pub use settings::{MatchStrategy, Settings, PLUGIN_ID};

/// 主程式從 stdin 傳入的 JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInput {
    pub server_connection: ServerConnection,
    #[serde(default)]
    pub args: PluginArgs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginArgs {
    pub mode: Option<String>,
    /// 其餘參數視為本次執行的設定覆寫
    #[serde(flatten)]
    pub overrides: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ProcessAll,
}

impl PluginArgs {
    pub fn mode(&self) -> Result<Mode> {
        match self.mode.as_deref() {
            Some("processAll") => Ok(Mode::ProcessAll),
            other => Err(LinkerError::UnknownModeError {
                mode: other.unwrap_or("<none>").to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookie {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConnection {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub host: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub session_cookie: Option<SessionCookie>,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_scheme() -> String {
    "http".to_string()
}

impl ServerConnection {
    /// 監聽所有介面時改連 localhost
    pub fn effective_host(&self) -> &str {
        match self.host.as_deref().map(str::trim) {
            None | Some("") | Some("0.0.0.0") => "localhost",
            Some(host) => host,
        }
    }

    pub fn graphql_url(&self) -> Result<Url> {
        let raw = format!(
            "{}://{}:{}/graphql",
            self.scheme.to_lowercase(),
            self.effective_host(),
            self.port
        );
        validate_url("server_connection", &raw)?;
        Ok(Url::parse(&raw)?)
    }
}

impl Validate for ServerConnection {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("Scheme", &self.scheme)?;
        validate_range("Port", self.port, 1, u16::MAX)?;
        self.graphql_url().map(|_| ())
    }
}

impl PluginInput {
    pub fn from_json(content: &str) -> Result<Self> {
        let input: PluginInput = serde_json::from_str(content)?;
        input.validate()?;
        Ok(input)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }
}

impl Validate for PluginInput {
    fn validate(&self) -> Result<()> {
        self.server_connection.validate()
    }
}
