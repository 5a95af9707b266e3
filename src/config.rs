use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::{User, UserId};

pub const DEFAULT_CONFIG_PATH: &str = "config/velo.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// On-disk configuration. Stands in for the data the chat page would
/// carry: who we are and which users can be messaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub my_id: Option<UserId>,
    #[serde(default)]
    pub users: Vec<User>,
    /// Forwarded verbatim as the `Cookie` header.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            my_id: None,
            users: Vec::new(),
            session_cookie: None,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

/// Configuration after overrides, ready to start the client with.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: Url,
    pub my_id: UserId,
    pub users: Vec<User>,
    pub session_cookie: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid server url `{url}`: {source}")]
    InvalidServerUrl { url: String, source: url::ParseError },
    #[error("no local user id configured (set `my_id`, --my-id or VELO_MY_ID)")]
    MissingUserId,
}

impl AppConfig {
    /// CLI and environment values win over the file.
    pub fn apply_overrides(
        &mut self,
        server_url: Option<String>,
        my_id: Option<UserId>,
        session_cookie: Option<String>,
    ) {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(my_id) = my_id {
            self.my_id = Some(my_id);
        }
        if let Some(cookie) = session_cookie {
            self.session_cookie = Some(cookie);
        }
    }

    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let server_url =
            Url::parse(&self.server_url).map_err(|source| ConfigError::InvalidServerUrl {
                url: self.server_url.clone(),
                source,
            })?;
        let my_id = self.my_id.ok_or(ConfigError::MissingUserId)?;

        // The local user is never a chat partner.
        let users = self
            .users
            .into_iter()
            .filter(|user| user.id != my_id)
            .collect();

        Ok(ResolvedConfig {
            server_url,
            my_id,
            users,
            session_cookie: self.session_cookie.filter(|c| !c.trim().is_empty()),
        })
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load the config file, falling back to defaults when it is missing or
/// unreadable.
pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match read_config(path) {
        Ok(config) => config,
        Err(err @ ConfigError::Read { .. }) => {
            log::info!("{err}; using defaults");
            AppConfig::default()
        }
        Err(err) => {
            log::warn!("Config file {}: {err}; using defaults", path.display());
            AppConfig::default()
        }
    }
}
