use std::path::PathBuf;

use serde::Deserialize;

/// Contents of the `stevedore.toml` file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    pub app: AppEntry,
    #[serde(rename = "server")]
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppEntry {
    /// Container name on every server.
    pub name: String,
    /// Host-facing port the container publishes.
    pub port: u16,
    /// Port the app listens on inside the container.
    pub image_port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    pub host: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigFile {
    fn try_init_from_string(config: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config)?)
    }
    pub fn try_init() -> Result<Self, ConfigError> {
        use std::io::Read;
        let mut config = String::new();
        std::fs::File::open(&crate::cli::get_cli_args().config)?.read_to_string(&mut config)?;
        Self::try_init_from_string(&config)
    }
}
