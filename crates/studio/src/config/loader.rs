use super::schema::StudioConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "STUDIO_CONFIG";

const LOCAL_CONFIG: &str = "studio.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Where the effective configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line.
    Explicit(PathBuf),
    /// The `STUDIO_CONFIG` environment variable.
    Env(PathBuf),
    /// `./studio.yaml`.
    Local(PathBuf),
    /// `~/.studio/config.yaml`.
    Home(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::Env(p)
            | ConfigSource::Local(p)
            | ConfigSource::Home(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Pick the config file. An explicit path or `STUDIO_CONFIG` wins even if the
    /// file is missing, so a typo surfaces as a read error instead of silently
    /// falling back to defaults.
    pub fn locate(explicit: Option<&Path>) -> ConfigSource {
        Self::locate_with(explicit, std::env::var_os(CONFIG_ENV), dirs::home_dir())
    }

    pub fn locate_with(
        explicit: Option<&Path>,
        env: Option<OsString>,
        home: Option<PathBuf>,
    ) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }
        if let Some(path) = env.filter(|p| !p.is_empty()) {
            return ConfigSource::Env(PathBuf::from(path));
        }

        let local = PathBuf::from(".").join(LOCAL_CONFIG);
        if local.exists() {
            return ConfigSource::Local(local);
        }

        if let Some(home) = home {
            let home_config = home.join(".studio").join("config.yaml");
            if home_config.exists() {
                return ConfigSource::Home(home_config);
            }
        }

        ConfigSource::Defaults
    }

    pub async fn load(explicit: Option<&Path>) -> Result<StudioConfig, ConfigError> {
        Self::load_source(&Self::locate(explicit)).await
    }

    pub async fn load_source(source: &ConfigSource) -> Result<StudioConfig, ConfigError> {
        debug!(?source, "Loading configuration");
        match source.path() {
            Some(path) => Self::load_from(path).await,
            None => Ok(StudioConfig::default()),
        }
    }

    pub async fn load_from(path: &Path) -> Result<StudioConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
