// ABOUTME: App configuration loading and validation for hl.yml.
// ABOUTME: Resolves the on-disk layout (apps, git repos) and yields a frozen AppConfig.

mod deserialize;
mod duration;
mod health;
mod init;
mod migrations;

pub use duration::{ParseDurationError, parse_duration};
pub use health::HealthConfig;
pub use init::{InitOptions, init_config};
pub use migrations::MigrationsConfig;

use crate::error::{Error, Result};
use crate::types::{AppName, ImageRef};
use deserialize::{deserialize_app_name, deserialize_platforms, deserialize_repository};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "hl.yml";
pub const ENV_FILENAME: &str = ".env";
pub const DOCKERFILE: &str = "Dockerfile";

/// Environment variable overriding the hl home directory.
pub const HOME_ENV_VAR: &str = "HL_HOME";
const DEFAULT_HOME_SUBDIR: &str = "prj";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app: AppName,

    /// Image repository, without tag.
    #[serde(deserialize_with = "deserialize_repository")]
    pub image: ImageRef,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub service_port: Option<u16>,

    /// Shared docker network the stack and migration containers join.
    #[serde(default = "default_network")]
    pub network: String,

    #[serde(
        default = "default_platforms",
        deserialize_with = "deserialize_platforms"
    )]
    pub platforms: NonEmpty<String>,

    pub health: HealthConfig,

    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Names of secrets expected in `.env`. Informational only.
    #[serde(default)]
    pub secrets: Vec<String>,
}

fn default_network() -> String {
    "traefik_proxy".to_string()
}

fn default_platforms() -> NonEmpty<String> {
    NonEmpty::new("linux/amd64".to_string())
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            return Err(Error::InvalidConfig("network cannot be empty".to_string()));
        }
        if self.health.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "health.interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Root of the hl directory layout.
///
/// ```text
/// <home>/apps/<app>/hl.yml
/// <home>/apps/<app>/compose.yml
/// <home>/apps/<app>/compose.<accessory>.yml
/// <home>/apps/<app>/.env
/// <home>/git/<app>.git
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlHome {
    root: PathBuf,
}

impl HlHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$HL_HOME`, falling back to `$HOME/prj`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(|home| Self::new(PathBuf::from(home).join(DEFAULT_HOME_SUBDIR)))
            .ok_or(Error::NoHome)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app_dir(&self, app: &AppName) -> PathBuf {
        self.root.join("apps").join(app.as_str())
    }

    pub fn git_dir(&self, app: &AppName) -> PathBuf {
        self.root.join("git").join(format!("{app}.git"))
    }
}

/// A loaded app: its directory plus the validated configuration snapshot.
#[derive(Debug, Clone)]
pub struct AppWorkspace {
    pub dir: PathBuf,
    pub config: AppConfig,
}

impl AppWorkspace {
    /// Load and validate `hl.yml` for `app`.
    ///
    /// A missing file is `Error::ConfigNotFound`; anything unparsable or
    /// inconsistent is `Error::InvalidConfig`.
    pub async fn load(home: &HlHome, app: &AppName) -> Result<Self> {
        let dir = home.app_dir(app);
        let path = dir.join(CONFIG_FILENAME);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        let config = AppConfig::from_yaml(&content).map_err(|e| match e {
            Error::Yaml(e) => Error::InvalidConfig(format!("{}: {}", path.display(), e)),
            Error::InvalidConfig(reason) => {
                Error::InvalidConfig(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;

        if config.app != *app {
            return Err(Error::InvalidConfig(format!(
                "{}: declares app '{}' but was loaded for '{}'",
                path.display(),
                config.app,
                app
            )));
        }

        tracing::debug!(app = %app, path = %path.display(), "loaded app config");
        Ok(Self { dir, config })
    }

    pub fn new(dir: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
        }
    }

    pub fn app(&self) -> &AppName {
        &self.config.app
    }

    /// `.env` in the app directory, if present.
    pub fn env_file(&self) -> Option<PathBuf> {
        let path = self.dir.join(ENV_FILENAME);
        path.is_file().then_some(path)
    }
}
