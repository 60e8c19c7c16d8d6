use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub catalog: CatalogConfig,
  /// SQLite cache location (defaults to $XDG_DATA_HOME/catsync/cache.db)
  pub cache_path: Option<PathBuf>,
  /// Write logs to this file instead of stderr
  pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// Base URL every endpoint path is appended to
  pub url: String,
  /// Public API key; CATSYNC_PUBLIC_KEY takes precedence when set
  pub public_key: Option<String>,
  /// Path segment of the entity listing (e.g., "characters")
  #[serde(default = "default_entity_path")]
  pub entity_path: String,
  /// Path segment of an entity's associated records (e.g., "comics")
  #[serde(default = "default_associated_path")]
  pub associated_path: String,
}

fn default_entity_path() -> String {
  "entities".to_string()
}

fn default_associated_path() -> String {
  "associated".to_string()
}

/// The key pair the remote API signs requests with.
#[derive(Clone)]
pub struct Credentials {
  pub public_key: String,
  pub private_key: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("public_key", &self.public_key)
      .field("private_key", &"<redacted>")
      .finish()
  }
}

impl Config {
  /// Load configuration from `explicit_path`, which must exist, or from the
  /// first existing file among the search paths.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if !p.exists() => return Err(eyre!("Config file not found: {}", p.display())),
      Some(p) => p.to_path_buf(),
      None => Self::search_paths()
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| {
          eyre!("No configuration file found. Create one at ~/.config/catsync/config.yaml")
        })?,
    };

    Self::load_from_path(&path)
  }

  /// ./catsync.yaml, then $XDG_CONFIG_HOME/catsync/config.yaml.
  fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("catsync.yaml")];
    paths.extend(dirs::config_dir().map(|dir| dir.join("catsync").join("config.yaml")));
    paths
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config =
      serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse config: {}", e))?;

    Url::parse(&config.catalog.url)
      .map_err(|e| eyre!("Invalid catalog url '{}': {}", config.catalog.url, e))?;

    Ok(config)
  }

  /// Resolve the signing key pair.
  ///
  /// The public key comes from CATSYNC_PUBLIC_KEY or the config file, the
  /// private key only from CATSYNC_PRIVATE_KEY.
  pub fn credentials(&self) -> Result<Credentials> {
    let public_key = std::env::var("CATSYNC_PUBLIC_KEY")
      .ok()
      .or_else(|| self.catalog.public_key.clone())
      .ok_or_else(|| {
        eyre!("Public key not found. Set CATSYNC_PUBLIC_KEY or catalog.public_key in the config.")
      })?;

    let private_key = std::env::var("CATSYNC_PRIVATE_KEY")
      .map_err(|_| eyre!("Private key not found. Set CATSYNC_PRIVATE_KEY environment variable."))?;

    Ok(Credentials {
      public_key,
      private_key,
    })
  }

  /// Where the SQLite cache lives.
  pub fn cache_path(&self) -> Result<PathBuf> {
    if let Some(p) = &self.cache_path {
      return Ok(p.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("catsync").join("cache.db"))
  }
}
