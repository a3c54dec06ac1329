use serde::{Deserialize, Serialize};
use showdown_models::SortMode;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: usize = 4;
pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_LABEL: &str = "Showdown Spotlight";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("showdown.window must be a positive integer (got {0})")]
    InvalidWindow(usize),
    #[error("showdown.label must not be empty")]
    EmptyLabel,
    #[error("plex.server_url must not be empty")]
    MissingPlexUrl,
    #[error("plex.library must not be empty")]
    MissingPlexLibrary,
    #[error("no Plex token: set PLEX_TOKEN or add plex_token to {0}")]
    MissingPlexToken(String),
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub showdown: ShowdownConfig,
    #[serde(default)]
    pub plex: PlexConfig,
}

/// Rotation settings and the files a run reads and writes
///
/// Relative paths are resolved against the directory holding the config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShowdownConfig {
    /// Cached dataset produced by the showdown collector
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Kometa collection file to (re)write on every run
    #[serde(default)]
    pub manifest_output: Option<PathBuf>,
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_label")]
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlexConfig {
    #[serde(default = "default_plex_url")]
    pub server_url: String,
    #[serde(default = "default_plex_library")]
    pub library: String,
    #[serde(default = "default_plex_timeout")]
    pub timeout_secs: u64,
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_sort() -> String {
    SortMode::default().as_str().to_string()
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_plex_url() -> String {
    "http://localhost:32400".to_string()
}

fn default_plex_library() -> String {
    "Movies".to_string()
}

fn default_plex_timeout() -> u64 {
    60
}

impl Default for ShowdownConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            state_file: None,
            manifest_output: None,
            threshold: default_threshold(),
            window: default_window(),
            sort: default_sort(),
            label: default_label(),
        }
    }
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            server_url: default_plex_url(),
            library: default_plex_library(),
            timeout_secs: default_plex_timeout(),
        }
    }
}

impl ShowdownConfig {
    pub fn sort_mode(&self) -> SortMode {
        SortMode::from_config(&self.sort)
    }

    pub fn window_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.window).ok_or(ConfigError::InvalidWindow(self.window))
    }
}

/// Resolve a configured path: `~` expands to the home directory, relative paths join `base`
pub fn resolve_path(raw: &Path, base: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => raw.to_path_buf(),
        },
        Err(_) => raw.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.showdown.window_size()?;
        if self.showdown.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if self.plex.server_url.trim().is_empty() {
            return Err(ConfigError::MissingPlexUrl);
        }
        if self.plex.library.trim().is_empty() {
            return Err(ConfigError::MissingPlexLibrary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            showdown: ShowdownConfig {
                dataset_path: Some(PathBuf::from("data/showdowns.json")),
                window: 3,
                sort: "matches_asc".to_string(),
                ..ShowdownConfig::default()
            },
            plex: PlexConfig {
                library: "Films".to_string(),
                ..PlexConfig::default()
            },
        };

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.showdown.dataset_path, Some(PathBuf::from("data/showdowns.json")));
        assert_eq!(loaded.showdown.window, 3);
        assert_eq!(loaded.showdown.sort_mode(), SortMode::MatchesAsc);
        assert_eq!(loaded.showdown.threshold, DEFAULT_THRESHOLD);
        assert_eq!(loaded.plex.library, "Films");
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.showdown.threshold, 4);
        assert_eq!(config.showdown.window, 5);
        assert_eq!(config.showdown.sort_mode(), SortMode::MatchesDesc);
        assert_eq!(config.showdown.label, "Showdown Spotlight");
        assert_eq!(config.plex.server_url, "http://localhost:32400");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.showdown.window = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWindow(0))));

        config.showdown.window = 1;
        assert!(config.validate().is_ok());

        config.showdown.label = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLabel)));
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let config: Config = toml::from_str("[showdown]\nsort = \"shuffle\"\n").unwrap();
        assert_eq!(config.showdown.sort_mode(), SortMode::MatchesDesc);
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/etc/showdown");
        assert_eq!(
            resolve_path(Path::new("data/rotation.json"), base),
            PathBuf::from("/etc/showdown/data/rotation.json")
        );
        assert_eq!(
            resolve_path(Path::new("/var/lib/rotation.json"), base),
            PathBuf::from("/var/lib/rotation.json")
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.showdown.window, DEFAULT_WINDOW);
    }
}
