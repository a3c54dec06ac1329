pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{resolve_path, Config, ConfigError, PlexConfig, ShowdownConfig, DEFAULT_LABEL, DEFAULT_THRESHOLD, DEFAULT_WINDOW};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
