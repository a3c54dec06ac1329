use color_eyre::eyre::eyre;
use color_eyre::Result;
use showdown_config::{resolve_path, Config, ConfigError, CredentialStore, PathManager};
use showdown_models::AvailabilityIndex;
use showdown_sources::{AvailabilityIndexSource, IndexFileSource, PlexLibrarySource};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file plus the directory layout its relative paths resolve against
pub struct AppContext {
    pub config: Config,
    pub config_file: PathBuf,
    pub paths: PathManager,
}

/// Directory layout and config file path for `--config`, without touching the file
pub fn locate(config_override: Option<&Path>) -> (PathManager, PathBuf) {
    match config_override {
        Some(path) => {
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (PathManager::with_base(&base), path.to_path_buf())
        }
        None => {
            let paths = PathManager::default();
            let file = paths.config_file();
            (paths, file)
        }
    }
}

impl AppContext {
    /// Load `--config` if given, otherwise the default location (missing file means defaults)
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let (paths, config_file) = locate(config_override);

        if config_override.is_some() && !config_file.exists() {
            return Err(eyre!("Config file not found: {}", config_file.display()));
        }

        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        debug!("Using config {}", config_file.display());

        Ok(Self {
            config,
            config_file,
            paths,
        })
    }

    fn base_dir(&self) -> &Path {
        self.paths.config_dir()
    }

    pub fn dataset_file(&self) -> PathBuf {
        match &self.config.showdown.dataset_path {
            Some(path) => resolve_path(path, self.base_dir()),
            None => self.paths.default_dataset_file(),
        }
    }

    pub fn state_file(&self) -> PathBuf {
        match &self.config.showdown.state_file {
            Some(path) => resolve_path(path, self.base_dir()),
            None => self.paths.default_state_file(),
        }
    }

    pub fn manifest_file(&self) -> PathBuf {
        match &self.config.showdown.manifest_output {
            Some(path) => resolve_path(path, self.base_dir()),
            None => self.paths.default_manifest_file(),
        }
    }

    /// Availability index from `--index-file` when given, otherwise from Plex
    pub async fn load_index(
        &self,
        index_file: Option<&Path>,
        library: Option<&str>,
    ) -> Result<AvailabilityIndex> {
        if let Some(path) = index_file {
            let source = IndexFileSource::new(path);
            return fetch(&source).await;
        }

        let credentials_file = self.paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
        let token = credentials
            .resolve_plex_token()
            .ok_or_else(|| ConfigError::MissingPlexToken(credentials_file.display().to_string()))?;

        let mut source = PlexLibrarySource::new(&self.config.plex, token)?;
        if let Some(library) = library {
            source = source.with_library(library);
        }
        fetch(&source).await
    }
}

async fn fetch(source: &dyn AvailabilityIndexSource) -> Result<AvailabilityIndex> {
    let index = source
        .fetch_index()
        .await
        .map_err(|e| eyre!("Failed to load availability index from {}: {}", source.source_name(), e))?;
    debug!("Availability index from {}: {} ids", source.source_name(), index.len());
    Ok(index)
}
