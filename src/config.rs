//! Verifier options and the project config file.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "shape-verify.json";

#[derive(Debug, Clone)]
pub struct Options {
    /// Memoize materialized validators per (file, declaration).
    pub cache: bool,
    /// Declaration files to load; a literal path or a glob pattern.
    pub source_file_path: String,
    /// Project config file; defaults to `<cwd>/shape-verify.json` when present.
    pub config_file_path: Option<PathBuf>,
}

impl Options {
    pub fn new(source_file_path: impl Into<String>) -> Self {
        Self {
            cache: false,
            source_file_path: source_file_path.into(),
            config_file_path: None,
        }
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    /// Every source pattern the project should load: config includes first, then `source_file_path`.
    pub fn source_patterns(&self) -> Result<Vec<String>> {
        let mut patterns = match &self.config_file_path {
            Some(path) => ProjectConfig::load(path)?.include_patterns(path),
            None => {
                let default = std::env::current_dir()
                    .map_err(|e| Error::io(DEFAULT_CONFIG_FILE, e))?
                    .join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    ProjectConfig::load(&default)?.include_patterns(&default)
                } else {
                    Vec::new()
                }
            }
        };
        if !self.source_file_path.trim().is_empty() {
            patterns.push(self.source_file_path.clone());
        }
        Ok(patterns)
    }
}

/// `shape-verify.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Glob patterns relative to the config file's directory.
    #[serde(default)]
    pub include: Vec<String>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        crate::path_de::from_str_with_path(&src, path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn include_patterns(&self, config_path: &Path) -> Vec<String> {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        self.include
            .iter()
            .map(|pattern| {
                if Path::new(pattern).is_absolute() {
                    pattern.clone()
                } else {
                    base.join(pattern).to_string_lossy().into_owned()
                }
            })
            .collect()
    }
}
