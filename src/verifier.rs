//! Front API: build a project once, then hand out validators by (file, declaration).
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::Options;
use crate::error::Result;
use crate::materialize::{Materializer, Validator};
use crate::project::Project;

type CacheKey = (PathBuf, String);

pub struct Verifier {
    options: Options,
    project: Project,
    cache: RwLock<HashMap<CacheKey, Arc<Validator>>>,
}

impl Verifier {
    pub fn new(options: Options) -> Result<Self> {
        let project = Project::from_options(&options)?;
        Ok(Self::with_project(options, project))
    }

    /// Use an already-built project instead of loading from `options`.
    pub fn with_project(options: Options, project: Project) -> Self {
        Self {
            options,
            project,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Function body (`return ...;`) validating `name` from the source unit at `path`.
    pub fn run(&self, path: impl AsRef<Path>, name: &str) -> String {
        self.validator(path, name).body()
    }

    pub fn validator(&self, path: impl AsRef<Path>, name: &str) -> Arc<Validator> {
        let path = path.as_ref();
        if !self.options.cache {
            return Arc::new(Materializer::new(&self.project).materialize(path, name));
        }

        let key = (path.to_path_buf(), name.to_string());
        if let Some(hit) = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            tracing::debug!(file = %path.display(), name, "validator cache hit");
            return Arc::clone(hit);
        }
        let validator = Arc::new(Materializer::new(&self.project).materialize(path, name));
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(key).or_insert(validator))
    }

    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
