//! Filesystem and environment helpers, available with the io capability.
//!
//! Relative paths resolve against the process working directory, not the
//! template's location.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use minijinja::Error;

use super::{helper_error, FunctionRegistry};

/// Abstraction over environment variables.
pub trait EnvReader: Send + Sync {
    /// Get an environment variable value.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed environment for tests.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: std::collections::HashMap<String, String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

pub fn functions() -> FunctionRegistry {
    functions_with_env(RealEnv)
}

/// Like [`functions`], with `env`/`envOr` reading from `reader`.
pub fn functions_with_env<E: EnvReader + 'static>(reader: E) -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();

    registry.add("readFile", |path: String| -> Result<String, Error> {
        fs::read_to_string(&path).map_err(|e| helper_error(format!("cannot read {}", path), e))
    });
    registry.add(
        "writeFile",
        |path: String, content: String| -> Result<String, Error> {
            fs::write(&path, content)
                .map_err(|e| helper_error(format!("cannot write {}", path), e))?;
            Ok(String::new())
        },
    );
    registry.add("fileExists", |path: String| Path::new(&path).is_file());
    registry.add("dirExists", |path: String| Path::new(&path).is_dir());
    registry.add("listDir", |path: String| -> Result<Vec<String>, Error> {
        let entries =
            fs::read_dir(&path).map_err(|e| helper_error(format!("cannot list {}", path), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| helper_error(format!("cannot list {}", path), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    });
    registry.add("glob", |pattern: String| -> Result<Vec<String>, Error> {
        let paths = glob::glob(&pattern)
            .map_err(|e| helper_error(format!("invalid glob pattern {:?}", pattern), e))?;
        paths
            .map(|entry| {
                entry
                    .map(|p| p.to_string_lossy().into_owned())
                    .map_err(|e| helper_error("cannot read glob match", e))
            })
            .collect()
    });
    registry.add("mkdirAll", |path: String| -> Result<String, Error> {
        fs::create_dir_all(&path)
            .map_err(|e| helper_error(format!("cannot create {}", path), e))?;
        Ok(String::new())
    });
    registry.add("cwd", || -> Result<String, Error> {
        std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .map_err(|e| helper_error("cannot determine working directory", e))
    });

    let reader: Arc<dyn EnvReader> = Arc::new(reader);
    let env = Arc::clone(&reader);
    registry.add("env", move |name: String| env.var(&name).unwrap_or_default());
    registry.add("envOr", move |name: String, fallback: String| {
        reader.var(&name).unwrap_or(fallback)
    });

    registry
}
