//! Output destinations.

use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::options::RenderOptions;
use crate::render::render_raw;

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to standard output
    Stdout,
    /// Write to a specific file
    File(PathBuf),
}

impl OutputDestination {
    /// Resolves the destination of `options`.
    ///
    /// An empty output path means stdout. Otherwise the path is evaluated as
    /// a raw template against `data`.
    pub fn resolve(options: &RenderOptions, data: &serde_json::Value) -> Result<Self, Error> {
        let pattern = options.output_path();
        if pattern.is_empty() {
            return Ok(OutputDestination::Stdout);
        }
        let path = render_raw(options, pattern, data).map_err(|e| Error::output(pattern, e))?;
        Ok(OutputDestination::File(PathBuf::from(path)))
    }

    /// Writes text content to this destination.
    ///
    /// Stdout gets a trailing newline. Files are written exactly, replacing
    /// existing content; missing parent directories are created.
    pub fn write_text(&self, content: &str) -> std::io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", content)
            }
            OutputDestination::File(path) => {
                create_parent(path)?;
                let mut file = open_for_write(path)?;
                file.write_all(content.as_bytes())
            }
        }
    }
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(parent)
}

fn open_for_write(path: &Path) -> std::io::Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options.open(path)
}

/// Writes `content` to the destination of `options` and returns it.
pub fn write_output(
    options: &RenderOptions,
    content: &str,
    data: &serde_json::Value,
) -> Result<OutputDestination, Error> {
    let destination = OutputDestination::resolve(options, data)?;
    tracing::debug!(?destination, bytes = content.len(), "writing output");
    destination.write_text(content).map_err(|e| {
        let path = match &destination {
            OutputDestination::Stdout => "<stdout>".to_string(),
            OutputDestination::File(path) => path.display().to_string(),
        };
        Error::output(&path, e)
    })?;
    Ok(destination)
}
