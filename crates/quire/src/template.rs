//! Template source resolution.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;
use crate::options::{RenderOptions, TemplateSource};
use crate::render::render_raw;

/// Name reported for templates given inline.
pub const INLINE_TEMPLATE_NAME: &str = "<inline>";

/// Template text ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    name: String,
    source: String,
    base_dir: Option<PathBuf>,
}

impl ResolvedTemplate {
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            name: INLINE_TEMPLATE_NAME.to_string(),
            source: source.into(),
            base_dir: None,
        }
    }

    /// Reads a template file. Its directory becomes the lookup root for
    /// `{% include %}` and `{% import %}`.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            source,
            base_dir: Some(base_dir),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// Determines the template for a render call.
///
/// A template file path is evaluated as a raw template against `data` before
/// it is read, so `templates/{{ kind }}.html` picks a file per input.
///
/// # Errors
///
/// [`Error::Config`] if not exactly one template source is set, checked
/// before any file is touched. [`Error::TemplateResolution`] if the path
/// cannot be evaluated or the file cannot be read.
pub fn resolve_template(
    options: &RenderOptions,
    data: &serde_json::Value,
) -> Result<ResolvedTemplate, Error> {
    match options.template_source()? {
        TemplateSource::Inline(text) => Ok(ResolvedTemplate::inline(text)),
        TemplateSource::File(pattern) => {
            let path = render_raw(options, pattern, data)
                .map_err(|e| Error::template_resolution(pattern, e))?;
            debug!(pattern, path = %path, "reading template file");
            ResolvedTemplate::from_file(Path::new(&path))
                .map_err(|e| Error::template_resolution(&path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_inline_is_verbatim() {
        let options = RenderOptions::new("{}").template_inline("Hi {{ name }}");
        let template = resolve_template(&options, &json!({"name": "x"})).unwrap();
        assert_eq!(template.source(), "Hi {{ name }}");
        assert_eq!(template.name(), INLINE_TEMPLATE_NAME);
        assert!(template.base_dir().is_none());
    }

    #[test]
    fn test_file_path_is_evaluated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.txt"), "report body").unwrap();

        let pattern = format!("{}/{{{{ kind }}}}.txt", dir.path().display());
        let options = RenderOptions::new("{}").template_file(pattern);
        let template = resolve_template(&options, &json!({"kind": "report"})).unwrap();

        assert_eq!(template.source(), "report body");
        assert_eq!(template.base_dir(), Some(dir.path()));
        assert!(template.name().ends_with("report.txt"));
    }

    #[test]
    fn test_missing_file() {
        let options = RenderOptions::new("{}").template_file("/no/such/template.txt");
        let err = resolve_template(&options, &json!({})).unwrap_err();
        match err {
            Error::TemplateResolution { template, .. } => {
                assert_eq!(template, "/no/such/template.txt")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_broken_path_template() {
        let options = RenderOptions::new("{}").template_file("{{ unclosed");
        let err = resolve_template(&options, &json!({})).unwrap_err();
        assert!(matches!(err, Error::TemplateResolution { .. }));
    }

    #[test]
    fn test_config_error_before_io() {
        let options = RenderOptions::new("{}")
            .template_file("/no/such/template.txt")
            .template_inline("x");
        let err = resolve_template(&options, &json!({})).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_base_dir_is_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "x").unwrap();
        let template = ResolvedTemplate::from_file(&path).unwrap();
        assert_eq!(template.base_dir(), Some(dir.path()));
    }
}
