//! Error types for the rendering pipeline.
//!
//! Every stage of the pipeline wraps the underlying failure with the context
//! of the operation that failed (the input descriptor, the overwrite
//! directive, the template or output path) and returns it to the caller.
//! Nothing is retried.

/// Boxed source error carried by the pipeline variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input source could not be read or parsed.
    #[error("failed to parse input {descriptor}: {source}")]
    Input {
        descriptor: String,
        #[source]
        source: BoxError,
    },

    /// The render options are inconsistent (e.g. both template sources set).
    #[error("{0}")]
    Config(String),

    /// An overwrite directive could not be applied.
    #[error("failed to apply overwrite {directive}: {source}")]
    Overwrite {
        directive: String,
        #[source]
        source: BoxError,
    },

    /// The template filename could not be evaluated or the file could not be read.
    #[error("failed to resolve template {template}: {source}")]
    TemplateResolution {
        template: String,
        #[source]
        source: BoxError,
    },

    /// The template failed to evaluate.
    #[error("failed to render template {template}: {source}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// The output path could not be evaluated, created or written.
    #[error("failed to write output {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: BoxError,
    },

    /// A nested inclusion failed.
    #[error("failed to render inlined template {path}: {source}")]
    Inclusion {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn input(descriptor: &str, source: impl Into<BoxError>) -> Self {
        Error::Input {
            descriptor: descriptor.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn overwrite(directive: &str, source: impl Into<BoxError>) -> Self {
        Error::Overwrite {
            directive: directive.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn template_resolution(template: &str, source: impl Into<BoxError>) -> Self {
        Error::TemplateResolution {
            template: template.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn output(path: &str, source: impl Into<BoxError>) -> Self {
        Error::Output {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn inclusion(path: &str, source: Error) -> Self {
        Error::Inclusion {
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost inclusion failure reachable from this error, if any.
    ///
    /// Inclusion errors travel through the template engine, so they usually
    /// sit a few levels down the source chain of an [`Error::Render`].
    pub fn find_inclusion(&self) -> Option<&Error> {
        let mut found = None;
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(err) = current {
            let quire_err = err
                .downcast_ref::<Error>()
                .or_else(|| err.downcast_ref::<Box<Error>>().map(|boxed| &**boxed));
            if let Some(inclusion @ Error::Inclusion { .. }) = quire_err {
                found = Some(inclusion);
            }
            current = err.source();
        }
        found
    }
}

// Inclusion helpers run inside the template engine and have to report
// failures as engine errors. The original error stays reachable via `source()`.
impl From<Error> for minijinja::Error {
    fn from(err: Error) -> Self {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, err.to_string())
            .with_source(err)
    }
}
