//! Helper functions exposed to templates.
//!
//! Every render call builds a fresh [`FunctionRegistry`] from the render
//! options. The sets are merged in a fixed order, later entries replacing
//! earlier ones of the same name:
//!
//! 1. Pure helpers (strings, numbers, dates, hashing, encoding, containers,
//!    serialization, defaults and casts), plus `safeHTML` when the output is
//!    HTML. Always present.
//! 2. Exec helpers, if [`Capability::Exec`](crate::Capability::Exec) is granted.
//! 3. Filesystem and environment helpers, if IO is granted.
//! 4. Network helpers, if network access is granted.
//! 5. Custom helpers from the caller.
//! 6. The inclusion helpers (`inline`, `inlineWithData`, ...).
//!
//! Templates are treated as untrusted: a helper with side effects is only
//! reachable when the invoking process granted the matching capability.
//!
//! Argument order follows the pipeline convention: the value being operated
//! on comes last, e.g. `replace("a", "b", text)` or `indent(4, text)`.

use std::collections::BTreeMap;

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{Environment, Error, ErrorKind, Value};

use crate::options::RenderOptions;
use crate::render::EscapeMode;

mod codec;
mod containers;
mod convert;
pub mod exec;
pub mod io;
mod math;
pub mod network;
mod strings;
mod text;
mod time;

/// Named template helpers.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Value>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a Rust function or closure under `name`.
    pub fn add<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.insert(name, Value::from_function(f));
    }

    /// Adds an already callable value under `name`, replacing any existing entry.
    pub fn insert(&mut self, name: impl Into<String>, f: Value) {
        self.functions.insert(name.into(), f);
    }

    /// Merges `other` into this registry; entries of `other` win.
    pub fn extend(&mut self, other: FunctionRegistry) {
        self.functions.extend(other.functions);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registers every helper as a callable global of `env`.
    pub fn install(&self, env: &mut Environment<'_>) {
        for (name, f) in &self.functions {
            env.add_global(name.clone(), f.clone());
        }
    }
}

/// The side-effect free helpers available to every template.
pub fn pure_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    strings::register(&mut registry);
    text::register(&mut registry);
    math::register(&mut registry);
    time::register(&mut registry);
    codec::register(&mut registry);
    containers::register(&mut registry);
    convert::register(&mut registry);
    registry
}

/// Builds the complete registry for one render call.
///
/// The escape mode is taken from the configured output path.
pub fn build_registry(options: &RenderOptions) -> FunctionRegistry {
    registry_for_mode(options, EscapeMode::for_output(options.output_path()))
}

pub(crate) fn registry_for_mode(options: &RenderOptions, mode: EscapeMode) -> FunctionRegistry {
    let granted = options.granted();
    let mut registry = pure_functions();
    if mode == EscapeMode::Html {
        registry.add("safeHTML", |s: String| Value::from_safe_string(s));
    }

    if granted.allows_exec() {
        registry.extend(exec::functions());
    }
    if granted.allows_io() {
        registry.extend(io::functions());
    }
    if granted.allows_network() {
        registry.extend(network::functions());
    }

    registry.extend(options.custom_functions().clone());
    registry.extend(crate::include::functions(options));
    registry
}

/// Wraps a helper failure as a template error, keeping the cause as source.
pub(crate) fn helper_error<E>(message: impl Into<String>, source: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::new(ErrorKind::InvalidOperation, message.into()).with_source(source)
}

pub(crate) fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

/// Largest string, in bytes, a helper builds from a template-supplied count.
pub(crate) const MAX_GENERATED_LEN: usize = 64 * 1024 * 1024;

/// `unit * count`, or an error when that exceeds [`MAX_GENERATED_LEN`].
pub(crate) fn generated_len(helper: &str, unit: usize, count: usize) -> Result<usize, Error> {
    unit.checked_mul(count)
        .filter(|len| *len <= MAX_GENERATED_LEN)
        .ok_or_else(|| {
            invalid(format!(
                "{}: result would exceed {} bytes",
                helper, MAX_GENERATED_LEN
            ))
        })
}


#[cfg(test)]
mod tests {
    use super::*;

    const EXEC_ONLY: &str = "exec";
    const IO_ONLY: &str = "readFile";
    const NETWORK_ONLY: &str = "httpGet";
    const INCLUSION: [&str; 5] = [
        "inline",
        "includeIO",
        "inlineWithData",
        "inlineIfExists",
        "inlineIfExistsWithData",
    ];

    #[test]
    fn test_no_capabilities() {
        let registry = build_registry(&RenderOptions::new("{}"));
        assert!(registry.contains("upper"));
        assert!(!registry.contains(EXEC_ONLY));
        assert!(!registry.contains(IO_ONLY));
        assert!(!registry.contains(NETWORK_ONLY));
        for name in INCLUSION {
            assert!(registry.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_io_only() {
        let registry = build_registry(&RenderOptions::new("{}").allow_io(true));
        assert!(registry.contains(IO_ONLY));
        assert!(registry.contains("env"));
        assert!(!registry.contains(EXEC_ONLY));
        assert!(!registry.contains(NETWORK_ONLY));
    }

    #[test]
    fn test_network_only() {
        let registry = build_registry(&RenderOptions::new("{}").allow_network(true));
        assert!(registry.contains(NETWORK_ONLY));
        assert!(!registry.contains(IO_ONLY));
    }

    #[test]
    fn test_exec_grants_everything() {
        let registry = build_registry(&RenderOptions::new("{}").allow_exec(true));
        assert!(registry.contains(EXEC_ONLY));
        assert!(registry.contains(IO_ONLY));
        assert!(registry.contains(NETWORK_ONLY));
    }

    #[test]
    fn test_custom_overrides_builtin() {
        let options = RenderOptions::new("{}").function("upper", |s: String| format!("<{}>", s));
        let registry = build_registry(&options);
        let out = testing::eval(&registry, "{{ upper('x') }}").unwrap();
        assert_eq!(out, "<x>");
    }

    #[test]
    fn test_custom_cannot_replace_inclusion() {
        let options = RenderOptions::new("{}").function("inline", |_: String| "custom".to_string());
        let registry = build_registry(&options);
        let out = testing::eval(&registry, "{{ inline('/no/such/file') }}");
        assert!(out.is_err());
    }

    #[test]
    fn test_safe_html_follows_output_path() {
        assert!(!build_registry(&RenderOptions::new("{}")).contains("safeHTML"));
        let html = build_registry(&RenderOptions::new("{}").output("page.html"));
        assert!(html.contains("safeHTML"));
        assert!(!registry_for_mode(&RenderOptions::new("{}").output("page.html"), EscapeMode::Raw)
            .contains("safeHTML"));
    }

    #[test]
    fn test_extend_later_wins() {
        let mut a = FunctionRegistry::new();
        a.add("f", || "a".to_string());
        let mut b = FunctionRegistry::new();
        b.add("f", || "b".to_string());
        a.extend(b);
        assert_eq!(a.len(), 1);
        assert_eq!(testing::eval(&a, "{{ f() }}").unwrap(), "b");
    }
}
