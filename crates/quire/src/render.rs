//! Template evaluation.
//!
//! Every evaluation builds a fresh [`minijinja::Environment`] with the helpers
//! of the current [`RenderOptions`] installed. The data tree is the render
//! context and is also bound to the global `root`, so a CSV input (an array
//! at the top level) can be iterated with `{% for row in root %}`. Fields of
//! an object root shadow `root` if one is called that.

use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::error::Error;
use crate::functions::registry_for_mode;
use crate::options::RenderOptions;
use crate::template::ResolvedTemplate;

/// How rendered values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// HTML auto-escaping; `safeHTML` is available.
    Html,
    /// Values are emitted as they are.
    Raw,
}

impl EscapeMode {
    /// HTML when `output` ends in `.html` (any case), raw otherwise.
    ///
    /// `output` is the output path template as configured, before evaluation.
    /// The extension is the suffix of the last `/`-separated segment starting
    /// at its last `.`, so a bare `dir/.html` counts as HTML too.
    pub fn for_output(output: &str) -> Self {
        let segment = output.rsplit('/').next().unwrap_or(output);
        let is_html = segment
            .rfind('.')
            .is_some_and(|dot| segment[dot..].eq_ignore_ascii_case(".html"));
        if is_html {
            EscapeMode::Html
        } else {
            EscapeMode::Raw
        }
    }
}

fn environment(
    options: &RenderOptions,
    mode: EscapeMode,
    base_dir: Option<&Path>,
    data: &serde_json::Value,
) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(if options.is_strict() {
        UndefinedBehavior::Strict
    } else {
        UndefinedBehavior::Lenient
    });
    env.set_auto_escape_callback(move |_name| match mode {
        EscapeMode::Html => AutoEscape::Html,
        EscapeMode::Raw => AutoEscape::None,
    });

    registry_for_mode(options, mode).install(&mut env);
    if let Some(dir) = base_dir {
        env.set_loader(minijinja::path_loader(dir.to_path_buf()));
    }

    env.add_global("root", Value::from_serialize(data));
    env
}

fn context(data: &serde_json::Value) -> Value {
    match data {
        serde_json::Value::Object(_) => Value::from_serialize(data),
        _ => minijinja::context! {},
    }
}

/// Renders `template` against `data`, escaping according to the output path.
pub fn render_template(
    options: &RenderOptions,
    data: &serde_json::Value,
    template: &ResolvedTemplate,
) -> Result<String, Error> {
    let mode = EscapeMode::for_output(options.output_path());
    tracing::debug!(template = template.name(), ?mode, "rendering");
    let env = environment(options, mode, template.base_dir(), data);
    env.render_named_str(template.name(), template.source(), context(data))
        .map_err(|source| Error::Render {
            template: template.name().to_string(),
            source,
        })
}

/// Evaluates a short raw template such as a file name.
pub(crate) fn render_raw(
    options: &RenderOptions,
    text: &str,
    data: &serde_json::Value,
) -> Result<String, minijinja::Error> {
    environment(options, EscapeMode::Raw, None, data).render_str(text, context(data))
}
