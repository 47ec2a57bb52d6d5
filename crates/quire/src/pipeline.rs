//! The render pipeline: input, template, overwrites, render, output.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::input::read_input;
use crate::options::RenderOptions;
use crate::output::write_output;
use crate::overwrite::apply_overwrites;
use crate::render::render_template;
use crate::template::{resolve_template, ResolvedTemplate};

/// Renders according to `options` and writes the result to the configured
/// output path, or to stdout if none is set.
///
/// # Errors
///
/// Any pipeline stage failure, wrapped with its context. See [`Error`].
pub fn render_to_file(options: &RenderOptions) -> Result<(), Error> {
    let (data, output) = generate_output(options)?;
    write_output(options, &output, &data)?;
    Ok(())
}

/// Renders according to `options` and returns the result. The output path
/// only selects the escaping mode; nothing is written.
pub fn render_to_string(options: &RenderOptions) -> Result<String, Error> {
    let (_, output) = generate_output(options)?;
    Ok(output)
}

/// Runs every stage up to rendering. Returns the patched data tree (used to
/// evaluate the output path) and the rendered text.
pub(crate) fn generate_output(options: &RenderOptions) -> Result<(Value, String), Error> {
    // Reject bad template configuration before touching any file.
    options.template_source()?;

    let data = read_input(options.input())?;
    // The template path sees the data before overwrites.
    let template = resolve_template(options, &data)?;
    generate_for_template(options, &data, &template)
}

/// Applies the overwrites of `options` to `data` and renders `template`.
pub(crate) fn generate_for_template(
    options: &RenderOptions,
    data: &Value,
    template: &ResolvedTemplate,
) -> Result<(Value, String), Error> {
    let data = apply_overwrites(data, options.overwrite_directives())?;
    debug!(
        template = template.name(),
        overwrites = options.overwrite_directives().len(),
        "data ready"
    );
    let output = render_template(options, &data, template)?;
    Ok((data, output))
}
