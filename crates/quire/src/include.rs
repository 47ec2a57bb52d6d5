//! Inclusion helpers: render another template file from inside a template.
//!
//! Each helper re-enters the pipeline with the options of the render call
//! that installed it, so the included file sees the same capabilities,
//! overwrites and escaping mode. The result is returned as safe text and is
//! not escaped a second time.
//!
//! There is no depth limit and no cycle detection. A template that includes
//! itself recurses until the process runs out of stack.

use std::path::Path;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::Value;
use serde_json::Map;
use tracing::debug;

use crate::error::Error;
use crate::functions::{invalid, FunctionRegistry};
use crate::input::read_input;
use crate::options::RenderOptions;
use crate::pipeline::generate_for_template;
use crate::template::ResolvedTemplate;

pub(crate) fn functions(options: &RenderOptions) -> FunctionRegistry {
    let options = Arc::new(options.clone());
    let mut registry = FunctionRegistry::new();

    let opts = Arc::clone(&options);
    let inline = Value::from_function(move |path: String| {
        inline_file(&opts, &path, None).map_err(minijinja::Error::from)
    });
    registry.insert("inline", inline.clone());
    registry.insert("includeIO", inline);

    let opts = Arc::clone(&options);
    registry.add(
        "inlineWithData",
        move |path: String, args: Rest<Value>| -> Result<Value, minijinja::Error> {
            let data = data_from_args(&args)?;
            Ok(inline_file(&opts, &path, Some(data))?)
        },
    );

    let opts = Arc::clone(&options);
    registry.add(
        "inlineIfExists",
        move |path: String| -> Result<Value, minijinja::Error> {
            if !exists(&path) {
                return Ok(Value::from(""));
            }
            Ok(inline_file(&opts, &path, None)?)
        },
    );

    let opts = options;
    registry.add(
        "inlineIfExistsWithData",
        move |path: String, args: Rest<Value>| -> Result<Value, minijinja::Error> {
            if !exists(&path) {
                return Ok(Value::from(""));
            }
            let data = data_from_args(&args)?;
            Ok(inline_file(&opts, &path, Some(data))?)
        },
    );

    registry
}

/// Renders the file at `path`. Without explicit `data` the input of
/// `options` is read again.
fn inline_file(
    options: &RenderOptions,
    path: &str,
    data: Option<serde_json::Value>,
) -> Result<Value, Error> {
    debug!(path, explicit_data = data.is_some(), "inlining template");
    let rendered = render_file(options, path, data).map_err(|e| Error::inclusion(path, e))?;
    Ok(Value::from_safe_string(rendered))
}

fn render_file(
    options: &RenderOptions,
    path: &str,
    data: Option<serde_json::Value>,
) -> Result<String, Error> {
    let data = match data {
        Some(data) => data,
        None => read_input(options.input())?,
    };
    let template = ResolvedTemplate::from_file(Path::new(path))
        .map_err(|e| Error::template_resolution(path, e))?;
    let (_, output) = generate_for_template(options, &data, &template)?;
    Ok(output)
}

/// A missing file is skipped; any other stat failure is left for the read
/// to report.
fn exists(path: &str) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

/// Builds the data tree for the `...WithData` helpers.
///
/// A single argument is used as the tree itself. Otherwise the arguments are
/// `key, value` pairs folded into a map.
fn data_from_args(args: &[Value]) -> Result<serde_json::Value, minijinja::Error> {
    if let [single] = args {
        return to_json(single);
    }
    if args.len() % 2 != 0 {
        return Err(invalid(format!(
            "expected key/value pairs, got {} arguments",
            args.len()
        )));
    }
    let mut map = Map::new();
    for pair in args.chunks(2) {
        let key = pair[0].as_str().ok_or_else(|| {
            invalid(format!("data key {} is not a string", pair[0]))
        })?;
        map.insert(key.to_string(), to_json(&pair[1])?);
    }
    Ok(serde_json::Value::Object(map))
}

fn to_json(value: &Value) -> Result<serde_json::Value, minijinja::Error> {
    serde_json::to_value(value)
        .map_err(|e| crate::functions::helper_error("cannot convert inline data", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_to_string;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_inline_sees_input_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let part = write(&dir, "part.txt", "[{{ name }}]");
        let options = RenderOptions::new(r#"{"name": "ann"}"#)
            .overwrite("name=bob")
            .template_inline(format!("{{{{ inline('{}') }}}}", part));
        assert_eq!(render_to_string(&options).unwrap(), "[bob]");
    }

    #[test]
    fn test_include_io_alias() {
        let dir = TempDir::new().unwrap();
        let part = write(&dir, "part.txt", "alias");
        let options = RenderOptions::new("{}")
            .template_inline(format!("{{{{ includeIO('{}') }}}}", part));
        assert_eq!(render_to_string(&options).unwrap(), "alias");
    }

    #[test]
    fn test_inline_with_data_pairs() {
        let dir = TempDir::new().unwrap();
        let part = write(&dir, "card.txt", "{{ title }}/{{ count }}");
        let options = RenderOptions::new(r#"{"title": "outer"}"#).template_inline(format!(
            "{{{{ inlineWithData('{}', 'title', 'inner', 'count', 3) }}}}",
            part
        ));
        assert_eq!(render_to_string(&options).unwrap(), "inner/3");
    }

    #[test]
    fn test_inline_with_single_data_value() {
        let dir = TempDir::new().unwrap();
        let part = write(&dir, "card.txt", "{{ name }}");
        let options = RenderOptions::new(r#"{"people": [{"name": "ann"}]}"#).template_inline(
            format!("{{{{ inlineWithData('{}', people[0]) }}}}", part),
        );
        assert_eq!(render_to_string(&options).unwrap(), "ann");
    }

    #[test]
    fn test_inline_with_data_argument_errors() {
        let options = RenderOptions::new("{}")
            .template_inline("{{ inlineWithData('x.txt', 'a', 1, 'b') }}");
        assert!(render_to_string(&options).is_err());

        let options =
            RenderOptions::new("{}").template_inline("{{ inlineWithData('x.txt', 1, 2) }}");
        assert!(render_to_string(&options).is_err());
    }

    #[test]
    fn test_if_exists_variants() {
        let options = RenderOptions::new("{}").template_inline(
            "a{{ inlineIfExists('/no/such/part.txt') }}\
             b{{ inlineIfExistsWithData('/no/such/part.txt', 'k', 'v') }}c",
        );
        assert_eq!(render_to_string(&options).unwrap(), "abc");
    }

    #[test]
    fn test_missing_file_is_inclusion_error() {
        let options =
            RenderOptions::new("{}").template_inline("{{ inline('/no/such/part.txt') }}");
        let err = render_to_string(&options).unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
        match err.find_inclusion() {
            Some(Error::Inclusion { path, .. }) => assert_eq!(path, "/no/such/part.txt"),
            other => panic!("expected inclusion error, got {:?}", other),
        }
    }

    #[test]
    fn test_html_result_is_not_escaped_twice() {
        let dir = TempDir::new().unwrap();
        let part = write(&dir, "part.html", "<p>{{ x }}</p>");
        let options = RenderOptions::new(r#"{"x": "<b>"}"#)
            .output(dir.path().join("out.html").to_string_lossy())
            .template_inline(format!("<div>{{{{ inline('{}') }}}}</div>", part));
        assert_eq!(
            render_to_string(&options).unwrap(),
            "<div><p>&lt;b&gt;</p></div>"
        );
    }

    #[test]
    fn test_nested_inclusion() {
        let dir = TempDir::new().unwrap();
        let inner = write(&dir, "inner.txt", "inner");
        let outer = write(&dir, "outer.txt", &format!("outer>{{{{ inline('{}') }}}}", inner));
        let options =
            RenderOptions::new("{}").template_inline(format!("{{{{ inline('{}') }}}}", outer));
        assert_eq!(render_to_string(&options).unwrap(), "outer>inner");
    }
}
