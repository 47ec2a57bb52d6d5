//! Line and spacing helpers.
//!
//! Padding is measured in terminal display columns, so wide characters
//! (CJK, emoji) count as two.

use minijinja::Error;
use unicode_width::UnicodeWidthStr;

use super::{generated_len, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("indent", |width: usize, s: String| indent(width, &s));
    registry.add("nindent", |width: usize, s: String| -> Result<String, Error> {
        Ok(format!("\n{}", indent(width, &s)?))
    });
    registry.add("lines", |s: String| -> Vec<String> {
        s.lines().map(str::to_string).collect()
    });
    registry.add("padLeft", |width: usize, s: String| pad_left(&s, width));
    registry.add("padRight", |width: usize, s: String| pad_right(&s, width));
    registry.add("displayWidth", |s: String| s.width());
}

/// Prefixes every line of `s` with `width` spaces.
fn indent(width: usize, s: &str) -> Result<String, Error> {
    generated_len("indent", width, s.split('\n').count())?;
    let pad = " ".repeat(width);
    Ok(s.split('\n')
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Right-aligns `s` in a field of `width` columns.
fn pad_left(s: &str, width: usize) -> Result<String, Error> {
    let padding = width.saturating_sub(s.width());
    generated_len("padLeft", 1, padding)?;
    Ok(format!("{}{}", " ".repeat(padding), s))
}

/// Left-aligns `s` in a field of `width` columns.
fn pad_right(s: &str, width: usize) -> Result<String, Error> {
    let padding = width.saturating_sub(s.width());
    generated_len("padRight", 1, padding)?;
    Ok(format!("{}{}", s, " ".repeat(padding)))
}

#[cfg(test)]
mod tests {
    use super::super::pure_functions;
    use super::super::testing::{eval, eval_pure};
    use super::*;

    #[test]
    fn test_indent() {
        assert_eq!(indent(2, "a\nb").unwrap(), "  a\n  b");
        assert_eq!(eval_pure("{{ nindent(1, 'x') }}"), "\n x");
    }

    #[test]
    fn test_lines() {
        assert_eq!(eval_pure(r"{{ lines('a\nb\nc') | length }}"), "3");
    }

    #[test]
    fn test_padding_uses_display_width() {
        assert_eq!(pad_left("ab", 4).unwrap(), "  ab");
        assert_eq!(pad_right("ab", 4).unwrap(), "ab  ");
        assert_eq!(pad_left("日本", 5).unwrap(), " 日本");
        assert_eq!(pad_right("toolong", 3).unwrap(), "toolong");
        assert_eq!(eval_pure("{{ displayWidth('日本') }}"), "4");
    }

    #[test]
    fn test_huge_widths_are_errors() {
        let registry = pure_functions();
        for helper in ["indent", "nindent", "padLeft", "padRight"] {
            let source = format!("{{{{ {}(9223372036854775807, 'x') }}}}", helper);
            assert!(eval(&registry, &source).is_err(), "{} did not fail", helper);
        }
    }
}
