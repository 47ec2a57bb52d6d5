//! String helpers: case, trimming, searching, regular expressions.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use minijinja::Error;
use regex::Regex;

use super::{generated_len, helper_error, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("upper", |s: String| s.to_uppercase());
    registry.add("lower", |s: String| s.to_lowercase());
    registry.add("title", title);
    registry.add("trim", |s: String| s.trim().to_string());
    registry.add("trimPrefix", |prefix: String, s: String| {
        s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string()
    });
    registry.add("trimSuffix", |suffix: String, s: String| {
        s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string()
    });
    registry.add("replace", |old: String, new: String, s: String| {
        s.replace(&old, &new)
    });
    registry.add("contains", |needle: String, s: String| s.contains(&needle));
    registry.add("hasPrefix", |prefix: String, s: String| s.starts_with(&prefix));
    registry.add("hasSuffix", |suffix: String, s: String| s.ends_with(&suffix));
    registry.add("split", |sep: String, s: String| -> Vec<String> {
        s.split(sep.as_str()).map(str::to_string).collect()
    });
    registry.add("repeat", |count: usize, s: String| -> Result<String, Error> {
        generated_len("repeat", s.len(), count)?;
        Ok(s.repeat(count))
    });
    registry.add("substr", substr);
    registry.add("truncate", |length: usize, s: String| -> String {
        s.chars().take(length).collect()
    });

    registry.add("camelCase", |s: String| s.to_lower_camel_case());
    registry.add("pascalCase", |s: String| s.to_upper_camel_case());
    registry.add("snakeCase", |s: String| s.to_snake_case());
    registry.add("kebabCase", |s: String| s.to_kebab_case());
    registry.add("slugify", |s: String| slugify(&s));

    registry.add("regexMatch", |pattern: String, s: String| -> Result<bool, Error> {
        Ok(compile(&pattern)?.is_match(&s))
    });
    registry.add("regexFind", |pattern: String, s: String| -> Result<String, Error> {
        Ok(compile(&pattern)?
            .find(&s)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default())
    });
    registry.add(
        "regexReplaceAll",
        |pattern: String, replacement: String, s: String| -> Result<String, Error> {
            Ok(compile(&pattern)?
                .replace_all(&s, replacement.as_str())
                .into_owned())
        },
    );
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| helper_error(format!("invalid regex {:?}", pattern), e))
}

/// Upper-cases the first letter of every whitespace-separated word.
fn title(s: String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Characters `start..end` of `s`; out-of-range bounds are clamped.
fn substr(start: usize, end: usize, s: String) -> String {
    let end = end.max(start);
    s.chars().skip(start).take(end - start).collect()
}

/// Transliterates to ASCII and joins alphanumeric runs with `-`.
pub(crate) fn slugify(s: &str) -> String {
    let ascii = deunicode::deunicode(s).to_lowercase();
    ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::super::testing::eval_pure;
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(eval_pure("{{ upper('abc') }}"), "ABC");
        assert_eq!(eval_pure("{{ title('hello big world') }}"), "Hello Big World");
        assert_eq!(eval_pure("{{ camelCase('first name') }}"), "firstName");
        assert_eq!(eval_pure("{{ pascalCase('first name') }}"), "FirstName");
        assert_eq!(eval_pure("{{ snakeCase('FirstName') }}"), "first_name");
        assert_eq!(eval_pure("{{ kebabCase('FirstName') }}"), "first-name");
    }

    #[test]
    fn test_value_last_argument_order() {
        assert_eq!(eval_pure("{{ replace('a', 'o', 'banana') }}"), "bonono");
        assert_eq!(eval_pure("{{ trimPrefix('v', 'v1.2') }}"), "1.2");
        assert_eq!(eval_pure("{{ trimSuffix('.txt', 'a.txt') }}"), "a");
        assert_eq!(eval_pure("{{ contains('nan', 'banana') }}"), "true");
        assert_eq!(eval_pure("{{ hasPrefix('ba', 'banana') }}"), "true");
        assert_eq!(eval_pure("{{ repeat(3, 'ab') }}"), "ababab");
    }

    #[test]
    fn test_repeat_rejects_huge_counts() {
        let registry = super::super::pure_functions();
        let err = super::super::testing::eval(&registry, "{{ repeat(9223372036854775807, 'ab') }}")
            .unwrap_err();
        assert!(err.to_string().contains("repeat"));
        assert!(super::super::testing::eval(&registry, "{{ repeat(100000000, 'ab') }}").is_err());
        assert_eq!(eval_pure("{{ repeat(9223372036854775807, '') }}"), "");
    }

    #[test]
    fn test_split_returns_list() {
        assert_eq!(eval_pure("{{ split(',', 'a,b,c') | length }}"), "3");
        assert_eq!(eval_pure("{{ split(',', 'a,b,c')[1] }}"), "b");
    }

    #[test]
    fn test_substr_and_truncate() {
        assert_eq!(eval_pure("{{ substr(1, 3, 'hello') }}"), "el");
        assert_eq!(eval_pure("{{ substr(3, 1, 'hello') }}"), "");
        assert_eq!(eval_pure("{{ truncate(2, 'héllo') }}"), "hé");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Héllo, Wörld!"), "hello-world");
        assert_eq!(slugify("  --  "), "");
    }

    #[test]
    fn test_regex_helpers() {
        assert_eq!(eval_pure(r"{{ regexMatch('^\\d+$', '123') }}"), "true");
        assert_eq!(eval_pure(r"{{ regexFind('[0-9]+', 'abc 42 def') }}"), "42");
        assert_eq!(
            eval_pure(r"{{ regexReplaceAll('[0-9]', '#', 'a1b2') }}"),
            "a#b#"
        );
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let result = super::super::testing::eval(
            &super::super::pure_functions(),
            "{{ regexMatch('(', 'x') }}",
        );
        assert!(result.is_err());
    }
}
