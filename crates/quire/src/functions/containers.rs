//! List and map helpers.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Error, Value};

use super::{invalid, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("list", |items: Rest<Value>| Value::from(items.0));
    registry.add("append", |item: Value, list: Value| -> Result<Value, Error> {
        let mut items = items_of(&list)?;
        items.push(item);
        Ok(Value::from(items))
    });
    registry.add("keys", |map: Value| -> Result<Value, Error> {
        Ok(Value::from(keys_of(&map)?))
    });
    registry.add("values", |map: Value| -> Result<Value, Error> {
        let values = keys_of(&map)?
            .iter()
            .map(|key| map.get_item(key))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::from(values))
    });
    registry.add("hasKey", |key: String, map: Value| -> Result<bool, Error> {
        Ok(keys_of(&map)?.iter().any(|k| k.as_str() == Some(key.as_str())))
    });
    registry.add("first", |list: Value| -> Result<Value, Error> {
        Ok(items_of(&list)?.into_iter().next().unwrap_or_else(none))
    });
    registry.add("last", |list: Value| -> Result<Value, Error> {
        Ok(items_of(&list)?.pop().unwrap_or_else(none))
    });
    registry.add("reverse", |list: Value| -> Result<Value, Error> {
        let mut items = items_of(&list)?;
        items.reverse();
        Ok(Value::from(items))
    });
    registry.add("uniq", |list: Value| -> Result<Value, Error> {
        let mut seen: Vec<Value> = Vec::new();
        for item in items_of(&list)? {
            if !seen.contains(&item) {
                seen.push(item);
            }
        }
        Ok(Value::from(seen))
    });
    registry.add("sortAlpha", |list: Value| -> Result<Vec<String>, Error> {
        let mut items: Vec<String> = items_of(&list)?
            .iter()
            .map(ToString::to_string)
            .collect();
        items.sort();
        Ok(items)
    });
    registry.add("join", |sep: String, list: Value| -> Result<String, Error> {
        Ok(items_of(&list)?
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&sep))
    });
}

fn none() -> Value {
    Value::from(())
}

/// Elements of a sequence. Undefined and none count as empty.
fn items_of(list: &Value) -> Result<Vec<Value>, Error> {
    match list.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(Vec::new()),
        ValueKind::Map | ValueKind::String => {
            Err(invalid(format!("expected a list, got {}", list.kind())))
        }
        _ => Ok(list.try_iter()?.collect()),
    }
}

fn keys_of(map: &Value) -> Result<Vec<Value>, Error> {
    match map.kind() {
        ValueKind::Map => Ok(map.try_iter()?.collect()),
        ValueKind::Undefined | ValueKind::None => Ok(Vec::new()),
        _ => Err(invalid(format!("expected a map, got {}", map.kind()))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::pure_functions;
    use super::super::testing::{eval, eval_pure};

    #[test]
    fn test_list_and_append() {
        assert_eq!(eval_pure("{{ list(1, 2) | length }}"), "2");
        assert_eq!(eval_pure("{{ append(3, list(1, 2)) | join(',') }}"), "1,2,3");
        assert_eq!(eval_pure("{{ append(1, none) | length }}"), "1");
    }

    #[test]
    fn test_map_helpers() {
        let source = "{% set m = {'b': 2, 'a': 1} %}\
                      {{ keys(m) | sort | join(',') }}|\
                      {{ values(m) | sort | join(',') }}|\
                      {{ hasKey('a', m) }}|{{ hasKey('z', m) }}";
        assert_eq!(eval_pure(source), "a,b|1,2|true|false");
    }

    #[test]
    fn test_first_last_reverse() {
        assert_eq!(eval_pure("{{ first(list('x', 'y')) }}"), "x");
        assert_eq!(eval_pure("{{ last(list('x', 'y')) }}"), "y");
        assert_eq!(eval_pure("{{ first(list()) }}"), "none");
        assert_eq!(
            eval_pure("{{ join('', reverse(list('a', 'b', 'c'))) }}"),
            "cba"
        );
    }

    #[test]
    fn test_uniq_and_sort() {
        assert_eq!(eval_pure("{{ join(',', uniq(list(1, 2, 1, 3))) }}"), "1,2,3");
        assert_eq!(
            eval_pure("{{ join(',', sortAlpha(list('b', 'c', 'a'))) }}"),
            "a,b,c"
        );
    }

    #[test]
    fn test_type_errors() {
        assert!(eval(&pure_functions(), "{{ keys('text') }}").is_err());
        assert!(eval(&pure_functions(), "{{ first(42) }}").is_err());
    }
}
