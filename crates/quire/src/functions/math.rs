//! Arithmetic and random number helpers.
//!
//! Operands may be numbers or numeric strings, so CSV cells (always strings)
//! can be used directly. Two integers give an integer result; anything else
//! is computed in floating point.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Error, Value};

use super::{generated_len, invalid, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("add", |a: Value, b: Value| {
        arith(&a, &b, i64::checked_add, |x, y| x + y)
    });
    registry.add("sub", |a: Value, b: Value| {
        arith(&a, &b, i64::checked_sub, |x, y| x - y)
    });
    registry.add("mul", |a: Value, b: Value| {
        arith(&a, &b, i64::checked_mul, |x, y| x * y)
    });
    registry.add("div", |a: Value, b: Value| {
        if Number::from_value(&b)?.is_zero() {
            return Err(invalid("division by zero"));
        }
        arith(&a, &b, i64::checked_div, |x, y| x / y)
    });
    registry.add("mod", |a: Value, b: Value| {
        if Number::from_value(&b)?.is_zero() {
            return Err(invalid("division by zero"));
        }
        arith(&a, &b, i64::checked_rem, |x, y| x % y)
    });
    registry.add("max", |values: Rest<Value>| extreme(&values, |a, b| a > b));
    registry.add("min", |values: Rest<Value>| extreme(&values, |a, b| a < b));
    registry.add("floor", |x: Value| -> Result<f64, Error> {
        Ok(Number::from_value(&x)?.as_f64().floor())
    });
    registry.add("ceil", |x: Value| -> Result<f64, Error> {
        Ok(Number::from_value(&x)?.as_f64().ceil())
    });
    registry.add("round", |x: Value, precision: Option<i32>| -> Result<f64, Error> {
        let factor = 10f64.powi(precision.unwrap_or(0));
        Ok((Number::from_value(&x)?.as_f64() * factor).round() / factor)
    });

    registry.add("randInt", |min: i64, max: i64| -> Result<i64, Error> {
        if min >= max {
            return Err(invalid(format!("randInt: empty range {}..{}", min, max)));
        }
        Ok(fastrand::i64(min..max))
    });
    registry.add("randAlphaNum", |length: usize| -> Result<String, Error> {
        generated_len("randAlphaNum", 1, length)?;
        Ok(std::iter::repeat_with(fastrand::alphanumeric)
            .take(length)
            .collect())
    });
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_value(value: &Value) -> Result<Self, Error> {
        if let Some(s) = value.as_str() {
            let s = s.trim();
            return s
                .parse::<i64>()
                .map(Number::Int)
                .or_else(|_| s.parse::<f64>().map(Number::Float))
                .map_err(|_| invalid(format!("{:?} is not a number", s)));
        }
        if value.kind() != ValueKind::Number {
            return Err(invalid(format!("{} is not a number", value)));
        }
        if let Some(i) = value.as_i64() {
            return Ok(Number::Int(i));
        }
        f64::try_from(value.clone()).map(Number::Float)
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::from(i),
            Number::Float(f) => Value::from(f),
        }
    }
}

fn arith(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Error> {
    let result = match (Number::from_value(a)?, Number::from_value(b)?) {
        (Number::Int(x), Number::Int(y)) => Number::Int(
            int_op(x, y).ok_or_else(|| invalid(format!("integer overflow on {} and {}", x, y)))?,
        ),
        (x, y) => Number::Float(float_op(x.as_f64(), y.as_f64())),
    };
    Ok(result.into_value())
}

fn extreme(values: &[Value], better: fn(f64, f64) -> bool) -> Result<Value, Error> {
    let mut best: Option<Number> = None;
    for value in values {
        let n = Number::from_value(value)?;
        best = match best {
            Some(current) if !better(n.as_f64(), current.as_f64()) => Some(current),
            _ => Some(n),
        };
    }
    best.map(Number::into_value)
        .ok_or_else(|| invalid("expected at least one number"))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{eval, eval_pure};
    use super::super::pure_functions;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(eval_pure("{{ add(1, 2) }}"), "3");
        assert_eq!(eval_pure("{{ sub(1, 2) }}"), "-1");
        assert_eq!(eval_pure("{{ mul(6, 7) }}"), "42");
        assert_eq!(eval_pure("{{ div(7, 2) }}"), "3");
        assert_eq!(eval_pure("{{ mod(7, 2) }}"), "1");
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(eval_pure("{{ add(1.5, 1) }}"), "2.5");
        assert_eq!(eval_pure("{{ div(1, 0.5) }}"), "2.0");
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(eval_pure("{{ add('54', 1) }}"), "55");
        assert!(eval(&pure_functions(), "{{ add('abc', 1) }}").is_err());
    }

    #[test]
    fn test_division_by_zero() {
        assert!(eval(&pure_functions(), "{{ div(1, 0) }}").is_err());
        assert!(eval(&pure_functions(), "{{ mod(1, 0) }}").is_err());
    }

    #[test]
    fn test_max_min() {
        assert_eq!(eval_pure("{{ max(3, 9, 4) }}"), "9");
        assert_eq!(eval_pure("{{ min(3, 9, 4) }}"), "3");
        assert!(eval(&pure_functions(), "{{ max() }}").is_err());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(eval_pure("{{ floor(2.7) }}"), "2.0");
        assert_eq!(eval_pure("{{ ceil(2.1) }}"), "3.0");
        assert_eq!(eval_pure("{{ round(2.346, 2) }}"), "2.35");
    }

    #[test]
    fn test_random() {
        let n: i64 = eval_pure("{{ randInt(5, 6) }}").parse().unwrap();
        assert_eq!(n, 5);
        assert_eq!(eval_pure("{{ randAlphaNum(12) | length }}"), "12");
        assert!(eval(&pure_functions(), "{{ randInt(6, 6) }}").is_err());
        assert!(eval(&pure_functions(), "{{ randAlphaNum(9223372036854775807) }}").is_err());
    }
}
