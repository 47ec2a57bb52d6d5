//! Date and time helpers.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone, Utc};
use minijinja::value::ValueKind;
use minijinja::{Error, Value};

use super::{helper_error, invalid, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("now", || Local::now().to_rfc3339());
    registry.add("unixTime", || Utc::now().timestamp());
    registry.add("date", date);
}

/// Formats a timestamp with a `strftime` pattern.
///
/// `when` may be a unix timestamp (seconds) or an RFC 3339 string; without
/// it the current local time is used.
fn date(format: String, when: Option<Value>) -> Result<String, Error> {
    let Some(when) = when else {
        return format_with(&Local::now(), &format);
    };

    let parsed: DateTime<Utc> = match when.kind() {
        ValueKind::Number => {
            let secs = when
                .as_i64()
                .ok_or_else(|| invalid(format!("{} is not a unix timestamp", when)))?;
            DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| invalid(format!("timestamp {} is out of range", secs)))?
        }
        ValueKind::String => {
            let text = when.as_str().unwrap_or_default();
            DateTime::parse_from_rfc3339(text)
                .map_err(|e| helper_error(format!("cannot parse date {:?}", text), e))?
                .with_timezone(&Utc)
        }
        _ => return Err(invalid(format!("cannot format {} as a date", when))),
    };
    format_with(&parsed, &format)
}

/// An invalid pattern surfaces as `fmt::Error` while writing, not at parse time.
fn format_with<Tz>(when: &DateTime<Tz>, format: &str) -> Result<String, Error>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", when.format(format))
        .map_err(|_| invalid(format!("invalid date format {:?}", format)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::pure_functions;
    use super::super::testing::{eval, eval_pure};

    #[test]
    fn test_date_from_timestamp() {
        assert_eq!(eval_pure("{{ date('%Y-%m-%d', 0) }}"), "1970-01-01");
    }

    #[test]
    fn test_date_from_rfc3339() {
        assert_eq!(
            eval_pure("{{ date('%d.%m.%Y %H:%M', '2024-03-05T10:30:00Z') }}"),
            "05.03.2024 10:30"
        );
    }

    #[test]
    fn test_date_rejects_garbage() {
        assert!(eval(&pure_functions(), "{{ date('%Y', 'yesterday') }}").is_err());
        assert!(eval(&pure_functions(), "{{ date('%Y', [1]) }}").is_err());
        assert!(eval(&pure_functions(), "{{ date('%Q', 0) }}").is_err());
    }

    #[test]
    fn test_now_and_unix_time() {
        let now = eval_pure("{{ now() }}");
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
        let ts: i64 = eval_pure("{{ unixTime() }}").parse().unwrap();
        assert!(ts > 1_600_000_000);
    }
}
