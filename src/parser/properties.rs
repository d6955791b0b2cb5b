//! Java-style properties parsing.
//!
//! Line-oriented: blank lines and lines starting with `#` or `!` are
//! comments. The separator is the first `=` or `:` on the line, whichever
//! appears earlier. Values of exactly `true`/`false` become booleans and
//! fully-numeric values become numbers; everything else stays a string.

use serde_json::{Map, Number, Value};

/// Parse properties text into a flat object. Lines without a separator are
/// ignored; duplicate keys keep the last occurrence.
pub(super) fn parse(content: &str) -> Value {
    let mut map = Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let separator = match (line.find('='), line.find(':')) {
            (Some(eq), Some(colon)) => eq.min(colon),
            (Some(eq), None) => eq,
            (None, Some(colon)) => colon,
            (None, None) => continue,
        };

        let key = line[..separator].trim();
        let value = line[separator + 1..].trim();
        map.insert(key.to_string(), coerce(value));
    }

    Value::Object(map)
}

/// Apply boolean and numeric coercion to a raw property value.
fn coerce(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "" => Value::String(String::new()),
        _ => {
            if let Ok(int) = raw.parse::<i64>() {
                return Value::Number(int.into());
            }
            if let Ok(float) = raw.parse::<f64>()
                && let Some(num) = Number::from_f64(float)
            {
                return Value::Number(num);
            }
            Value::String(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equals_and_colon_separators() {
        let value = parse("a=1\nb:2\n");
        assert_eq!(value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_first_separator_wins() {
        // '=' before ':' splits at '='.
        assert_eq!(parse("key=a:b"), json!({"key": "a:b"}));
        // ':' before '=' splits at ':', even when '=' follows.
        assert_eq!(parse("key:a=b"), json!({"key": "a=b"}));
    }

    #[test]
    fn test_url_value_splits_at_colon() {
        // A known format quirk: with no '=' on the line, the scheme colon of
        // a URL is the separator.
        let value = parse("endpoint http://example.com:8080");
        assert_eq!(value, json!({"endpoint http": "//example.com:8080"}));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let content = "\n# hash comment\n! bang comment\n  \nkey=value\n";
        assert_eq!(parse(content), json!({"key": "value"}));
    }

    #[test]
    fn test_type_coercion() {
        let content = "flag=true\noff=false\nint=42\nneg=-7\nfloat=3.5\nexp=1e3\ntext=42abc\nempty=\n";
        assert_eq!(
            parse(content),
            json!({
                "flag": true,
                "off": false,
                "int": 42,
                "neg": -7,
                "float": 3.5,
                "exp": 1000.0,
                "text": "42abc",
                "empty": ""
            })
        );
    }

    #[test]
    fn test_sides_trimmed() {
        assert_eq!(parse("  spaced key  =  spaced value  "), json!({"spaced key": "spaced value"}));
    }

    #[test]
    fn test_line_without_separator_ignored() {
        assert_eq!(parse("no separator here\nkey=1"), json!({"key": 1}));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        assert_eq!(parse("k=1\nk=2\nk=3"), json!({"k": 3}));
    }

    #[test]
    fn test_non_finite_numbers_stay_strings() {
        assert_eq!(parse("a=inf\nb=NaN"), json!({"a": "inf", "b": "NaN"}));
    }
}
