//! Environment placeholder substitution for configuration values.
//!
//! Replaces `${NAME}` tokens inside string leaves with values from an
//! injected lookup. Unresolved names are left verbatim, which makes the
//! substitution idempotent: re-running it neither strips unresolved
//! placeholders nor re-expands already-substituted text.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Pattern for placeholder names: `${NAME}` where NAME is `[A-Z_]+`.
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_]+)\}").unwrap())
}

/// Substitute placeholders using an injected lookup function.
///
/// Traverses maps and arrays depth-first, rewriting string leaves only.
/// Object keys are never substituted. Non-string leaves pass through
/// untouched.
pub fn substitute_with<F>(value: &Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => Value::String(substitute_str(s, lookup)),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(key.clone(), substitute_with(inner, lookup));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| substitute_with(item, lookup)).collect())
        }
        other => other.clone(),
    }
}

/// Substitute placeholders from the process environment.
pub fn substitute_env(value: &Value) -> Value {
    substitute_with(value, &|name| std::env::var(name).ok())
}

fn substitute_str<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = placeholder_regex();
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in re.captures_iter(input) {
        let whole = caps.get(0).unwrap();
        let name = caps.get(1).unwrap().as_str();
        out.push_str(&input[last..whole.start()]);
        match lookup(name) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_substitutes_known_names() {
        let lookup = lookup_from(&[("PORT", "8080"), ("HOST", "db.internal")]);
        let value = json!({"url": "http://${HOST}:${PORT}/api"});
        let result = substitute_with(&value, &lookup);
        assert_eq!(result, json!({"url": "http://db.internal:8080/api"}));
    }

    #[test]
    fn test_unset_placeholder_left_verbatim() {
        let lookup = lookup_from(&[]);
        let value = json!({"port": "${PORT}"});
        assert_eq!(substitute_with(&value, &lookup), json!({"port": "${PORT}"}));
    }

    #[test]
    fn test_idempotent_on_already_substituted() {
        let lookup = lookup_from(&[("NAME", "value")]);
        let value = json!({"a": "${NAME}", "b": "${MISSING}"});
        let once = substitute_with(&value, &lookup);
        let twice = substitute_with(&once, &lookup);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_substituted_value_not_re_expanded() {
        // A replacement that itself looks like a placeholder stays literal.
        let lookup = lookup_from(&[("OUTER", "${INNER}"), ("INNER", "surprise")]);
        let value = json!("${OUTER}");
        assert_eq!(substitute_with(&value, &lookup), json!("${INNER}"));
    }

    #[test]
    fn test_non_string_leaves_untouched() {
        let lookup = lookup_from(&[("N", "1")]);
        let value = json!({"num": 42, "flag": true, "nothing": null});
        assert_eq!(substitute_with(&value, &lookup), value);
    }

    #[test]
    fn test_keys_never_substituted() {
        let lookup = lookup_from(&[("KEY", "replaced")]);
        let value = json!({"${KEY}": "${KEY}"});
        let result = substitute_with(&value, &lookup);
        assert_eq!(result, json!({"${KEY}": "replaced"}));
    }

    #[test]
    fn test_lowercase_names_not_matched() {
        let lookup = lookup_from(&[("port", "8080")]);
        let value = json!("${port}");
        assert_eq!(substitute_with(&value, &lookup), json!("${port}"));
    }

    #[test]
    fn test_arrays_traversed() {
        let lookup = lookup_from(&[("A", "x")]);
        let value = json!(["${A}", ["${A}"], {"k": "${A}"}]);
        assert_eq!(
            substitute_with(&value, &lookup),
            json!(["x", ["x"], {"k": "x"}])
        );
    }
}
