//! Configuration extraction from HTML documents.
//!
//! Two extraction passes:
//! 1. Elements carrying a `data-config="key"` marker contribute one entry
//!    each, valued by their `data-value` attribute or, failing that, their
//!    trimmed text content. Values are JSON-parsed when possible and kept
//!    as raw strings otherwise.
//! 2. When no marked element exists, the bodies of
//!    `<script type="application/json">` blocks are merged as the result.
//!
//! When neither pattern matches, the whole document is wrapped as
//! `{ "content": <original text> }`.

use regex_lite::Regex;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Opening tag with its raw attribute chunk.
fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)\b([^>]*)>").unwrap())
}

/// One `name="value"` or `name='value'` attribute.
fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z_][a-zA-Z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    })
}

fn inner_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

pub(super) fn parse(content: &str) -> Value {
    let mut config = Map::new();

    for caps in tag_regex().captures_iter(content) {
        let tag = caps.get(1).unwrap();
        let attrs = collect_attrs(caps.get(2).unwrap().as_str());

        let Some(key) = attrs.get("data-config") else {
            continue;
        };

        let value = match attrs.get("data-value").filter(|v| !v.is_empty()) {
            Some(data_value) => data_value.clone(),
            None => element_text(content, caps.get(0).unwrap().end(), tag.as_str()),
        };

        if key.is_empty() || value.is_empty() {
            continue;
        }
        config.insert(key.clone(), parse_scalar(&value));
    }

    if config.is_empty() {
        merge_json_scripts(content, &mut config);
    }

    if config.is_empty() {
        json!({ "content": content })
    } else {
        Value::Object(config)
    }
}

fn collect_attrs(raw: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    for caps in attr_regex().captures_iter(raw) {
        let name = caps.get(1).unwrap().as_str().to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        attrs.insert(name, value.to_string());
    }
    attrs
}

/// Trimmed text between an opening tag and its closing tag, nested markup
/// stripped.
fn element_text(content: &str, from: usize, tag: &str) -> String {
    let closing = format!("</{tag}>");
    let Some(end) = content[from..].find(&closing) else {
        return String::new();
    };
    let inner = &content[from..from + end];
    inner_tag_regex().replace_all(inner, "").trim().to_string()
}

/// JSON-parse a marker value, falling back to the raw string.
fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn merge_json_scripts(content: &str, config: &mut Map<String, Value>) {
    for caps in tag_regex().captures_iter(content) {
        let tag = caps.get(1).unwrap();
        if !tag.as_str().eq_ignore_ascii_case("script") {
            continue;
        }
        let attrs = collect_attrs(caps.get(2).unwrap().as_str());
        if attrs.get("type").map(String::as_str) != Some("application/json") {
            continue;
        }

        let from = caps.get(0).unwrap().end();
        let Some(end) = content[from..].find("</script>") else {
            continue;
        };
        let body = content[from..from + end].trim();
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
            for (key, value) in map {
                config.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_config_with_data_value() {
        let html = r#"<div data-config="port" data-value="8080"></div>"#;
        assert_eq!(parse(html), json!({"port": 8080}));
    }

    #[test]
    fn test_data_config_with_text_content() {
        let html = r#"<span data-config="name">  my-service  </span>"#;
        assert_eq!(parse(html), json!({"name": "my-service"}));
    }

    #[test]
    fn test_value_json_parsed_with_string_fallback() {
        let html = concat!(
            r#"<i data-config="flag" data-value="true"></i>"#,
            r#"<i data-config="host" data-value="db.internal"></i>"#,
        );
        assert_eq!(parse(html), json!({"flag": true, "host": "db.internal"}));
    }

    #[test]
    fn test_nested_markup_stripped_from_text() {
        let html = r#"<div data-config="label">hello <b>bold</b> world</div>"#;
        assert_eq!(parse(html), json!({"label": "hello bold world"}));
    }

    #[test]
    fn test_empty_values_skipped() {
        let html = r#"<div data-config="empty"></div><div data-config="k" data-value="v"></div>"#;
        assert_eq!(parse(html), json!({"k": "v"}));
    }

    #[test]
    fn test_json_script_block_fallback() {
        let html = r#"<html><script type="application/json">{"a": 1, "b": [2]}</script></html>"#;
        assert_eq!(parse(html), json!({"a": 1, "b": [2]}));
    }

    #[test]
    fn test_marked_elements_take_precedence_over_script() {
        let html = concat!(
            r#"<div data-config="a" data-value="1"></div>"#,
            r#"<script type="application/json">{"b": 2}</script>"#,
        );
        assert_eq!(parse(html), json!({"a": 1}));
    }

    #[test]
    fn test_plain_html_wrapped_as_content() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert_eq!(parse(html), json!({"content": html}));
    }
}
