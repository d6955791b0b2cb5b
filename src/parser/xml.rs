//! Structural XML parsing.
//!
//! Builds nested objects from the element tree. Leaf values are always
//! strings (no type coercion). Attributes become sibling fields alongside
//! child elements; text content of an element that also carries attributes
//! or children is kept under the `_` key. Repeated child names collapse
//! into an array. The result is wrapped as `{ <root tag>: <value> }`.

use super::ConfigFormat;
use crate::error::{ConfigError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

/// In-progress element while walking the event stream.
struct Frame {
    name: String,
    attrs: Map<String, Value>,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn from_start(start: &BytesStart<'_>, content: &str) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr =
                attr.map_err(|err| ConfigError::parse_error(ConfigFormat::Xml, content, err))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| ConfigError::parse_error(ConfigFormat::Xml, content, err))?;
            attrs.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Collapse the finished element into a value.
    fn into_value(self) -> Value {
        let text = self.text.trim().to_string();

        if self.attrs.is_empty() && self.children.is_empty() {
            return Value::String(text);
        }

        let mut map = self.attrs;
        for (name, value) in self.children {
            match map.get_mut(&name) {
                // Repeated child names become an array.
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        if !text.is_empty() {
            map.insert("_".to_string(), Value::String(text));
        }
        Value::Object(map)
    }
}

pub(super) fn parse(content: &str) -> Result<Value> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                stack.push(Frame::from_start(&start, content)?);
            }
            Ok(Event::Empty(start)) => {
                let frame = Frame::from_start(&start, content)?;
                attach(&mut stack, &mut root, frame.name.clone(), frame.into_value());
            }
            Ok(Event::End(_)) => {
                let Some(frame) = stack.pop() else {
                    return Err(ConfigError::parse_error(
                        ConfigFormat::Xml,
                        content,
                        "unexpected closing tag",
                    ));
                };
                attach(&mut stack, &mut root, frame.name.clone(), frame.into_value());
            }
            Ok(Event::Text(text)) => {
                let decoded = text
                    .unescape()
                    .map_err(|err| ConfigError::parse_error(ConfigFormat::Xml, content, err))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&decoded);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no configuration data.
            Ok(_) => {}
            Err(err) => {
                return Err(ConfigError::parse_error(ConfigFormat::Xml, content, err));
            }
        }
    }

    match root {
        Some((name, value)) => {
            let mut map = Map::new();
            map.insert(name, value);
            Ok(Value::Object(map))
        }
        None => Err(ConfigError::parse_error(
            ConfigFormat::Xml,
            content,
            "no root element",
        )),
    }
}

fn attach(
    stack: &mut Vec<Frame>,
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => {
            if root.is_none() {
                *root = Some((name, value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_elements_to_objects() {
        let value = parse("<config><server><port>8080</port><host>db</host></server></config>")
            .unwrap();
        assert_eq!(
            value,
            json!({"config": {"server": {"port": "8080", "host": "db"}}})
        );
    }

    #[test]
    fn test_leaves_stay_strings() {
        let value = parse("<config><enabled>true</enabled><count>3</count></config>").unwrap();
        assert_eq!(value, json!({"config": {"enabled": "true", "count": "3"}}));
    }

    #[test]
    fn test_attributes_become_sibling_fields() {
        let value = parse(r#"<config><db host="localhost" port="5432"><name>app</name></db></config>"#)
            .unwrap();
        assert_eq!(
            value,
            json!({"config": {"db": {"host": "localhost", "port": "5432", "name": "app"}}})
        );
    }

    #[test]
    fn test_repeated_children_become_array() {
        let value = parse("<config><item>a</item><item>b</item><item>c</item></config>").unwrap();
        assert_eq!(value, json!({"config": {"item": ["a", "b", "c"]}}));
    }

    #[test]
    fn test_text_with_attributes_under_underscore() {
        let value = parse(r#"<note lang="en">hello</note>"#).unwrap();
        assert_eq!(value, json!({"note": {"lang": "en", "_": "hello"}}));
    }

    #[test]
    fn test_self_closing_element() {
        let value = parse(r#"<config><flag enabled="yes"/></config>"#).unwrap();
        assert_eq!(value, json!({"config": {"flag": {"enabled": "yes"}}}));
    }

    #[test]
    fn test_entities_unescaped() {
        let value = parse("<v>a &amp; b</v>").unwrap();
        assert_eq!(value, json!({"v": "a & b"}));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse("<config><open></config>").unwrap_err();
        match err {
            ConfigError::Parse { format, .. } => assert_eq!(format, ConfigFormat::Xml),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
