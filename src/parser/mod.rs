//! Format detection and parsing for raw configuration text.
//!
//! Every parser produces the same in-memory representation
//! (`serde_json::Value`), regardless of the wire format. Dispatch is a
//! closed enum: the parser set is fixed at compile time.
//!
//! ## Detection
//! `auto_parse` infers the format from the data id's file extension when one
//! is recognized. A data id without a usable extension triggers content
//! sniffing (JSON braces, XML angle brackets, properties separators). With
//! no data id at all, YAML is the fallback: it parses simple scalar and
//! mapping text that the other formats would reject.

mod html;
mod jsonc;
mod properties;
mod xml;

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// Raw text, wrapped as `{ "content": <text> }`.
    Text,
    /// Strict JSON.
    Json,
    /// JSON with `//` and `/* */` comments and trailing commas.
    Jsonc,
    /// Relaxed JSON: unquoted keys, single quotes, trailing commas.
    Json5,
    /// XML, parsed structurally with string leaves.
    Xml,
    /// YAML mappings, sequences, and scalars.
    Yaml,
    /// HTML with embedded config markers or a JSON script block.
    Html,
    /// Line-oriented `key=value` / `key:value` properties.
    Properties,
}

impl ConfigFormat {
    /// Map a lowercase file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(ConfigFormat::Text),
            "json" => Some(ConfigFormat::Json),
            "jsonc" => Some(ConfigFormat::Jsonc),
            "json5" => Some(ConfigFormat::Json5),
            "xml" => Some(ConfigFormat::Xml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "html" | "htm" => Some(ConfigFormat::Html),
            "properties" => Some(ConfigFormat::Properties),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Text => write!(f, "text"),
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Jsonc => write!(f, "jsonc"),
            ConfigFormat::Json5 => write!(f, "json5"),
            ConfigFormat::Xml => write!(f, "xml"),
            ConfigFormat::Yaml => write!(f, "yaml"),
            ConfigFormat::Html => write!(f, "html"),
            ConfigFormat::Properties => write!(f, "properties"),
        }
    }
}

/// Parse `content` in the given format.
pub fn parse(content: &str, format: ConfigFormat) -> Result<Value> {
    match format {
        ConfigFormat::Text => Ok(json!({ "content": content })),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|err| ConfigError::parse_error(format, content, err)),
        ConfigFormat::Jsonc => jsonc::parse(content),
        ConfigFormat::Json5 => json5::from_str(content)
            .map_err(|err| ConfigError::parse_error(format, content, err)),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|err| ConfigError::parse_error(format, content, err)),
        ConfigFormat::Xml => xml::parse(content),
        ConfigFormat::Html => Ok(html::parse(content)),
        ConfigFormat::Properties => Ok(properties::parse(content)),
    }
}

/// Detect the format from the data id and content, then parse.
pub fn auto_parse(content: &str, data_id: Option<&str>) -> Result<Value> {
    let format = detect_format(content, data_id);
    debug!(%format, data_id = data_id.unwrap_or(""), "auto-detected configuration format");
    parse(content, format)
}

/// Infer a format from the data id extension, falling back to content
/// sniffing and finally YAML.
pub fn detect_format(content: &str, data_id: Option<&str>) -> ConfigFormat {
    let Some(data_id) = data_id else {
        return ConfigFormat::Yaml;
    };

    if let Some((_, ext)) = data_id.rsplit_once('.')
        && let Some(format) = ConfigFormat::from_extension(&ext.to_ascii_lowercase())
    {
        return format;
    }

    sniff_content(content)
}

/// Guess a format from content structure alone.
fn sniff_content(content: &str) -> ConfigFormat {
    let trimmed = content.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return ConfigFormat::Json;
    }
    if trimmed.starts_with('<') && trimmed.contains('>') {
        return ConfigFormat::Xml;
    }
    let line_oriented = trimmed.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#') && (line.contains('=') || line.contains(':'))
    });
    if line_oriented {
        return ConfigFormat::Properties;
    }

    ConfigFormat::Yaml
}
