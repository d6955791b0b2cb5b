//! Integration tests for format detection and parsing through the public
//! API.

use remote_config::parser::{self, ConfigFormat};
use serde_json::json;

#[test]
fn test_auto_parse_json_by_extension() {
    let value = parser::auto_parse(r#"{"db": {"port": 5432}}"#, Some("app.json")).unwrap();
    assert_eq!(value, json!({"db": {"port": 5432}}));
}

#[test]
fn test_auto_parse_properties_by_extension() {
    let value = parser::auto_parse(
        "# database\ndb.host=localhost\ndb.port=5432\ndb.ssl=true\n",
        Some("db.properties"),
    )
    .unwrap();
    assert_eq!(
        value,
        json!({"db.host": "localhost", "db.port": 5432, "db.ssl": true})
    );
}

#[test]
fn test_auto_parse_yaml_without_hint() {
    let value = parser::auto_parse("server:\n  port: 8080\n", None).unwrap();
    assert_eq!(value, json!({"server": {"port": 8080}}));
}

#[test]
fn test_auto_parse_sniffs_json_for_extensionless_hint() {
    let value = parser::auto_parse(r#"{"a": true}"#, Some("application")).unwrap();
    assert_eq!(value, json!({"a": true}));
}

#[test]
fn test_auto_parse_sniffs_xml_for_extensionless_hint() {
    let value =
        parser::auto_parse("<config><mode>fast</mode></config>", Some("application")).unwrap();
    assert_eq!(value, json!({"config": {"mode": "fast"}}));
}

#[test]
fn test_parse_jsonc_dialect() {
    let content = r#"
// deployment overrides
{
    "replicas": 3, /* scaled up */
    "regions": ["us-east-1", "eu-west-1",],
}
"#;
    let value = parser::parse(content, ConfigFormat::Jsonc).unwrap();
    assert_eq!(
        value,
        json!({"replicas": 3, "regions": ["us-east-1", "eu-west-1"]})
    );
}

#[test]
fn test_parse_json5_dialect() {
    let content = "{ name: 'svc', timeouts: { connect: 5, read: 30, }, }";
    let value = parser::parse(content, ConfigFormat::Json5).unwrap();
    assert_eq!(
        value,
        json!({"name": "svc", "timeouts": {"connect": 5, "read": 30}})
    );
}

#[test]
fn test_parse_html_markers() {
    let html = concat!(
        r#"<html><body>"#,
        r#"<div data-config="port" data-value="8080"></div>"#,
        r#"<span data-config="name">frontend</span>"#,
        r#"</body></html>"#,
    );
    let value = parser::parse(html, ConfigFormat::Html).unwrap();
    assert_eq!(value, json!({"port": 8080, "name": "frontend"}));
}

#[test]
fn test_parse_xml_structure() {
    let xml = r#"<config env="prod"><db><host>db1</host><host>db2</host></db></config>"#;
    let value = parser::parse(xml, ConfigFormat::Xml).unwrap();
    assert_eq!(
        value,
        json!({"config": {"env": "prod", "db": {"host": ["db1", "db2"]}}})
    );
}

#[test]
fn test_parse_error_reports_attempted_format() {
    let err = parser::parse("<<<", ConfigFormat::Json).unwrap_err();
    assert_eq!(err.code(), "PARSE_ERROR");
    assert!(err.to_string().contains("json"));
}
