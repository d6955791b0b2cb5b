//! JSON-with-comments parsing.
//!
//! Strips `//` and `/* */` comments plus trailing commas, then hands the
//! result to the strict JSON parser. Stripping is string-aware so comment
//! markers inside string literals survive.

use super::ConfigFormat;
use crate::error::{ConfigError, Result};
use serde_json::Value;

pub(super) fn parse(content: &str) -> Result<Value> {
    let stripped = strip(content);
    serde_json::from_str(&stripped)
        .map_err(|err| ConfigError::parse_error(ConfigFormat::Jsonc, content, err))
}

#[derive(PartialEq)]
enum State {
    Code,
    InString,
    LineComment,
    BlockComment,
}

/// Remove comments, then trailing commas, preserving string literals.
fn strip(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = State::Code;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '"' => {
                    state = State::InString;
                    out.push(ch);
                }
                '/' => match chars.peek() {
                    Some('/') => {
                        chars.next();
                        state = State::LineComment;
                    }
                    Some('*') => {
                        chars.next();
                        state = State::BlockComment;
                    }
                    _ => out.push(ch),
                },
                _ => out.push(ch),
            },
            State::InString => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if ch == '"' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if ch == '\n' {
                    out.push(ch);
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }

    strip_trailing_commas(&out)
}

fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if ch == '\\' {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                // Drop the comma when the next non-whitespace char closes a
                // container.
                let rest = input[idx + ch.len_utf8()..].trim_start();
                if rest.starts_with('}') || rest.starts_with(']') {
                    continue;
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    out
}
