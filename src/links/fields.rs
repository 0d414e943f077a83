//! Parsers for the serialized fields stored alongside indexed products.
//!
//! Each parser reports failure through `FieldError`; callers decide on the
//! fallback.

use serde_json::{Map, Value};
use thiserror::Error;

pub type Record = Map<String, Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid escape sequence: {0}")]
    Escape(String),
    #[error("malformed JSON: {0}")]
    Json(String),
    #[error("expected a list of records, found {0}")]
    NotRecordList(&'static str),
}

/// Whether `text` carries `\uXXXX`-style escapes worth decoding.
pub fn has_unicode_escapes(text: &str) -> bool {
    text.contains("\\u") || text.contains("\\U")
}

/// Decodes backslash escapes (`\uXXXX`, `\UXXXXXXXX`, `\xHH`, octal and the
/// single-character escapes) into literal characters.
///
/// Surrogate pairs written as two `\u` escapes are combined; a lone surrogate
/// is an error. Unknown escapes are kept verbatim.
pub fn decode_unicode_escapes(text: &str) -> Result<String, FieldError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err(FieldError::Escape("trailing backslash".to_string()));
        };

        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(to_char(value)?);
            }
            'x' => out.push(to_char(read_hex(&mut chars, 2)?)?),
            'U' => out.push(to_char(read_hex(&mut chars, 8)?)?),
            'u' => {
                let unit = read_hex(&mut chars, 4)?;
                if (0xD800..0xDC00).contains(&unit) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(FieldError::Escape(format!("unpaired surrogate {unit:04x}")));
                    }
                    let low = read_hex(&mut chars, 4)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(FieldError::Escape(format!("invalid low surrogate {low:04x}")));
                    }
                    out.push(to_char(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))?);
                } else {
                    out.push(to_char(unit)?);
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

/// Parses a JSON array of objects, e.g. `[{"Type": "Diameter", "Data": "254"}]`.
pub fn parse_records(raw: &str) -> Result<Vec<Record>, FieldError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| FieldError::Json(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(FieldError::NotRecordList(json_kind(&value)));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(FieldError::NotRecordList(json_kind(&other))),
        })
        .collect()
}

fn read_hex<I>(chars: &mut std::iter::Peekable<I>, digits: usize) -> Result<u32, FieldError>
where
    I: Iterator<Item = char>,
{
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| FieldError::Escape(format!("expected {digits} hex digits")))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn to_char(value: u32) -> Result<char, FieldError> {
    char::from_u32(value).ok_or_else(|| FieldError::Escape(format!("invalid code point {value:x}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_danish_characters() {
        assert_eq!(
            decode_unicode_escapes("Savklinge til tr\\u00e6 og st\\u00E5l \\u00f8 254").unwrap(),
            "Savklinge til træ og stål ø 254"
        );
    }

    #[test]
    fn decodes_surrogate_pairs_and_long_escapes() {
        assert_eq!(decode_unicode_escapes("\\ud83d\\udd27 tool").unwrap(), "🔧 tool");
        assert_eq!(decode_unicode_escapes("\\U0001F527").unwrap(), "🔧");
        assert_eq!(decode_unicode_escapes("\\xe6\\101").unwrap(), "æA");
    }

    #[test]
    fn keeps_unknown_escapes_and_literal_text() {
        assert_eq!(
            decode_unicode_escapes("C:\\q \\u00e6 Ø").unwrap(),
            "C:\\q æ Ø"
        );
    }

    #[test]
    fn rejects_broken_escapes() {
        assert!(decode_unicode_escapes("\\u00").is_err());
        assert!(decode_unicode_escapes("\\uZZZZ").is_err());
        assert!(decode_unicode_escapes("\\ud83d alone").is_err());
        assert!(decode_unicode_escapes("ends with \\").is_err());
    }

    #[test]
    fn detects_escapes() {
        assert!(has_unicode_escapes("tr\\u00e6"));
        assert!(!has_unicode_escapes("træ"));
    }

    #[test]
    fn parses_record_lists() {
        let records =
            parse_records(r#"[{"Type":"Diameter","Data":"254 mm"},{"Type":"Bore","Data":"30"}]"#)
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Type"], "Diameter");
        assert_eq!(records[1]["Data"], "30");
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_record_payloads() {
        assert!(matches!(parse_records("not json"), Err(FieldError::Json(_))));
        assert!(matches!(parse_records(""), Err(FieldError::Json(_))));
        assert_eq!(
            parse_records(r#"{"Type":"x"}"#),
            Err(FieldError::NotRecordList("object"))
        );
        assert_eq!(
            parse_records(r#"[{"Type":"x"}, 3]"#),
            Err(FieldError::NotRecordList("number"))
        );
    }
}
