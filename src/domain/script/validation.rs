use super::error::ParseError;
use crate::domain::scene::ParsedLine;
use serde::Deserialize;
use serde_json::Value;

/// One element exactly as the schema allows it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireLine {
    character: String,
    text: String,
    #[serde(default)]
    direction: Option<String>,
}

/// Validate a raw model response against the line schema.
///
/// Accepted shapes are a bare array of line objects or the `{"lines": [...]}`
/// envelope. Anything else is a hard failure; no repair is attempted.
pub fn validate_response(raw: &str) -> Result<Vec<ParsedLine>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ParseError::SchemaMismatch(format!("response is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match (object.remove("lines"), object.is_empty()) {
            (Some(Value::Array(items)), true) => items,
            _ => {
                return Err(ParseError::SchemaMismatch(
                    "expected an array of lines or an object with only a \"lines\" array"
                        .to_string(),
                ))
            }
        },
        _ => {
            return Err(ParseError::SchemaMismatch(
                "response is not an array".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| validate_line(index, item))
        .collect()
}

fn validate_line(index: usize, item: Value) -> Result<ParsedLine, ParseError> {
    if !item.is_object() {
        return Err(ParseError::SchemaMismatch(format!(
            "line {} is not an object",
            index
        )));
    }

    let wire: WireLine = serde_json::from_value(item)
        .map_err(|e| ParseError::SchemaMismatch(format!("line {}: {}", index, e)))?;

    if wire.character.trim().is_empty() {
        return Err(ParseError::SchemaMismatch(format!(
            "line {} has no character",
            index
        )));
    }

    if wire.character != wire.character.to_uppercase() {
        return Err(ParseError::SchemaMismatch(format!(
            "line {} character \"{}\" is not upper-case",
            index, wire.character
        )));
    }

    // null and blank directions both mean "no direction"
    let direction = wire.direction.filter(|d| !d.trim().is_empty());

    if wire.text.trim().is_empty() && direction.is_none() {
        return Err(ParseError::SchemaMismatch(format!(
            "line {} has neither text nor direction",
            index
        )));
    }

    Ok(ParsedLine {
        character: wire.character,
        text: wire.text,
        direction,
    })
}
