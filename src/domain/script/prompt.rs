use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "script_lines";

/// Character name for blocks that are only a stage direction.
pub const STAGE_CHARACTER: &str = "STAGE";

const INSTRUCTIONS: &str = r#"Act as a professional script supervisor. Analyze the following theatrical or film script text and extract all character lines and stage directions.

Requirements:
1. Extract every single line of dialogue and every stage direction.
2. Character names must be converted to ALL CAPS (e.g., "Hamlet" -> "HAMLET").
3. Stage directions (remarks) must preserve their original casing and be kept in parentheses (e.g., "(happily)" remains "(happily)").
4. Stage directions must be separate from the text body: put them in the "direction" field, never inside "text".
5. If a block of text is only a stage direction without a specific character, assign it to a character named "STAGE" with an empty "text".
6. Do not merge adjacent lines from different characters.
7. Support both theater format (Character: Text) and film format (Character on a new line, followed by the dialogue).
8. A direction written inside a character's speech, or directly before it on the same line, belongs to that character's line. A direction standing on its own line between speeches is its own "STAGE" entry and is never attached to the preceding or following speech.

Input Script Text:
"#;

/// Embed the raw script into the fixed instruction template.
pub fn build_prompt(raw_text: &str) -> String {
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + raw_text.len());
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str(raw_text);
    prompt
}

/// Response schema sent upstream.
///
/// Strict structured output needs an object root and every property listed as
/// required, so the array is wrapped in `lines` and `direction` is nullable.
pub fn line_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lines": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "character": {
                            "type": "string",
                            "description": "The name of the character in ALL CAPS."
                        },
                        "direction": {
                            "type": ["string", "null"],
                            "description": "Stage direction or remark in parentheses, if any exists for this line."
                        },
                        "text": {
                            "type": "string",
                            "description": "The dialogue text of the line."
                        }
                    },
                    "required": ["character", "direction", "text"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["lines"],
        "additionalProperties": false
    })
}
