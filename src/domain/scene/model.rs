use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Who delivers a line during rehearsal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "ME")]
    Me,
    #[serde(rename = "PARTNER")]
    Partner,
}

impl Role {
    pub fn toggled(self) -> Self {
        match self {
            Role::Me => Role::Partner,
            Role::Partner => Role::Me,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Me => write!(f, "ME"),
            Role::Partner => write!(f, "PARTNER"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptLine {
    pub id: Uuid,
    pub character: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_reference: Option<String>,
}

impl ScriptLine {
    /// Build a line from a parsed record. Every fresh line belongs to the partner
    /// until the user claims it.
    pub fn from_parsed(parsed: ParsedLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            character: parsed.character,
            text: parsed.text,
            direction: parsed.direction,
            role: Role::Partner,
            audio_reference: None,
        }
    }

    /// Merge a partial update into this line. Omitted fields stay untouched.
    pub fn apply(&mut self, patch: LinePatch) {
        if let Some(character) = patch.character {
            self.character = character.to_uppercase();
        }
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(audio_reference) = patch.audio_reference {
            self.audio_reference = audio_reference;
        }
    }

    /// Whether entering this line in rehearsal should start playback.
    pub fn playback_reference(&self) -> Option<&str> {
        match self.role {
            Role::Partner => self.audio_reference.as_deref(),
            Role::Me => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub id: Uuid,
    pub title: String,
    pub raw_text: String,
    pub lines: Vec<ScriptLine>,
    pub created_at: DateTime<Utc>,
}

impl Scene {
    pub fn line(&self, line_id: Uuid) -> Option<&ScriptLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn is_rehearsable(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// A line as produced by the script parser, before ids and roles are assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedLine {
    pub character: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Partial update for a line. `id` is immutable and therefore not accepted.
///
/// `direction` and `audio_reference` distinguish "absent" (keep) from `null`
/// (clear). Line edits may only clear `audio_reference`; a value is set by a
/// finished recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub direction: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub audio_reference: Option<Option<String>>,
}

impl LinePatch {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn audio_reference(key: Option<String>) -> Self {
        Self {
            audio_reference: Some(key),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
