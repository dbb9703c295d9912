use std::path::Path;

use anyhow::Context as _;
use serde_json::Value;

use crate::{
    foundation::error::{TokenError, TokenResult},
    model::character::{Character, ScriptMeta},
};

/// A parsed script: optional metadata plus characters in script order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    pub meta: Option<ScriptMeta>,
    pub characters: Vec<Character>,
}

impl Script {
    pub fn from_path(path: impl AsRef<Path>) -> TokenResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read script from '{}'", path.display()))?;
        parse_script(&json)
    }
}

/// Parse script JSON: an array of character objects, optionally containing one `_meta` entry.
///
/// Bare string entries reference official characters by id and carry no render data; they are
/// skipped with a warning. Entries with no name are rejected.
pub fn parse_script(json: &str) -> TokenResult<Script> {
    let root: Value =
        serde_json::from_str(json).map_err(|e| TokenError::serde(format!("script: {e}")))?;
    let Value::Array(entries) = root else {
        return Err(TokenError::validation("script must be a JSON array"));
    };

    let mut script = Script::default();
    for (i, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::String(id) => {
                tracing::warn!(id, "skipping bare character id without definition");
            }
            Value::Object(obj) if obj.get("id").and_then(Value::as_str) == Some("_meta") => {
                let meta: ScriptMeta = serde_json::from_value(Value::Object(obj))
                    .map_err(|e| TokenError::serde(format!("script _meta: {e}")))?;
                script.meta = Some(meta);
            }
            Value::Object(obj) => {
                let character: Character = serde_json::from_value(Value::Object(obj))
                    .map_err(|e| TokenError::serde(format!("script entry {i}: {e}")))?;
                if character.name.trim().is_empty() {
                    return Err(TokenError::validation(format!(
                        "script entry {i} ('{}') has no name",
                        character.id
                    )));
                }
                script.characters.push(character);
            }
            other => {
                return Err(TokenError::validation(format!(
                    "script entry {i} must be an object or id string, got {other}"
                )));
            }
        }
    }
    Ok(script)
}

#[cfg(test)]
#[path = "../../tests/unit/model/script.rs"]
mod tests;
