use serde::{Deserialize, Serialize};

use crate::{model::character::Team, render::canvas::TokenCanvas};

/// What a rendered token represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Character,
    Reminder,
    ScriptName,
    Almanac,
    Pandemonium,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Character => "character",
            TokenKind::Reminder => "reminder",
            TokenKind::ScriptName => "script-name",
            TokenKind::Almanac => "almanac",
            TokenKind::Pandemonium => "pandemonium",
        }
    }

    pub fn is_meta(self) -> bool {
        matches!(
            self,
            TokenKind::ScriptName | TokenKind::Almanac | TokenKind::Pandemonium
        )
    }
}

/// A rendered token and the metadata callers need to export it.
#[derive(Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub canvas: TokenCanvas,
    /// Display name (character name, script name, ...).
    pub name: String,
    /// File stem derived from the name; unique within one batch.
    pub filename: String,
    pub team: Option<Team>,
    /// Nominal diameter before DPI scaling.
    pub diameter_inches: f64,
    /// Name of the character a reminder belongs to.
    pub parent_character: Option<String>,
    pub reminder_text: Option<String>,
}

/// Lowercase ASCII file stem: runs of anything but letters and digits become one `_`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        out.push_str("token");
    }
    out
}

/// File stem of a reminder token.
pub fn reminder_filename(character_name: &str, reminder_text: &str) -> String {
    format!(
        "{}_reminder_{}",
        sanitize_filename(character_name),
        sanitize_filename(reminder_text)
    )
}
