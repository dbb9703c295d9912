use serde::{Deserialize, Serialize};

/// Faction a character belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Good team, majority role.
    #[default]
    Townsfolk,
    /// Good team, hindering role.
    Outsider,
    /// Evil team helpers.
    Minion,
    /// Evil team leader.
    Demon,
    /// Either team, joins mid-game.
    #[serde(alias = "traveler")]
    Traveller,
    /// Storyteller-side rule modifiers.
    Fabled,
    /// Storyteller-side script rules.
    Loric,
    /// Script-level entries (meta tokens).
    Meta,
}

impl Team {
    /// Lowercase identifier as used in script JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Townsfolk => "townsfolk",
            Team::Outsider => "outsider",
            Team::Minion => "minion",
            Team::Demon => "demon",
            Team::Traveller => "traveller",
            Team::Fabled => "fabled",
            Team::Loric => "loric",
            Team::Meta => "meta",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image URL or an ordered list of variants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// No artwork.
    #[default]
    None,
    /// A single URL or path.
    One(String),
    /// Several variants; the first is the primary artwork.
    Many(Vec<String>),
}

impl ImageRef {
    /// Non-empty URLs in declaration order.
    pub fn urls(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            ImageRef::None => Vec::new(),
            ImageRef::One(url) => vec![url.as_str()],
            ImageRef::Many(urls) => urls.iter().map(String::as_str).collect(),
        };
        all.into_iter().filter(|u| !u.trim().is_empty()).collect()
    }

    /// First usable URL.
    pub fn primary(&self) -> Option<&str> {
        self.urls().into_iter().next()
    }
}

/// A character definition from a script. Read-only input to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Stable script identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Faction.
    #[serde(default)]
    pub team: Team,
    /// Ability text printed on the token.
    #[serde(default)]
    pub ability: String,
    /// Artwork URL(s).
    #[serde(default)]
    pub image: ImageRef,
    /// Whether the character modifies game setup (draws the setup flower).
    #[serde(default)]
    pub setup: bool,
    /// Reminder token texts.
    #[serde(default)]
    pub reminders: Vec<String>,
    /// Reminder tokens that are always available, in or out of play.
    #[serde(default)]
    pub reminders_global: Vec<String>,
    /// Storyteller night-order reminder for the first night.
    #[serde(default)]
    pub first_night_reminder: String,
    /// Storyteller night-order reminder for other nights.
    #[serde(default)]
    pub other_night_reminder: String,
}

impl Character {
    /// Minimal character used by callers and tests.
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            ..Self::default()
        }
    }

    /// Local then global reminder texts, skipping blank entries.
    pub fn all_reminders(&self) -> impl Iterator<Item = &str> {
        self.reminders
            .iter()
            .chain(self.reminders_global.iter())
            .map(String::as_str)
            .filter(|r| !r.trim().is_empty())
    }

    /// Number of reminder tokens this character produces.
    pub fn reminder_count(&self) -> usize {
        self.all_reminders().count()
    }
}

/// Script-level metadata (the `_meta` entry of a script).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMeta {
    /// Script title.
    #[serde(default)]
    pub name: String,
    /// Script author.
    #[serde(default)]
    pub author: Option<String>,
    /// Almanac URL encoded into the QR token.
    #[serde(default)]
    pub almanac: Option<String>,
    /// Custom rules drawn on the Bootlegger token in place of its ability text.
    #[serde(default)]
    pub bootlegger: Vec<String>,
    /// Script logo URL.
    #[serde(default)]
    pub logo: Option<String>,
    /// Hide the author line on the script-name token.
    #[serde(default)]
    pub hide_title_author: bool,
}

#[cfg(test)]
#[path = "../../tests/unit/model/character.rs"]
mod tests;
