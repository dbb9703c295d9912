use std::collections::{HashMap, HashSet};

use crate::{
    foundation::error::TokenError,
    model::{
        character::{Character, ScriptMeta},
        options::BOOTLEGGER_ID,
        token::{Token, TokenKind},
    },
    token::generator::{PANDEMONIUM_NAME, TokenGenerator},
};

/// Progress reported after every unit of a batch, failed units included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    /// Display name of the unit just finished.
    pub current: String,
}

/// One unit of a batch that could not be rendered.
#[derive(Debug)]
pub struct BatchFailure {
    pub name: String,
    pub kind: TokenKind,
    pub error: TokenError,
}

/// Tokens rendered by [`generate_all_tokens`], in generation order, plus per-unit failures.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub tokens: Vec<Token>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutput {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
enum Unit<'a> {
    Character {
        character: &'a Character,
        image: Option<&'a str>,
        variant: usize,
    },
    Reminder {
        character: &'a Character,
        text: &'a str,
    },
    ScriptName(&'a ScriptMeta),
    Almanac {
        url: &'a str,
        script_name: &'a str,
    },
    Pandemonium,
}

impl Unit<'_> {
    fn kind(&self) -> TokenKind {
        match self {
            Unit::Character { .. } => TokenKind::Character,
            Unit::Reminder { .. } => TokenKind::Reminder,
            Unit::ScriptName(_) => TokenKind::ScriptName,
            Unit::Almanac { .. } => TokenKind::Almanac,
            Unit::Pandemonium => TokenKind::Pandemonium,
        }
    }

    fn name(&self) -> String {
        match self {
            Unit::Character { character, .. } => character.name.trim().to_string(),
            Unit::Reminder { character, text } => {
                format!("{} ({})", character.name.trim(), text.trim())
            }
            Unit::ScriptName(meta) => meta.name.trim().to_string(),
            Unit::Almanac { .. } => "Almanac".to_string(),
            Unit::Pandemonium => PANDEMONIUM_NAME.to_string(),
        }
    }
}

/// Bootlegger rules for a batch: the options' own rules, else the script's joined by newlines.
fn batch_rules(generator: &TokenGenerator, meta: Option<&ScriptMeta>) -> Option<String> {
    if let Some(rules) = generator.options().bootlegger_rules.as_deref().map(str::trim)
        && !rules.is_empty()
    {
        return Some(rules.to_string());
    }
    let rules: Vec<&str> = meta?
        .bootlegger
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    (!rules.is_empty()).then(|| rules.join("\n"))
}

/// Generators used by one batch. Only the bootlegger's character token carries the rules.
struct BatchGenerators {
    plain: TokenGenerator,
    bootlegger: Option<TokenGenerator>,
}

impl BatchGenerators {
    fn new(generator: &TokenGenerator, meta: Option<&ScriptMeta>) -> Self {
        Self {
            plain: generator.with_bootlegger_rules(None),
            bootlegger: batch_rules(generator, meta)
                .map(|rules| generator.with_bootlegger_rules(Some(rules))),
        }
    }

    fn for_unit(&self, unit: &Unit<'_>) -> &TokenGenerator {
        match (unit, &self.bootlegger) {
            (Unit::Character { character, .. }, Some(generator))
                if character.id == BOOTLEGGER_ID =>
            {
                generator
            }
            _ => &self.plain,
        }
    }
}

fn plan<'a>(
    generator: &TokenGenerator,
    characters: &'a [Character],
    meta: Option<&'a ScriptMeta>,
) -> Vec<Unit<'a>> {
    let o = generator.options();
    let mut units = Vec::new();
    for character in characters {
        let urls = character.image.urls();
        if o.generate_image_variants && urls.len() > 1 {
            units.extend(urls.into_iter().enumerate().map(|(variant, url)| Unit::Character {
                character,
                image: Some(url),
                variant,
            }));
        } else {
            units.push(Unit::Character {
                character,
                image: None,
                variant: 0,
            });
        }
        if o.generate_reminder_tokens {
            units.extend(
                character
                    .all_reminders()
                    .map(|text| Unit::Reminder { character, text }),
            );
        }
    }

    if let Some(meta) = meta {
        if o.script_name_token && !meta.name.trim().is_empty() {
            units.push(Unit::ScriptName(meta));
        }
        if o.almanac_token
            && let Some(url) = meta.almanac.as_deref().filter(|u| !u.trim().is_empty())
        {
            units.push(Unit::Almanac {
                url,
                script_name: &meta.name,
            });
        }
        if o.pandemonium_token {
            units.push(Unit::Pandemonium);
        }
    }
    units
}

fn preload_urls(generator: &TokenGenerator, characters: &[Character]) -> Vec<String> {
    let variants = generator.options().generate_image_variants;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for character in characters {
        let urls = if variants {
            character.image.urls()
        } else {
            character.image.primary().into_iter().collect()
        };
        for url in urls {
            if seen.insert(url) {
                out.push(url.to_string());
            }
        }
    }
    out
}

/// Appends `_2`, `_3`, ... to filenames already used in this batch.
#[derive(Default)]
struct FilenameRegistry {
    used: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl FilenameRegistry {
    fn claim(&mut self, filename: String) -> String {
        if self.used.insert(filename.clone()) {
            return filename;
        }
        let next = self.next_suffix.entry(filename.clone()).or_insert(2);
        loop {
            let candidate = format!("{filename}_{next}");
            *next += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

async fn render_unit(generator: &TokenGenerator, unit: Unit<'_>) -> Result<Token, TokenError> {
    match unit {
        Unit::Character {
            character,
            image,
            variant,
        } => {
            let mut token = generator.generate_character_token(character, image).await?;
            if variant > 0 {
                token.filename = format!("{}_v{}", token.filename, variant + 1);
            }
            Ok(token)
        }
        Unit::Reminder { character, text } => {
            generator
                .generate_reminder_token(character, text, None)
                .await
        }
        Unit::ScriptName(meta) => {
            generator
                .generate_script_name_token(
                    &meta.name,
                    meta.author.as_deref(),
                    meta.hide_title_author,
                )
                .await
        }
        Unit::Almanac { url, script_name } => {
            generator.generate_almanac_qr_token(url, script_name).await
        }
        Unit::Pandemonium => generator.generate_pandemonium_token().await,
    }
}

/// Render every token of a script.
///
/// Character images are pre-warmed concurrently first, then units render one at a time:
/// each character (one token per image variant when enabled) followed by its reminders, then
/// the meta tokens when `meta` is given. A failed unit is recorded and the batch continues.
#[tracing::instrument(level = "info", skip_all, fields(characters = characters.len()))]
pub async fn generate_all_tokens(
    generator: &TokenGenerator,
    characters: &[Character],
    on_progress: &mut (dyn FnMut(BatchProgress) + Send),
    meta: Option<&ScriptMeta>,
) -> BatchOutput {
    let generators = BatchGenerators::new(generator, meta);
    let generator = &generators.plain;

    let urls = preload_urls(generator, characters);
    if !urls.is_empty() {
        let report = generator.images().preload_many(&urls).await;
        tracing::debug!(
            requested = report.requested,
            loaded = report.loaded,
            failed = report.failed,
            "preloaded character images"
        );
    }

    let units = plan(generator, characters, meta);
    let total = units.len();
    let mut out = BatchOutput::default();
    let mut filenames = FilenameRegistry::default();

    for (i, unit) in units.into_iter().enumerate() {
        let name = unit.name();
        match render_unit(generators.for_unit(&unit), unit).await {
            Ok(mut token) => {
                token.filename = filenames.claim(std::mem::take(&mut token.filename));
                out.tokens.push(token);
            }
            Err(error) => {
                tracing::warn!(name = %name, kind = unit.kind().as_str(), error = %error, "token failed");
                out.failures.push(BatchFailure {
                    name: name.clone(),
                    kind: unit.kind(),
                    error,
                });
            }
        }
        on_progress(BatchProgress {
            completed: i + 1,
            total,
            current: name,
        });
    }

    tracing::info!(
        tokens = out.tokens.len(),
        failures = out.failures.len(),
        "batch finished"
    );
    out
}

#[cfg(test)]
#[path = "../../tests/unit/token/batch.rs"]
mod tests;
