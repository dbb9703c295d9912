use std::sync::Arc;

use crate::{
    assets::{
        cache::{ImageProvider, global_image_cache},
        decode::DecodedImage,
        resolver::{AssetResolver, StaticAssetCatalog},
    },
    foundation::{
        core::{Rect, pixel_diameter},
        error::{TokenError, TokenResult},
    },
    layout::strategy::{IconLayoutContext, IconLayoutStrategy, TextBlock},
    model::{
        character::{Character, Team},
        color::Color,
        options::{Background, GenerationOptions, GenerationOptionsPatch, IconTransform},
        token::{Token, TokenKind, reminder_filename, sanitize_filename},
    },
    render::{
        canvas::{Clip, ImageFit, TokenCanvas},
        qr::{QrMatrix, draw_qr},
    },
    text::{curved::ArcPosition, fonts::FontBook},
    token::{
        decorations::{draw_leaves, draw_setup_flower, leaf_placements, leaf_rng},
        text_renderer::{TextRole, TokenTextRenderer},
    },
};

/// Display name of the pandemonium meta token.
pub const PANDEMONIUM_NAME: &str = "Pandemonium Institute";

/// Renders single tokens from characters and script metadata.
///
/// Cheap to clone: images, fonts and assets are shared.
#[derive(Clone)]
pub struct TokenGenerator {
    options: GenerationOptions,
    images: Arc<dyn ImageProvider>,
    fonts: Arc<FontBook>,
    assets: Arc<dyn AssetResolver>,
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("options", &self.options)
            .field("fonts", &self.fonts.families().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl TokenGenerator {
    pub fn new(
        options: GenerationOptions,
        images: Arc<dyn ImageProvider>,
        fonts: Arc<FontBook>,
        assets: Arc<dyn AssetResolver>,
    ) -> TokenResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            images,
            fonts,
            assets,
        })
    }

    /// Generator over the global image cache, the first system font found and the default
    /// asset catalog.
    pub fn with_defaults(options: GenerationOptions) -> TokenResult<Self> {
        let images: Arc<dyn ImageProvider> = global_image_cache()?;
        Self::new(
            options,
            images,
            Arc::new(FontBook::with_system_fallback()),
            Arc::new(StaticAssetCatalog::default()),
        )
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn images(&self) -> &Arc<dyn ImageProvider> {
        &self.images
    }

    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// A copy of this generator with `rules` as its bootlegger rules.
    pub(crate) fn with_bootlegger_rules(&self, rules: Option<String>) -> Self {
        let mut generator = self.clone();
        generator.options.bootlegger_rules = rules;
        generator
    }

    /// Merge `patch` into the current options. Invalid results leave the options unchanged.
    pub fn update_options(&mut self, patch: GenerationOptionsPatch) -> TokenResult<()> {
        let merged = self.options.merged(patch);
        merged.validate()?;
        self.options = merged;
        Ok(())
    }

    fn canvas(&self, diameter_inches: f64) -> TokenResult<TokenCanvas> {
        TokenCanvas::new(pixel_diameter(diameter_inches, self.options.dpi)?)
    }

    fn text(&self) -> TokenTextRenderer<'_> {
        TokenTextRenderer::new(&self.fonts, &self.options)
    }

    /// Load a decorative asset; failures are logged and yield `None`.
    async fn decorative_image(&self, what: &str, reference: &str) -> Option<Arc<DecodedImage>> {
        let Some(resolved) = self.assets.resolve(reference) else {
            tracing::warn!(what, reference, "decorative asset not found");
            return None;
        };
        match self.images.get(&resolved.source, resolved.is_local).await {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(what, reference, error = %e, "decorative asset failed to load");
                None
            }
        }
    }

    async fn draw_background(&self, canvas: &mut TokenCanvas, bg: &Background) -> TokenResult<()> {
        if self.options.transparent_background {
            return Ok(());
        }
        let full = Rect::new(0.0, 0.0, canvas.diameter(), canvas.diameter());
        let color = bg.color;
        canvas.paint(Clip::Token, |p| {
            p.fill_rect(full, color);
            Ok(())
        })?;

        if let Some(reference) = bg.image.as_deref().filter(|r| !r.trim().is_empty())
            && let Some(img) = self.decorative_image("background", reference).await
        {
            canvas.paint(Clip::Token, |p| {
                p.draw_image(&img, full, ImageFit::Cover);
                Ok(())
            })?;
        }
        Ok(())
    }

    fn draw_icon(
        &self,
        canvas: &mut TokenCanvas,
        image: &DecodedImage,
        strategy: IconLayoutStrategy,
        icon: IconTransform,
        text_block: Option<TextBlock>,
    ) -> TokenResult<()> {
        let placement = strategy.calculate(&IconLayoutContext {
            diameter: canvas.diameter(),
            icon,
            text_block,
        });
        canvas.paint(Clip::Token, |p| {
            p.draw_image(image, placement.rect(), ImageFit::Contain);
            Ok(())
        })
    }

    /// Render the token of one character.
    ///
    /// `image_override` replaces the character's primary artwork (used for image variants).
    #[tracing::instrument(level = "debug", skip_all, fields(character = %character.name))]
    pub async fn generate_character_token(
        &self,
        character: &Character,
        image_override: Option<&str>,
    ) -> TokenResult<Token> {
        let name = character.name.trim();
        if name.is_empty() {
            return Err(TokenError::validation("character name must not be empty"));
        }
        self.options.dpi.validate()?;

        let o = &self.options;
        let mut canvas = self.canvas(o.role_diameter_inches)?;
        let d = canvas.diameter();
        self.draw_background(&mut canvas, &o.character_background)
            .await?;

        let ability = o
            .display_ability_text
            .then(|| o.ability_text_for(character))
            .flatten();
        let ability_layout = ability.and_then(|text| self.text().layout_ability(text, d));
        let text_block = ability_layout.as_ref().map(|l| TextBlock {
            start_y: l.start_y,
            total_height: l.total_height,
        });

        let artwork = image_override
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| character.image.primary());
        if let Some(url) = artwork {
            let image = self
                .images
                .get(url, false)
                .await
                .map_err(|e| e.for_token(name))?;
            let strategy = IconLayoutStrategy::select(TokenKind::Character, text_block.is_some());
            self.draw_icon(&mut canvas, &image, strategy, o.icon.character, text_block)?;
        }

        if character.setup
            && let Some(style) = o.setup_flower_style.as_deref()
            && let Some(flower) = self.decorative_image("setup flower", style).await
        {
            draw_setup_flower(&mut canvas, &flower)?;
        }

        let leaves = leaf_placements(&o.leaf, d, &mut leaf_rng(o.leaf_seed, &character.id));
        if !leaves.is_empty() {
            let leaf_image = match o.leaf.style.as_deref() {
                Some(style) => self.decorative_image("leaf", style).await,
                None => None,
            };
            draw_leaves(&mut canvas, &leaves, &o.leaf, leaf_image.as_deref())?;
        }

        let text = self.text();
        if let Some(layout) = &ability_layout {
            text.draw_wrapped(&mut canvas, layout, TextRole::Ability)?;
        }
        text.draw_character_name(&mut canvas, name)?;
        let reminders = character.reminder_count();
        if o.token_count && reminders > 0 {
            text.draw_count_badge(&mut canvas, reminders)?;
        }

        Ok(Token {
            kind: TokenKind::Character,
            canvas,
            name: name.to_string(),
            filename: sanitize_filename(name),
            team: Some(character.team),
            diameter_inches: o.role_diameter_inches,
            parent_character: None,
            reminder_text: None,
        })
    }

    /// Render one reminder token of `character`.
    #[tracing::instrument(level = "debug", skip_all, fields(character = %character.name))]
    pub async fn generate_reminder_token(
        &self,
        character: &Character,
        reminder_text: &str,
        image_override: Option<&str>,
    ) -> TokenResult<Token> {
        let name = character.name.trim();
        let reminder_text = reminder_text.trim();
        if name.is_empty() {
            return Err(TokenError::validation("character name must not be empty"));
        }
        if reminder_text.is_empty() {
            return Err(TokenError::validation(format!(
                "reminder text for '{name}' must not be empty"
            )));
        }
        self.options.dpi.validate()?;

        let o = &self.options;
        let mut canvas = self.canvas(o.reminder_diameter_inches)?;
        self.draw_background(&mut canvas, &o.reminder_background)
            .await?;

        let artwork = image_override
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| character.image.primary());
        if let Some(url) = artwork {
            let image = self
                .images
                .get(url, false)
                .await
                .map_err(|e| e.for_token(name))?;
            let strategy = IconLayoutStrategy::select(TokenKind::Reminder, false);
            self.draw_icon(&mut canvas, &image, strategy, o.icon.reminder, None)?;
        }

        self.text().draw_reminder_text(&mut canvas, reminder_text)?;

        Ok(Token {
            kind: TokenKind::Reminder,
            canvas,
            name: name.to_string(),
            filename: reminder_filename(name, reminder_text),
            team: Some(character.team),
            diameter_inches: o.reminder_diameter_inches,
            parent_character: Some(name.to_string()),
            reminder_text: Some(reminder_text.to_string()),
        })
    }

    /// Render the script title token, with an optional author line along the bottom.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn generate_script_name_token(
        &self,
        name: &str,
        author: Option<&str>,
        hide_author: bool,
    ) -> TokenResult<Token> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TokenError::validation("script name must not be empty"));
        }
        self.options.dpi.validate()?;

        let o = &self.options;
        let mut canvas = self.canvas(o.role_diameter_inches)?;
        let d = canvas.diameter();
        self.draw_background(&mut canvas, &o.meta_background).await?;

        let text = self.text();
        text.draw_meta_block(&mut canvas, name, 0.5 * d)?;
        if !hide_author && let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
            text.draw_arc_label(
                &mut canvas,
                &format!("by {author}"),
                TextRole::Meta,
                o.meta_font_size * 0.6,
                ArcPosition::Bottom,
            )?;
        }

        Ok(self.meta_token(TokenKind::ScriptName, canvas, name, "script_name"))
    }

    /// Render the pandemonium token from the configured artwork.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn generate_pandemonium_token(&self) -> TokenResult<Token> {
        self.options.dpi.validate()?;

        let o = &self.options;
        let mut canvas = self.canvas(o.role_diameter_inches)?;
        self.draw_background(&mut canvas, &o.meta_background).await?;

        if let Some(reference) = o.pandemonium_image.as_deref().filter(|r| !r.trim().is_empty()) {
            let resolved = self.assets.resolve(reference).ok_or_else(|| {
                TokenError::ImageLoad {
                    url: reference.to_string(),
                    attempts: vec!["asset resolver: no match".to_string()],
                }
                .for_token(PANDEMONIUM_NAME)
            })?;
            let image = self
                .images
                .get(&resolved.source, resolved.is_local)
                .await
                .map_err(|e| e.for_token(PANDEMONIUM_NAME))?;
            let strategy = IconLayoutStrategy::select(TokenKind::Pandemonium, false);
            self.draw_icon(&mut canvas, &image, strategy, o.icon.meta, None)?;
        }
        self.text().draw_arc_label(
            &mut canvas,
            PANDEMONIUM_NAME,
            TextRole::Meta,
            o.meta_font_size * 0.7,
            ArcPosition::Bottom,
        )?;

        Ok(self.meta_token(TokenKind::Pandemonium, canvas, PANDEMONIUM_NAME, "pandemonium"))
    }

    /// Render a token carrying a QR code of the script's almanac URL.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn generate_almanac_qr_token(
        &self,
        url: &str,
        script_name: &str,
    ) -> TokenResult<Token> {
        let url = url.trim();
        url::Url::parse(url)
            .map_err(|e| TokenError::validation(format!("invalid almanac url '{url}': {e}")))?;
        self.options.dpi.validate()?;

        let o = &self.options;
        let mut canvas = self.canvas(o.role_diameter_inches)?;
        let d = canvas.diameter();
        self.draw_background(&mut canvas, &o.meta_background).await?;

        let matrix = QrMatrix::encode(url)?;
        let quiet = 0.03 * d;
        let side = 0.5 * d;
        let origin = (d - side) / 2.0;
        let plate = Rect::new(
            origin - quiet,
            origin - quiet,
            origin + side + quiet,
            origin + side + quiet,
        );
        let qr_color = o.qr_color;
        canvas.paint(Clip::Token, |p| {
            p.fill_rect(plate, Color::WHITE);
            draw_qr(
                p,
                &matrix,
                Rect::new(origin, origin, origin + side, origin + side),
                qr_color,
            );
            Ok(())
        })?;

        let text = self.text();
        let name = script_name.trim();
        text.draw_arc_label(
            &mut canvas,
            name,
            TextRole::Meta,
            o.meta_font_size * 0.7,
            ArcPosition::Top,
        )?;
        text.draw_arc_label(
            &mut canvas,
            "Almanac",
            TextRole::Meta,
            o.meta_font_size * 0.6,
            ArcPosition::Bottom,
        )?;

        let display = if name.is_empty() { "Almanac" } else { name };
        Ok(self.meta_token(TokenKind::Almanac, canvas, display, "almanac_qr"))
    }

    fn meta_token(&self, kind: TokenKind, canvas: TokenCanvas, name: &str, filename: &str) -> Token {
        Token {
            kind,
            canvas,
            name: name.to_string(),
            filename: filename.to_string(),
            team: Some(Team::Meta),
            diameter_inches: self.options.role_diameter_inches,
            parent_character: None,
            reminder_text: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/token/generator.rs"]
mod tests;
