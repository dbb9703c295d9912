/// Convenience result type used across the token engine.
pub type TokenResult<T> = Result<T, TokenError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    /// Malformed or impossible render request (missing name, non-positive DPI, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// A single token could not be rendered; carries the entity that failed.
    #[error("failed to create token for '{character_name}': {source}")]
    TokenCreation {
        /// Display name of the character (or meta token) being rendered.
        character_name: String,
        /// Underlying cause.
        #[source]
        source: Box<TokenError>,
    },

    /// Network, filesystem or proxy failure while fetching image bytes.
    #[error("failed to load image '{url}' (tried: {})", .attempts.join("; "))]
    ImageLoad {
        /// Requested image URL or path.
        url: String,
        /// One entry per attempted strategy, with its failure reason.
        attempts: Vec<String>,
    },

    /// Image bytes were fetched but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rasterization or text shaping failure.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TokenError {
    /// Build a [`TokenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TokenError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TokenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TokenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Wrap `self` as the cause of a failed token render for `character_name`.
    pub fn for_token(self, character_name: impl Into<String>) -> Self {
        Self::TokenCreation {
            character_name: character_name.into(),
            source: Box::new(self),
        }
    }

    /// Return `true` for [`TokenError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Name of the entity a [`TokenError::TokenCreation`] is attributed to.
    pub fn character_name(&self) -> Option<&str> {
        match self {
            Self::TokenCreation { character_name, .. } => Some(character_name),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
