//! Procedural rendering of printable circular tokens for social-deduction scripts.
//!
//! A [`TokenGenerator`] turns [`Character`] definitions and [`ScriptMeta`] into rasterized
//! [`Token`]s:
//!
//! - Parse a script with [`parse_script`]
//! - Configure rendering through [`GenerationOptions`]
//! - Render single tokens, or a whole script with [`generate_all_tokens`]
//!
//! Artwork is fetched through an [`ImageProvider`] (by default the process-wide
//! [`global_image_cache`]) and text is shaped with fonts from a [`FontBook`].
#![forbid(unsafe_code)]

mod foundation;

/// Image loading, decoding and caching.
pub mod assets;
/// Icon placement rules.
pub mod layout;
/// Input and output data types.
pub mod model;
/// Raster surface and drawing primitives.
pub mod render;
/// Font loading and text layout.
pub mod text;
/// Token and batch generation.
pub mod token;

pub use crate::foundation::core::{Affine, Dpi, MAX_TOKEN_PX, Point, Rect, pixel_diameter};
pub use crate::foundation::error::{TokenError, TokenResult};

pub use crate::assets::cache::{
    CacheConfig, CacheStats, ImageCache, ImageProvider, PreloadReport, global_image_cache,
};
pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::loader::{CorsProxySetting, HttpImageLoader, ImageLoader, LoaderConfig};
pub use crate::assets::resolver::{AssetResolver, ResolvedAsset, StaticAssetCatalog};
pub use crate::model::character::{Character, ImageRef, ScriptMeta, Team};
pub use crate::model::color::Color;
pub use crate::model::options::{GenerationOptions, GenerationOptionsPatch};
pub use crate::model::script::{Script, parse_script};
pub use crate::model::token::{Token, TokenKind};
pub use crate::render::canvas::TokenCanvas;
pub use crate::text::fonts::FontBook;
pub use crate::token::batch::{BatchFailure, BatchOutput, BatchProgress, generate_all_tokens};
pub use crate::token::generator::TokenGenerator;
