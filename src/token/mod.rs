pub mod batch;
pub(crate) mod decorations;
pub mod generator;
pub(crate) mod text_renderer;
