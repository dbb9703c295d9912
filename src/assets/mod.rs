pub mod cache;
pub mod decode;
pub mod loader;
pub mod resolver;
pub(crate) mod svg_raster;
