pub mod circular;
pub mod curved;
pub mod fonts;
