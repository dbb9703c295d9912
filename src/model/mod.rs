pub mod character;
pub mod color;
pub mod options;
pub mod script;
pub mod token;
