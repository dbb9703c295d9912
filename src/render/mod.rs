pub(crate) mod blur;
pub mod canvas;
pub(crate) mod composite;
pub mod qr;
