mod color;
mod svg;

pub use color::Color;
pub(crate) use svg::*;
