mod feature;
mod legend;
mod palette;
mod scale;

pub use feature::{Emphasis, FeatureStyle};
pub use legend::{legend_bands, Legend, LegendBand};
pub use palette::{Palette, PaletteTable};
pub use scale::{bucket_index, ColorScale};
