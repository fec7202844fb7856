use anyhow::Result;

use crate::{
    common::Color,
    config::{ChoroplethConfig, FactorId},
    data::ValueRange,
    style::{Palette, PaletteTable},
};

/// Bucket of a normalized value in a palette of `len` colors:
/// `floor(normalized * len)` clamped to `[0, len - 1]`.
#[inline]
pub fn bucket_index(normalized: f64, len: usize) -> usize {
    let last = len.saturating_sub(1);
    let scaled = (normalized.clamp(0.0, 1.0) * len as f64).floor();
    (scaled as usize).min(last)
}

/// Maps values to discrete palette colors. Stateless apart from its tables, so a
/// given (value, factor, range) always yields the same color.
#[derive(Debug, Clone)]
pub struct ColorScale {
    palettes: PaletteTable,
    no_data: Color,
}

impl ColorScale {
    pub fn new(palettes: PaletteTable, no_data: Color) -> Self {
        Self { palettes, no_data }
    }

    pub fn from_config(config: &ChoroplethConfig) -> Result<Self> {
        Ok(Self::new(PaletteTable::from_config(config)?, config.no_data_color))
    }

    /// Color of a region: the no-data color when `value` is None, otherwise the
    /// palette bucket of the value's position within `range`.
    pub fn color_for(&self, value: Option<f64>, factor: &FactorId, range: &ValueRange) -> Color {
        match value {
            Some(value) => self.palette(factor).color(self.bucket_for(value, factor, range)),
            None => self.no_data,
        }
    }

    /// Palette bucket index of `value` for `factor`.
    pub fn bucket_for(&self, value: f64, factor: &FactorId, range: &ValueRange) -> usize {
        bucket_index(range.normalize(value), self.palette(factor).len())
    }

    #[inline] pub fn palette(&self, factor: &FactorId) -> &Palette { self.palettes.get(factor) }

    #[inline] pub fn no_data(&self) -> Color { self.no_data }
}
