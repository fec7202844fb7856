use ahash::AHashMap;
use anyhow::{anyhow, ensure, Result};
use serde::Serialize;

use crate::{common::Color, config::{ChoroplethConfig, FactorId}};

/// An ordered, non-empty low -> high color ramp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        ensure!(!colors.is_empty(), "[Palette] a palette needs at least one color");
        Ok(Self(colors))
    }

    #[inline] pub fn len(&self) -> usize { self.0.len() }

    /// Always false; palettes are non-empty by construction.
    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Color at `index`, clamped to the last entry.
    #[inline]
    pub fn color(&self, index: usize) -> Color {
        self.0[index.min(self.0.len() - 1)]
    }
}

/// Palettes per factor, with a fallback for factors that are not configured.
#[derive(Debug, Clone)]
pub struct PaletteTable {
    palettes: AHashMap<FactorId, Palette>,
    fallback: Palette,
}

impl PaletteTable {
    /// Build from the configured factors. The first factor's palette is the fallback.
    pub fn from_config(config: &ChoroplethConfig) -> Result<Self> {
        let mut palettes = AHashMap::with_capacity(config.factors.len());
        for factor in &config.factors {
            palettes.insert(factor.id.clone(), Palette::new(factor.palette.clone())?);
        }

        let fallback = config.factors.first()
            .map(|factor| Palette::new(factor.palette.clone()))
            .ok_or_else(|| anyhow!("[PaletteTable] no factors configured"))??;

        Ok(Self { palettes, fallback })
    }

    /// Palette of `factor`, or the fallback palette if it is unknown.
    #[inline]
    pub fn get(&self, factor: &FactorId) -> &Palette {
        self.palettes.get(factor).unwrap_or(&self.fallback)
    }
}
