//! Configuration surface for the choropleth engine.
//!
//! Everything the engine needs to know about the dataset at hand (which property
//! joins geometry to values, which factors exist, their palettes) arrives here
//! at initialization. Nothing below this module hardcodes a factor or a key name.

use std::{collections::HashSet, fmt, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::common::Color;

/// Identifier of a statistical factor, e.g. `air_quality`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorId(String);

impl FactorId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for FactorId {
    fn from(id: &str) -> Self { Self(id.to_string()) }
}

impl From<String> for FactorId {
    fn from(id: String) -> Self { Self(id) }
}

/// Presentation metadata and palette for one factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorConfig {
    pub id: FactorId,
    #[serde(default)]
    pub label: String,
    /// Accent color used next to the label (popup icon, legend title).
    #[serde(default)]
    pub color: Option<Color>,
    /// Icon name understood by the host UI, e.g. `fa-wind`.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    /// Ordered low -> high color ramp.
    pub palette: Vec<Color>,
}

impl FactorConfig {
    /// Display label, falling back to the identifier.
    pub fn label(&self) -> &str {
        if self.label.is_empty() { self.id.as_str() } else { &self.label }
    }

    /// Accent color, falling back to the darkest palette entry.
    pub fn accent(&self) -> Color {
        self.color
            .or_else(|| self.palette.last().copied())
            .unwrap_or(Color::GRAY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethConfig {
    /// Feature property joined against the value table's region keys.
    pub matching_property: String,
    pub default_year: i32,
    pub default_factor: FactorId,
    /// Known factors. The first entry's palette doubles as the fallback palette.
    pub factors: Vec<FactorConfig>,
    pub no_data_color: Color,
    /// Number of legend bands.
    pub legend_steps: usize,
    /// Padding (in screen pixels) applied when focusing on a region.
    pub focus_padding: f64,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            matching_property: "local_authority".to_string(),
            default_year: 2025,
            default_factor: FactorId::from("air_quality"),
            factors: default_factors(),
            no_data_color: Color::NO_DATA,
            legend_steps: 8,
            focus_padding: 20.0,
        }
    }
}

impl ChoroplethConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .context("[ChoroplethConfig] Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[ChoroplethConfig] Failed to read {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("[ChoroplethConfig] Invalid config in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.matching_property.is_empty(), "[ChoroplethConfig] matching_property must not be empty");
        ensure!(!self.factors.is_empty(), "[ChoroplethConfig] at least one factor must be configured");
        ensure!(self.legend_steps >= 1, "[ChoroplethConfig] legend_steps must be at least 1");
        ensure!(
            self.focus_padding.is_finite() && self.focus_padding >= 0.0,
            "[ChoroplethConfig] focus_padding must be a non-negative number, got {}", self.focus_padding
        );

        let mut seen = HashSet::new();
        for factor in &self.factors {
            ensure!(seen.insert(&factor.id), "[ChoroplethConfig] duplicate factor id '{}'", factor.id);
            ensure!(!factor.palette.is_empty(), "[ChoroplethConfig] factor '{}' has an empty palette", factor.id);
        }

        if self.factor(&self.default_factor).is_none() {
            tracing::warn!(
                factor = %self.default_factor,
                "default factor is not configured; the fallback palette will be used"
            );
        }

        Ok(())
    }

    /// Look up a configured factor.
    pub fn factor(&self, id: &FactorId) -> Option<&FactorConfig> {
        self.factors.iter().find(|factor| &factor.id == id)
    }
}

fn factor(id: &str, label: &str, icon: &str, description: &str, color: u32, palette: [u32; 10]) -> FactorConfig {
    FactorConfig {
        id: FactorId::from(id),
        label: label.to_string(),
        color: Some(Color::from_u32(color)),
        icon: icon.to_string(),
        description: description.to_string(),
        palette: palette.into_iter().map(Color::from_u32).collect(),
    }
}

fn default_factors() -> Vec<FactorConfig> {
    vec![
        factor("air_quality", "Air Quality", "fa-wind",
            "Benefits from improved air quality", 0x4caf50,
            [0xe8f5e8, 0xc8e6c9, 0xa5d6a7, 0x81c784, 0x66bb6a, 0x4caf50, 0x43a047, 0x388e3c, 0x2e7d32, 0x1b5e20]),
        factor("congestion", "Congestion", "fa-traffic-light",
            "Impact on traffic congestion levels", 0xff9800,
            [0xfff3e0, 0xffe0b2, 0xffcc80, 0xffb74d, 0xffa726, 0xff9800, 0xfb8c00, 0xf57c00, 0xef6c00, 0xe65100]),
        factor("noise", "Noise", "fa-volume-up",
            "Effect on noise levels", 0x9c27b0,
            [0xf3e5f5, 0xe1bee7, 0xce93d8, 0xba68c8, 0xab47bc, 0x9c27b0, 0x8e24aa, 0x7b1fa2, 0x6a1b9a, 0x4a148c]),
        factor("physical_activity", "Physical Activity", "fa-running",
            "Benefits from increased physical activity", 0xffc107,
            [0xfffde7, 0xfff9c4, 0xfff59d, 0xfff176, 0xffee58, 0xffeb3b, 0xfdd835, 0xf9a825, 0xf57f17, 0xff6f00]),
        factor("road_repairs", "Road Condition", "fa-road",
            "Road repair costs and condition", 0x2196f3,
            [0xe3f2fd, 0xbbdefb, 0x90caf9, 0x64b5f6, 0x42a5f5, 0x2196f3, 0x1e88e5, 0x1976d2, 0x1565c0, 0x0d47a1]),
    ]
}
