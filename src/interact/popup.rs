use std::fmt;

use serde::Serialize;

use crate::{
    common::Color,
    config::{ChoroplethConfig, FactorId},
};

/// Details shown when a region is clicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Popup {
    pub region_key: String,
    /// Click position as `[lon, lat]`.
    pub anchor: [f64; 2],
    /// None when the region has no value for the rendered selection.
    pub value: Option<f64>,
    pub year: i32,
    pub factor: FactorId,
    pub factor_label: String,
    pub factor_icon: String,
    pub factor_color: Color,
}

impl Popup {
    pub fn new(
        config: &ChoroplethConfig,
        region_key: impl Into<String>,
        anchor: [f64; 2],
        value: Option<f64>,
        year: i32,
        factor: &FactorId,
    ) -> Self {
        let meta = config.factor(factor);
        Self {
            region_key: region_key.into(),
            anchor,
            value,
            year,
            factor: factor.clone(),
            factor_label: meta.map_or_else(|| factor.to_string(), |f| f.label().to_string()),
            factor_icon: meta.map(|f| f.icon.clone()).unwrap_or_default(),
            factor_color: meta.map_or(Color::GRAY, |f| f.accent()),
        }
    }

    #[inline] pub fn has_data(&self) -> bool { self.value.is_some() }

    /// Text lines of the popup body, title first.
    pub fn lines(&self) -> Vec<String> {
        match self.value {
            Some(value) => vec![
                self.region_key.clone(),
                format!("Value: {value:.2}"),
                format!("Year: {}", self.year),
                format!("Factor: {}", self.factor_label),
            ],
            None => vec![
                self.region_key.clone(),
                "No data for this year".to_string(),
            ],
        }
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_value_year_and_factor_label() {
        let config = ChoroplethConfig::default();
        let popup = Popup::new(&config, "Leeds", [-1.5, 53.8], Some(12.345), 2030, &"air_quality".into());

        assert!(popup.has_data());
        assert_eq!(popup.factor_icon, "fa-wind");
        assert_eq!(popup.to_string(), "Leeds\nValue: 12.35\nYear: 2030\nFactor: Air Quality");
    }

    #[test]
    fn missing_value_says_no_data() {
        let config = ChoroplethConfig::default();
        let popup = Popup::new(&config, "Manchester", [0.0, 0.0], None, 2025, &"unknown".into());

        assert!(!popup.has_data());
        assert_eq!(popup.lines(), vec!["Manchester", "No data for this year"]);
        assert_eq!(popup.factor_label, "unknown");
        assert_eq!(popup.factor_color, Color::GRAY);
    }

    #[test]
    fn zero_is_shown_as_a_value() {
        let config = ChoroplethConfig::default();
        let popup = Popup::new(&config, "York", [0.0, 0.0], Some(0.0), 2025, &"noise".into());
        assert_eq!(popup.lines()[1], "Value: 0.00");
    }
}
