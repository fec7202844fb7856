use serde::Serialize;

use crate::{common::Color, config::FactorId, data::ValueRange, style::Palette};

/// One legend row: a value interval and its swatch color.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendBand {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub color: Color,
}

impl LegendBand {
    /// Display label, e.g. `10.00 – 12.50`.
    pub fn label(&self) -> String {
        format!("{:.2} \u{2013} {:.2}", self.lower_bound, self.upper_bound)
    }
}

/// `steps` equal-width bands spanning `range`, band `i` colored with `palette[i]`.
///
/// A degenerate range still yields `steps` bands (all with the same bounds) so
/// that hosts can rely on a fixed band count for layout.
pub fn legend_bands(range: &ValueRange, palette: &Palette, steps: usize) -> Vec<LegendBand> {
    let steps = steps.max(1);
    range.breaks(steps)
        .windows(2)
        .enumerate()
        .map(|(i, bounds)| LegendBand {
            lower_bound: bounds[0],
            upper_bound: bounds[1],
            color: palette.color(i),
        })
        .collect()
}

/// Legend for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub factor: FactorId,
    pub range: ValueRange,
    pub bands: Vec<LegendBand>,
}

impl Legend {
    pub fn new(title: impl Into<String>, factor: FactorId, range: ValueRange, palette: &Palette, steps: usize) -> Self {
        Self {
            title: title.into(),
            bands: legend_bands(&range, palette, steps),
            factor,
            range,
        }
    }
}
