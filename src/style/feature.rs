use serde::Serialize;

use crate::common::Color;

/// Stroke treatment of a feature, in increasing order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Emphasis {
    Baseline,
    Selected,
    Hovered,
}

/// Visual style of one rendered feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub fill_opacity: f64,
    pub dashed: bool,
}

impl FeatureStyle {
    pub fn baseline(fill_color: Color) -> Self {
        Self { fill_color, stroke_color: Color::WHITE, stroke_width: 2.0, fill_opacity: 0.7, dashed: true }
    }

    pub fn hovered(fill_color: Color) -> Self {
        Self { fill_color, stroke_color: Color::GRAY, stroke_width: 5.0, fill_opacity: 0.9, dashed: false }
    }

    pub fn selected(fill_color: Color) -> Self {
        Self { fill_color, stroke_color: Color::BLACK, stroke_width: 4.0, fill_opacity: 0.9, dashed: true }
    }

    pub fn with_emphasis(fill_color: Color, emphasis: Emphasis) -> Self {
        match emphasis {
            Emphasis::Baseline => Self::baseline(fill_color),
            Emphasis::Selected => Self::selected(fill_color),
            Emphasis::Hovered => Self::hovered(fill_color),
        }
    }
}
