use serde::Serialize;

use crate::style::Emphasis;

/// Which regions are hovered, selected, or showing a popup.
///
/// Cleared whenever a new layer replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub hovered_key: Option<String>,
    pub selected_key: Option<String>,
    pub open_popup_key: Option<String>,
}

impl InteractionState {
    /// Emphasis of a feature with the given matching key. Hover beats selection.
    ///
    /// Leaving a hovered feature returns it to this resting emphasis, so the
    /// selected feature goes back to the selected style rather than to
    /// baseline as the original web map's `resetHighlight` did.
    pub fn emphasis_of(&self, key: Option<&str>) -> Emphasis {
        let Some(key) = key else { return Emphasis::Baseline };
        if self.hovered_key.as_deref() == Some(key) {
            Emphasis::Hovered
        } else if self.selected_key.as_deref() == Some(key) {
            Emphasis::Selected
        } else {
            Emphasis::Baseline
        }
    }

    pub fn reset(&mut self) { *self = Self::default() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_takes_precedence_over_selection() {
        let mut state = InteractionState {
            selected_key: Some("Leeds".to_string()),
            ..Default::default()
        };
        assert_eq!(state.emphasis_of(Some("Leeds")), Emphasis::Selected);
        assert_eq!(state.emphasis_of(Some("York")), Emphasis::Baseline);
        assert_eq!(state.emphasis_of(None), Emphasis::Baseline);

        state.hovered_key = Some("Leeds".to_string());
        assert_eq!(state.emphasis_of(Some("Leeds")), Emphasis::Hovered);

        state.reset();
        assert_eq!(state, InteractionState::default());
    }
}
