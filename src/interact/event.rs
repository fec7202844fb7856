use geo::Point;
use serde::Serialize;

use crate::{
    config::FactorId,
    data::JoinCoverage,
    interact::{FetchRequest, MapError},
    layer::LayerId,
};

/// Input from the host: UI controls and pointer events on the map.
///
/// Feature events carry the layer they were raised on; events from a layer
/// that is no longer on the map are ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    FilterChanged { year: i32, factor: FactorId },
    FeatureHovered { layer: LayerId, key: String },
    FeatureUnhovered { layer: LayerId, key: String },
    /// `at` is the click position in lon/lat.
    FeatureClicked { layer: LayerId, key: String, at: Point<f64> },
    PopupClosed,
    AreaSelected { key: String },
    DetailRequested { key: String },
}

/// Result of dispatching a [`MapEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled,
    /// The event was a no-op, e.g. it came from a detached layer.
    Ignored,
    /// The host must fetch this value table and call `complete_fetch`.
    Fetch(FetchRequest),
    Rejected(MapError),
}

/// Result of completing a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A new layer was drawn. `layer` is None while no geometry is loaded.
    Rendered { layer: Option<LayerId>, coverage: JoinCoverage },
    /// A new layer was drawn with every region in the no-data color.
    NoData { layer: Option<LayerId>, reason: MapError },
    /// A newer request was already applied; nothing changed.
    Discarded(MapError),
    /// The fetch failed; the previous layer stays on the map.
    Failed(MapError),
}

impl FetchOutcome {
    /// Layer drawn by this completion, if any.
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Self::Rendered { layer, .. } | Self::NoData { layer, .. } => *layer,
            Self::Discarded(_) | Self::Failed(_) => None,
        }
    }
}

/// Output for the host that is not a viewport call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControllerEvent {
    /// Navigate to the detail view of a region.
    #[serde(rename_all = "camelCase")]
    DetailViewRequested { region_key: String },
}
