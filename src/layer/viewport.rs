use std::fmt;

use geo::Rect;
use serde::{Deserialize, Serialize};

use crate::{interact::Popup, style::{FeatureStyle, Legend}};

/// Identity of one render pass. Every render attaches a layer with a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub(crate) u64);

impl LayerId {
    #[inline] pub fn get(&self) -> u64 { self.0 }
}

impl From<u64> for LayerId {
    fn from(id: u64) -> Self { Self(id) }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "layer#{}", self.0) }
}

/// The map surface the engine draws on.
///
/// Feature indices refer to positions in the GeometrySource the layer was
/// rendered from. Once a layer is detached the surface must stop reporting
/// pointer events for it.
pub trait Viewport {
    /// Add a layer with one style per feature.
    fn attach_layer(&mut self, layer: LayerId, styles: &[FeatureStyle]);

    /// Remove a layer and its event bindings.
    fn detach_layer(&mut self, layer: LayerId);

    /// Replace the style of one feature of an attached layer.
    fn restyle(&mut self, layer: LayerId, feature: usize, style: FeatureStyle);

    fn show_legend(&mut self, legend: &Legend);

    fn remove_legend(&mut self);

    fn open_popup(&mut self, popup: &Popup);

    fn close_popup(&mut self);

    /// Fit the visible area to a lon/lat rectangle, leaving `padding` pixels around it.
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64);

    /// Show a transient message to the user.
    fn notify(&mut self, message: &str);
}
