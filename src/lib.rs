#![doc = "Choromap public API"]
mod common;
mod config;
mod data;
mod geom;
mod interact;
mod layer;
mod style;

#[doc(inline)]
pub use common::Color;

#[doc(inline)]
pub use config::{ChoroplethConfig, FactorConfig, FactorId};

#[doc(inline)]
pub use geom::{Feature, GeometrySource};

#[doc(inline)]
pub use data::{AreaCatalog, DataSource, JoinCoverage, JoinIndex, MemSource, ValueRange, ValueRecord, ValuesResponse};

#[cfg(feature = "files")]
#[doc(inline)]
pub use data::{FileSource, ValueColumns};

#[doc(inline)]
pub use style::{bucket_index, legend_bands, ColorScale, Emphasis, FeatureStyle, Legend, LegendBand, Palette, PaletteTable};

#[doc(inline)]
pub use layer::{LayerHandle, LayerId, LayerRenderer, Scene, SceneViewport, ViewBounds, Viewport};

#[doc(inline)]
pub use interact::{
    ChoroplethController, ControllerEvent, Dispatch, FetchOutcome, FetchRequest, Filter,
    InteractionState, MapError, MapEvent, Popup, RequestId, RequestSequencer,
};
