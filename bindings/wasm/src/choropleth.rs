use anyhow::anyhow;
use choromap_core::{
    ChoroplethConfig, ChoroplethController, Dispatch, FetchOutcome, JoinCoverage, LayerId,
    MapEvent, RequestId, SceneViewport, ValuesResponse,
};
use serde::Serialize;
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use crate::common::*;

/// Result of a fetch completion, as handed to JS.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeView {
    /// One of "rendered", "noData", "discarded", "failed".
    status: &'static str,
    layer: Option<u64>,
    message: Option<String>,
    coverage: Option<JoinCoverage>,
}

impl From<FetchOutcome> for OutcomeView {
    fn from(outcome: FetchOutcome) -> Self {
        let layer = outcome.layer().map(|layer| layer.get());
        match outcome {
            FetchOutcome::Rendered { coverage, .. } => Self { status: "rendered", layer, message: None, coverage: Some(coverage) },
            FetchOutcome::NoData { reason, .. } => Self { status: "noData", layer, message: Some(reason.to_string()), coverage: None },
            FetchOutcome::Discarded(e) => Self { status: "discarded", layer, message: Some(e.to_string()), coverage: None },
            FetchOutcome::Failed(e) => Self { status: "failed", layer, message: Some(e.to_string()), coverage: None },
        }
    }
}

/// Browser-side choropleth: the host does the fetching and pointer hit-testing,
/// this object owns the data, styles and interaction state.
#[wasm_bindgen]
pub struct WasmChoropleth {
    inner: ChoroplethController<SceneViewport>,
}

#[wasm_bindgen]
impl WasmChoropleth {
    /// Construct from an optional JSON config string; defaults apply otherwise.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmChoropleth, JsValue> {
        let config = match config_json {
            Some(json) => ChoroplethConfig::from_json_str(&json).map_err(js_err)?,
            None => ChoroplethConfig::default(),
        };
        let inner = ChoroplethController::new(config, SceneViewport::new()).map_err(js_err)?;
        Ok(WasmChoropleth { inner })
    }

    /// Load region boundaries from a GeoJSON FeatureCollection (object or string).
    pub fn load_geometry(&mut self, geojson: JsValue) -> Result<(), JsValue> {
        let value = js_to_json(&geojson).map_err(js_err)?;
        self.inner.load_geometry(&value).map_err(js_err)
    }

    /// Configured default selection as `{ year, factor }`.
    pub fn default_filter(&self) -> Result<JsValue, JsValue> {
        let config = self.inner.config();
        to_js(&serde_json::json!({ "year": config.default_year, "factor": config.default_factor }))
    }

    /// Start a fetch for a new year/factor. Returns the request id to pass to
    /// `complete_fetch` or `fail_fetch`.
    pub fn change_filter(&mut self, year: i32, factor: String) -> Result<u32, JsValue> {
        let request = self.inner.on_filter_change(year, factor);
        u32::try_from(request.id.get()).map_err(js_err)
    }

    /// Apply a `{ success, data: [{ local_authority, value }] }` response.
    pub fn complete_fetch(&mut self, id: u32, response: JsValue) -> Result<JsValue, JsValue> {
        let response = js_to_json(&response)
            .and_then(|value| serde_json::from_value::<ValuesResponse>(value).map_err(|e| anyhow!("invalid response: {e}")));
        let outcome = self.inner.complete_fetch(RequestId::from(u64::from(id)), response);
        to_js(&OutcomeView::from(outcome))
    }

    /// Report a transport failure for a fetch.
    pub fn fail_fetch(&mut self, id: u32, message: String) -> Result<JsValue, JsValue> {
        let outcome = self.inner.complete_fetch(RequestId::from(u64::from(id)), Err(anyhow!(message)));
        to_js(&OutcomeView::from(outcome))
    }

    /// Pointer entered a feature. Returns false if the event was ignored.
    pub fn hover(&mut self, layer: u32, key: String) -> bool {
        self.handled(MapEvent::FeatureHovered { layer: LayerId::from(u64::from(layer)), key })
    }

    /// Pointer left a feature.
    pub fn unhover(&mut self, layer: u32, key: String) -> bool {
        self.handled(MapEvent::FeatureUnhovered { layer: LayerId::from(u64::from(layer)), key })
    }

    /// Feature clicked at a lon/lat position; opens its popup.
    pub fn click(&mut self, layer: u32, key: String, lon: f64, lat: f64) -> bool {
        let at = (lon, lat).into();
        self.handled(MapEvent::FeatureClicked { layer: LayerId::from(u64::from(layer)), key, at })
    }

    pub fn close_popup(&mut self) -> bool {
        self.handled(MapEvent::PopupClosed)
    }

    /// Focus a region picked from the area list.
    pub fn select_area(&mut self, key: String) -> Result<(), JsValue> {
        self.inner.on_area_picked(&key).map_err(js_err)
    }

    pub fn request_detail_view(&mut self, key: String) {
        self.inner.request_detail_view(key);
    }

    /// Matching key of the feature under a lon/lat point.
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<String> {
        let geometry = self.inner.geometry()?;
        let idx = geometry.feature_at((lon, lat).into())?;
        geometry.key(idx).map(str::to_string)
    }

    /// Sorted region names.
    pub fn area_catalog(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.area_catalog())
    }

    /// Current layer, styles, legend, popup and view.
    pub fn scene(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.viewport().scene())
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.viewport_mut().take_notices())
    }

    /// Controller events raised since the last call, e.g. detail view requests.
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.drain_events())
    }

    /// Render the current scene as SVG text.
    #[wasm_bindgen(js_name = "to_svg")]
    pub fn to_svg(&self, width: Option<f64>) -> Result<String, JsValue> {
        let geometry = self.inner.geometry().ok_or_else(|| js_err("No geometry loaded."))?;
        self.inner.viewport().scene()
            .to_svg_string(geometry, width.unwrap_or(1200.0))
            .map_err(js_err)
    }
}

impl WasmChoropleth {
    fn handled(&mut self, event: MapEvent) -> bool {
        matches!(self.inner.dispatch(event), Dispatch::Handled)
    }
}
