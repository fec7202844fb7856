use anyhow::{Context, Result};
use geo::Point;
use serde_json::Value;

use crate::{
    config::{ChoroplethConfig, FactorId},
    data::{AreaCatalog, DataSource, JoinCoverage, JoinIndex, ValuesResponse},
    geom::GeometrySource,
    interact::{
        ControllerEvent, Dispatch, FetchOutcome, FetchRequest, Filter, InteractionState,
        MapError, MapEvent, Popup, RequestId, RequestSequencer,
    },
    layer::{LayerHandle, LayerId, LayerRenderer, Viewport},
    style::ColorScale,
};

const FETCH_FAILED_NOTICE: &str = "Error loading map data. Please try again.";

/// Owns the geometry, the current join, the active layer and the interaction
/// state, and is the only thing that mutates them.
///
/// The controller performs no I/O itself. Filter changes return a
/// [`FetchRequest`]; the host fetches the value table however it likes and
/// hands the result back through [`complete_fetch`](Self::complete_fetch).
/// Until then the previous layer stays on the map.
#[derive(Debug)]
pub struct ChoroplethController<V: Viewport> {
    config: ChoroplethConfig,
    scale: ColorScale,
    viewport: V,
    geometry: Option<GeometrySource>,
    catalog: AreaCatalog,
    join: JoinIndex,
    filter: Filter,  // Selection the current join was fetched for
    loaded: bool,    // Whether any fetch has been applied
    renderer: LayerRenderer,
    state: InteractionState,
    requests: RequestSequencer,
    events: Vec<ControllerEvent>,
}

impl<V: Viewport> ChoroplethController<V> {
    pub fn new(config: ChoroplethConfig, viewport: V) -> Result<Self> {
        config.validate()?;
        let scale = ColorScale::from_config(&config)?;
        let filter = Filter::new(config.default_year, config.default_factor.clone());

        Ok(Self {
            config,
            scale,
            viewport,
            geometry: None,
            catalog: AreaCatalog::default(),
            join: JoinIndex::default(),
            filter,
            loaded: false,
            renderer: LayerRenderer::new(),
            state: InteractionState::default(),
            requests: RequestSequencer::new(),
            events: Vec::new(),
        })
    }

    #[inline] pub fn config(&self) -> &ChoroplethConfig { &self.config }

    #[inline] pub fn viewport(&self) -> &V { &self.viewport }

    #[inline] pub fn viewport_mut(&mut self) -> &mut V { &mut self.viewport }

    #[inline] pub fn geometry(&self) -> Option<&GeometrySource> { self.geometry.as_ref() }

    /// Join of the most recently applied value table.
    #[inline] pub fn join(&self) -> &JoinIndex { &self.join }

    /// Year/factor of the data currently on the map.
    #[inline] pub fn filter(&self) -> &Filter { &self.filter }

    #[inline] pub fn state(&self) -> &InteractionState { &self.state }

    /// The layer currently attached to the viewport.
    #[inline] pub fn layer(&self) -> Option<&LayerHandle> { self.renderer.active() }

    /// Sorted region names for an area picker.
    #[inline] pub fn area_catalog(&self) -> &AreaCatalog { &self.catalog }

    /// Number of fetches issued and not yet completed.
    #[inline] pub fn in_flight(&self) -> usize { self.requests.in_flight() }

    /// Replace the geometry from a parsed GeoJSON FeatureCollection.
    pub fn load_geometry(&mut self, geojson: &Value) -> Result<()> {
        let geometry = GeometrySource::from_geojson(geojson, self.config.matching_property.as_str())
            .context("[ChoroplethController] Failed to load geometry")?;
        self.set_geometry(geometry);
        Ok(())
    }

    /// Replace the geometry, rebuild the area catalog and redraw any loaded data.
    pub fn set_geometry(&mut self, geometry: GeometrySource) {
        self.catalog = AreaCatalog::build(&geometry);
        tracing::info!(features = geometry.len(), areas = self.catalog.len(), "loaded geometry");

        self.geometry = Some(geometry);
        self.state.reset();
        if self.loaded {
            self.rebuild();
        }
    }

    /// Fetch and load geometry from a data source.
    pub fn load_geometry_from(&mut self, source: &dyn DataSource) -> Result<()> {
        let geojson = source.fetch_geometry()
            .context("[ChoroplethController] Failed to fetch geometry")?;
        self.load_geometry(&geojson)
    }

    /// Run one complete fetch cycle against a data source.
    pub fn refresh_from(&mut self, source: &dyn DataSource, year: i32, factor: impl Into<FactorId>) -> FetchOutcome {
        let request = self.on_filter_change(year, factor);
        let response = source.fetch_values(request.year, &request.factor);
        self.complete_fetch(request.id, response)
    }

    /// Handle one input event.
    pub fn dispatch(&mut self, event: MapEvent) -> Dispatch {
        match event {
            MapEvent::FilterChanged { year, factor } => Dispatch::Fetch(self.on_filter_change(year, factor)),
            MapEvent::FeatureHovered { layer, key } => self.hover_enter(layer, key),
            MapEvent::FeatureUnhovered { layer, key } => self.hover_exit(layer, &key),
            MapEvent::FeatureClicked { layer, key, at } => self.click(layer, key, at),
            MapEvent::PopupClosed => self.popup_closed(),
            MapEvent::AreaSelected { key } => match self.on_area_picked(&key) {
                Ok(()) => Dispatch::Handled,
                Err(e) => Dispatch::Rejected(e),
            },
            MapEvent::DetailRequested { key } => {
                self.request_detail_view(key);
                Dispatch::Handled
            }
        }
    }

    /// Start a fetch for a new year/factor. The current layer stays visible
    /// until the response is completed.
    pub fn on_filter_change(&mut self, year: i32, factor: impl Into<FactorId>) -> FetchRequest {
        let factor = factor.into();
        if self.config.factor(&factor).is_none() {
            tracing::warn!(%factor, "unknown factor; using the fallback palette");
        }

        let request = self.requests.issue(Filter::new(year, factor));
        tracing::debug!(id = %request.id, year, factor = %request.factor, "issued value fetch");
        request
    }

    /// Apply the result of fetch `id`.
    ///
    /// Responses superseded by a newer applied response are discarded. A
    /// transport or parse error keeps the current layer; a `success: false`
    /// response or an empty table renders every region as no-data.
    pub fn complete_fetch(&mut self, id: RequestId, response: Result<ValuesResponse>) -> FetchOutcome {
        let filter = match self.requests.complete(id) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::debug!(%id, "discarding response: {e}");
                return FetchOutcome::Discarded(e);
            }
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%id, year = filter.year, factor = %filter.factor, "value fetch failed: {e:#}");
                self.viewport.notify(FETCH_FAILED_NOTICE);
                return FetchOutcome::Failed(MapError::FetchFailure(format!("{e:#}")));
            }
        };

        if !response.success {
            let reason = response.error.unwrap_or_else(|| "server reported failure".to_string());
            tracing::warn!(%id, year = filter.year, factor = %filter.factor, reason = %reason, "value fetch unsuccessful");
            self.viewport.notify(FETCH_FAILED_NOTICE);
            let layer = self.apply(filter, JoinIndex::default());
            return FetchOutcome::NoData { layer, reason: MapError::FetchFailure(reason) };
        }

        let join = JoinIndex::build(&response.data);
        if join.is_empty() {
            tracing::warn!(year = filter.year, factor = %filter.factor, "value table is empty; rendering no data");
            let reason = MapError::EmptyJoin { year: filter.year, factor: filter.factor.clone() };
            let layer = self.apply(filter, join);
            return FetchOutcome::NoData { layer, reason };
        }

        let layer = self.apply(filter, join);
        let coverage = self.geometry.as_ref()
            .map(|geometry| self.join.coverage(geometry))
            .unwrap_or_default();
        tracing::info!(
            matched = coverage.matched,
            only_in_values = coverage.only_in_values.len(),
            only_in_geometry = coverage.only_in_geometry.len(),
            "joined value table"
        );
        FetchOutcome::Rendered { layer, coverage }
    }

    /// Coverage of the current join against the loaded geometry.
    pub fn coverage(&self) -> Option<JoinCoverage> {
        self.geometry.as_ref().map(|geometry| self.join.coverage(geometry))
    }

    /// Select a region from an area picker: emphasize it and fit the viewport to it.
    /// Unknown regions leave the map unchanged.
    pub fn on_area_picked(&mut self, key: &str) -> Result<(), MapError> {
        let Some(geometry) = self.geometry.as_ref().filter(|geometry| geometry.contains_key(key)) else {
            tracing::warn!(key, "ignoring selection of unknown region");
            return Err(MapError::InvalidSelection(key.to_string()));
        };

        if let Some(bounds) = geometry.bounds_of(key) {
            self.viewport.fit_bounds(bounds, self.config.focus_padding);
        }

        self.state.selected_key = Some(key.to_string());
        self.state.hovered_key = None;
        self.restyle_all();
        tracing::debug!(key, "focused region");
        Ok(())
    }

    /// Ask the host to open the detail view of a region.
    pub fn request_detail_view(&mut self, key: impl Into<String>) {
        let region_key = key.into();
        tracing::debug!(region = %region_key, "detail view requested");
        self.events.push(ControllerEvent::DetailViewRequested { region_key });
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> { std::mem::take(&mut self.events) }

    fn hover_enter(&mut self, layer: LayerId, key: String) -> Dispatch {
        if !self.accepts(layer, &key) { return Dispatch::Ignored }
        if self.state.hovered_key.as_deref() == Some(key.as_str()) { return Dispatch::Handled }

        if let Some(previous) = self.state.hovered_key.replace(key.clone()) {
            self.restyle_key(&previous);
        }
        self.restyle_key(&key);
        Dispatch::Handled
    }

    fn hover_exit(&mut self, layer: LayerId, key: &str) -> Dispatch {
        if !self.renderer.is_active(layer) || self.state.hovered_key.as_deref() != Some(key) {
            return Dispatch::Ignored;
        }

        self.state.hovered_key = None;
        self.restyle_key(key);
        Dispatch::Handled
    }

    fn click(&mut self, layer: LayerId, key: String, at: Point<f64>) -> Dispatch {
        if !self.accepts(layer, &key) { return Dispatch::Ignored }

        if self.state.open_popup_key.take().is_some() {
            self.viewport.close_popup();
        }

        let popup = Popup::new(
            &self.config, key.as_str(), [at.x(), at.y()],
            self.join.get(&key), self.filter.year, &self.filter.factor,
        );
        self.viewport.open_popup(&popup);
        self.state.open_popup_key = Some(key);
        Dispatch::Handled
    }

    fn popup_closed(&mut self) -> Dispatch {
        match self.state.open_popup_key.take() {
            Some(_) => {
                self.viewport.close_popup();
                Dispatch::Handled
            }
            None => Dispatch::Ignored,
        }
    }

    /// Feature events are only honored for the active layer and known regions.
    fn accepts(&self, layer: LayerId, key: &str) -> bool {
        let accepted = self.renderer.is_active(layer)
            && self.geometry.as_ref().is_some_and(|geometry| geometry.contains_key(key));
        if !accepted {
            tracing::trace!(%layer, key, "ignoring event for inactive layer or unknown region");
        }
        accepted
    }

    /// Install a new join and redraw from scratch.
    fn apply(&mut self, filter: Filter, join: JoinIndex) -> Option<LayerId> {
        self.filter = filter;
        self.join = join;
        self.loaded = true;
        self.state.reset();
        self.rebuild()
    }

    fn rebuild(&mut self) -> Option<LayerId> {
        let geometry = self.geometry.as_ref()?;
        let handle = self.renderer.render(
            &mut self.viewport, geometry, &self.join, &self.scale, &self.config, &self.filter.factor,
        );
        Some(handle.id())
    }

    fn restyle_key(&mut self, key: &str) {
        let (Some(geometry), Some(handle)) = (self.geometry.as_ref(), self.renderer.active()) else { return };
        for &idx in geometry.indices_of(key) {
            self.viewport.restyle(handle.id(), idx, handle.style_of(idx, &self.state, geometry));
        }
    }

    fn restyle_all(&mut self) {
        let (Some(geometry), Some(handle)) = (self.geometry.as_ref(), self.renderer.active()) else { return };
        for idx in 0..geometry.len() {
            self.viewport.restyle(handle.id(), idx, handle.style_of(idx, &self.state, geometry));
        }
    }
}
