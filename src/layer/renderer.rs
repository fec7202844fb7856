use crate::{
    common::Color,
    config::{ChoroplethConfig, FactorId},
    data::{JoinIndex, ValueRange},
    geom::GeometrySource,
    interact::InteractionState,
    layer::{LayerId, Viewport},
    style::{ColorScale, Emphasis, FeatureStyle, Legend},
};

/// Fill colors and legend of the layer currently on the map.
///
/// Fills are fixed at render time; only strokes change with interaction, so the
/// style of a feature is a function of its fill and the interaction state.
#[derive(Debug, Clone)]
pub struct LayerHandle {
    id: LayerId,
    factor: FactorId,
    range: Option<ValueRange>,
    fills: Vec<Color>,
    legend: Option<Legend>,
}

impl LayerHandle {
    #[inline] pub fn id(&self) -> LayerId { self.id }

    #[inline] pub fn factor(&self) -> &FactorId { &self.factor }

    /// Value range of the join this layer was colored from; None for an empty join.
    #[inline] pub fn range(&self) -> Option<ValueRange> { self.range }

    /// Fill color per feature, in geometry order.
    #[inline] pub fn fills(&self) -> &[Color] { &self.fills }

    #[inline] pub fn legend(&self) -> Option<&Legend> { self.legend.as_ref() }

    /// Style of feature `idx` under the given emphasis.
    pub fn style(&self, idx: usize, emphasis: Emphasis) -> FeatureStyle {
        let fill = self.fills.get(idx).copied().unwrap_or(Color::NO_DATA);
        FeatureStyle::with_emphasis(fill, emphasis)
    }

    /// Style of feature `idx` given the current interaction state.
    pub fn style_of(&self, idx: usize, state: &InteractionState, geometry: &GeometrySource) -> FeatureStyle {
        self.style(idx, state.emphasis_of(geometry.key(idx)))
    }

    /// Styles of every feature given the current interaction state.
    pub fn styles(&self, state: &InteractionState, geometry: &GeometrySource) -> Vec<FeatureStyle> {
        (0..self.fills.len())
            .map(|idx| self.style_of(idx, state, geometry))
            .collect()
    }
}

/// Owns the single active layer and replaces it on every render.
#[derive(Debug, Default)]
pub struct LayerRenderer {
    next_id: u64,
    active: Option<LayerHandle>,
}

impl LayerRenderer {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn active(&self) -> Option<&LayerHandle> { self.active.as_ref() }

    /// True if `layer` is the layer currently on the map.
    #[inline]
    pub fn is_active(&self, layer: LayerId) -> bool {
        self.active.as_ref().is_some_and(|handle| handle.id == layer)
    }

    /// Remove the active layer, its legend and any open popup from the viewport.
    pub fn teardown<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> Option<LayerHandle> {
        let handle = self.active.take()?;
        viewport.close_popup();
        viewport.remove_legend();
        viewport.detach_layer(handle.id);
        tracing::trace!(layer = %handle.id, "detached layer");
        Some(handle)
    }

    /// Replace the active layer with one colored from `join`.
    ///
    /// The previous layer is fully detached before the new one is attached. An
    /// empty join renders every feature as no-data and shows no legend.
    pub fn render<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        geometry: &GeometrySource,
        join: &JoinIndex,
        scale: &ColorScale,
        config: &ChoroplethConfig,
        factor: &FactorId,
    ) -> &LayerHandle {
        self.teardown(viewport);

        let range = join.range();
        let fills: Vec<Color> = geometry.keys()
            .map(|key| match (key, range) {
                (Some(key), Some(range)) => scale.color_for(join.get(key), factor, &range),
                _ => scale.no_data(),
            })
            .collect();

        let legend = range.map(|range| {
            let title = config.factor(factor).map_or(factor.as_str(), |f| f.label());
            Legend::new(title, factor.clone(), range, scale.palette(factor), config.legend_steps)
        });

        self.next_id += 1;
        let handle = LayerHandle { id: LayerId(self.next_id), factor: factor.clone(), range, fills, legend };

        let styles: Vec<FeatureStyle> = (0..handle.fills.len())
            .map(|idx| handle.style(idx, Emphasis::Baseline))
            .collect();
        viewport.attach_layer(handle.id, &styles);
        if let Some(legend) = &handle.legend {
            viewport.show_legend(legend);
        }

        let colored = geometry.keys()
            .filter(|key| key.is_some_and(|key| join.get(key).is_some()))
            .count();
        tracing::debug!(
            layer = %handle.id, %factor, features = geometry.len(), colored,
            "rendered choropleth layer"
        );

        self.active.insert(handle)
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};
    use serde_json::json;

    use super::*;
    use crate::{
        data::ValueRecord,
        geom::Feature,
        layer::viewport::recording::{Call, RecordingViewport},
    };

    fn geometry(names: &[&str]) -> GeometrySource {
        let square = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)]]);
        let features = names.iter()
            .map(|name| Feature::new(json!({ "local_authority": name }).as_object().cloned().unwrap(), square.clone()))
            .collect();
        GeometrySource::new(features, "local_authority")
    }

    fn join(pairs: &[(&str, f64)]) -> JoinIndex {
        let records: Vec<ValueRecord> = pairs.iter().map(|&(k, v)| ValueRecord::new(k, v)).collect();
        JoinIndex::build(&records)
    }

    #[test]
    fn fills_follow_join_and_missing_regions_are_no_data() {
        let config = ChoroplethConfig::default();
        let scale = ColorScale::from_config(&config).unwrap();
        let geometry = geometry(&["Leeds", "York", "Manchester"]);
        let factor = FactorId::from("air_quality");
        let mut viewport = RecordingViewport::default();
        let mut renderer = LayerRenderer::new();

        let handle = renderer.render(&mut viewport, &geometry, &join(&[("Leeds", 10.0), ("York", 30.0)]), &scale, &config, &factor);

        let palette = scale.palette(&factor);
        assert_eq!(handle.fills(), &[palette.color(0), palette.color(palette.len() - 1), Color::NO_DATA]);
        assert_eq!(handle.legend().map(|l| l.bands.len()), Some(8));
        assert_eq!(handle.legend().map(|l| l.title.as_str()), Some("Air Quality"));
    }

    #[test]
    fn empty_join_renders_all_no_data_without_legend() {
        let config = ChoroplethConfig::default();
        let scale = ColorScale::from_config(&config).unwrap();
        let geometry = geometry(&["Leeds", "York"]);
        let mut viewport = RecordingViewport::default();
        let mut renderer = LayerRenderer::new();

        let handle = renderer.render(&mut viewport, &geometry, &JoinIndex::default(), &scale, &config, &"noise".into());

        assert!(handle.fills().iter().all(|&c| c == Color::NO_DATA));
        assert!(handle.legend().is_none());
        assert!(!viewport.calls.iter().any(|c| matches!(c, Call::ShowLegend(_))));
    }

    #[test]
    fn previous_layer_is_detached_before_next_attach() {
        let config = ChoroplethConfig::default();
        let scale = ColorScale::from_config(&config).unwrap();
        let geometry = geometry(&["Leeds", "York"]);
        let mut viewport = RecordingViewport::default();
        let mut renderer = LayerRenderer::new();

        let first = renderer.render(&mut viewport, &geometry, &join(&[("Leeds", 1.0)]), &scale, &config, &"noise".into()).id();
        viewport.clear();
        let second = renderer.render(&mut viewport, &geometry, &join(&[("York", 2.0)]), &scale, &config, &"noise".into()).id();

        assert_ne!(first, second);
        assert_eq!(viewport.calls, vec![
            Call::ClosePopup,
            Call::RemoveLegend,
            Call::Detach(first),
            Call::Attach(second, 2),
            Call::ShowLegend("Noise".to_string()),
        ]);
        assert_eq!(viewport.attached, vec![second]);
        assert_eq!(viewport.max_attached, 1);
        assert!(renderer.is_active(second) && !renderer.is_active(first));
    }

    #[test]
    fn style_is_fill_plus_interaction_emphasis() {
        let config = ChoroplethConfig::default();
        let scale = ColorScale::from_config(&config).unwrap();
        let geometry = geometry(&["Leeds", "York"]);
        let mut viewport = RecordingViewport::default();
        let mut renderer = LayerRenderer::new();
        let handle = renderer.render(&mut viewport, &geometry, &join(&[("Leeds", 1.0), ("York", 2.0)]), &scale, &config, &"noise".into()).clone();

        let state = InteractionState {
            hovered_key: Some("York".to_string()),
            selected_key: Some("Leeds".to_string()),
            ..Default::default()
        };
        let styles = handle.styles(&state, &geometry);
        assert_eq!(styles[0], FeatureStyle::selected(handle.fills()[0]));
        assert_eq!(styles[1], FeatureStyle::hovered(handle.fills()[1]));

        assert_eq!(renderer.teardown(&mut viewport).map(|h| h.id()), Some(handle.id()));
        assert!(renderer.active().is_none());
        assert!(renderer.teardown(&mut viewport).is_none());
    }
}
