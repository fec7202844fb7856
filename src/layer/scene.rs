use std::{io::Write, path::Path};

use anyhow::{anyhow, Result};
use geo::{Coord, Rect};
use serde::Serialize;

use crate::{
    common::{escape_xml, multipolygon_to_path, SvgWriter},
    geom::GeometrySource,
    interact::Popup,
    layer::{LayerId, Viewport},
    style::{FeatureStyle, Legend},
};

const MARGIN: f64 = 10.0;
const LEGEND_ROW: f64 = 18.0;
const LEGEND_WIDTH: f64 = 150.0;

/// Lon/lat window the viewport was last fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBounds {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
    pub padding: f64,
}

impl ViewBounds {
    fn rect(&self) -> Rect<f64> {
        Rect::new(Coord { x: self.lon_min, y: self.lat_min }, Coord { x: self.lon_max, y: self.lat_max })
    }
}

/// Everything currently visible on a [`SceneViewport`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub layer: Option<LayerId>,
    /// Current style per feature of the attached layer.
    pub styles: Vec<FeatureStyle>,
    pub legend: Option<Legend>,
    pub popup: Option<Popup>,
    pub view: Option<ViewBounds>,
    /// Messages passed to `notify` and not yet taken by the host.
    pub notices: Vec<String>,
}

/// Viewport that keeps the drawn state as plain data, for hosts that render it
/// themselves (or export it as SVG).
#[derive(Debug, Default)]
pub struct SceneViewport {
    scene: Scene,
}

impl SceneViewport {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn scene(&self) -> &Scene { &self.scene }

    /// Take the pending notices.
    pub fn take_notices(&mut self) -> Vec<String> { std::mem::take(&mut self.scene.notices) }
}

impl Viewport for SceneViewport {
    fn attach_layer(&mut self, layer: LayerId, styles: &[FeatureStyle]) {
        debug_assert!(self.scene.layer.is_none(), "attaching {layer} over an existing layer");
        self.scene.layer = Some(layer);
        self.scene.styles = styles.to_vec();
    }

    fn detach_layer(&mut self, layer: LayerId) {
        if self.scene.layer == Some(layer) {
            self.scene.layer = None;
            self.scene.styles.clear();
        }
    }

    fn restyle(&mut self, layer: LayerId, feature: usize, style: FeatureStyle) {
        if self.scene.layer != Some(layer) { return }
        if let Some(slot) = self.scene.styles.get_mut(feature) {
            *slot = style;
        }
    }

    fn show_legend(&mut self, legend: &Legend) { self.scene.legend = Some(legend.clone()) }

    fn remove_legend(&mut self) { self.scene.legend = None }

    fn open_popup(&mut self, popup: &Popup) { self.scene.popup = Some(popup.clone()) }

    fn close_popup(&mut self) { self.scene.popup = None }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64) {
        self.scene.view = Some(ViewBounds {
            lon_min: bounds.min().x,
            lat_min: bounds.min().y,
            lon_max: bounds.max().x,
            lat_max: bounds.max().y,
            padding,
        });
    }

    fn notify(&mut self, message: &str) {
        tracing::info!(notice = message, "user notice");
        self.scene.notices.push(message.to_string());
    }
}

impl Scene {
    /// Render the scene as an SVG document `width` pixels wide.
    pub fn to_svg_string(&self, geometry: &GeometrySource, width: f64) -> Result<String> {
        let mut writer = SvgWriter::in_memory();
        self.write_svg_to(&mut writer, geometry, width)?;
        writer.into_string()
    }

    /// Render the scene as an SVG file.
    pub fn write_svg(&self, path: &Path, geometry: &GeometrySource, width: f64) -> Result<()> {
        let mut writer = SvgWriter::create(path)?;
        self.write_svg_to(&mut writer, geometry, width)?;
        writer.flush()?;
        Ok(())
    }

    fn write_svg_to<W: Write>(&self, writer: &mut SvgWriter<W>, geometry: &GeometrySource, width: f64) -> Result<()> {
        let view = match self.view {
            Some(view) => view.rect(),
            None => geometry.bounds()
                .ok_or_else(|| anyhow!("[to_svg] Could not determine bounds; nothing to draw."))?,
        };
        let margin = self.view.map_or(MARGIN, |view| view.padding.max(MARGIN));

        let view = non_degenerate(view);
        let scale = (width - 2.0 * margin).max(1.0) / view.width();
        let height = view.height() * scale + 2.0 * margin;

        // --- Map lon/lat -> SVG coords (preserve aspect, Y down) ---
        let project = move |coord: &Coord<f64>| -> (f64, f64) {
            let x = margin + (coord.x - view.min().x) * scale;
            let y = margin + (view.max().y - coord.y) * scale;
            (x, y)
        };

        writer.write_header(width, height, &view)?;
        writer.write_styles()?;

        // Heavier outlines go last so neighbouring fills do not cover them.
        let mut order: Vec<usize> = (0..self.styles.len().min(geometry.len())).collect();
        order.sort_by(|&a, &b| self.styles[a].stroke_width.total_cmp(&self.styles[b].stroke_width));

        writeln!(writer, "<g>")?;
        for idx in order {
            let Some(feature) = geometry.feature(idx) else { continue };
            let path = multipolygon_to_path(feature.shape(), &project);
            if path.is_empty() { continue }

            let style = &self.styles[idx];
            let dash = if style.dashed { ";stroke-dasharray:3" } else { "" };
            writeln!(writer,
                r#"<path class="region" data-key="{key}" fill-rule="evenodd" d="{path}" style="fill:{fill};fill-opacity:{opacity:.2};stroke:{stroke};stroke-width:{stroke_width:.1}{dash}"/>"#,
                key = escape_xml(geometry.key(idx).unwrap_or_default()),
                fill = style.fill_color,
                opacity = style.fill_opacity,
                stroke = style.stroke_color,
                stroke_width = style.stroke_width,
            )?;
        }
        writeln!(writer, "</g>")?;

        if let Some(legend) = &self.legend {
            draw_legend(writer, legend, width, height)?;
        }

        if let Some(popup) = &self.popup {
            let (x, y) = project(&Coord { x: popup.anchor[0], y: popup.anchor[1] });
            draw_popup(writer, popup, x, y)?;
        }

        writer.write_footer()?;
        Ok(())
    }
}

/// Widen zero-width or zero-height windows (a single point or line) so the
/// projection scale stays finite.
fn non_degenerate(view: Rect<f64>) -> Rect<f64> {
    const PAD: f64 = 1e-4;
    let dx = if view.width() > 0.0 { 0.0 } else { PAD };
    let dy = if view.height() > 0.0 { 0.0 } else { PAD };
    Rect::new(
        Coord { x: view.min().x - dx, y: view.min().y - dy },
        Coord { x: view.max().x + dx, y: view.max().y + dy },
    )
}

/// Legend box in the bottom-right corner, one swatch row per band.
fn draw_legend(writer: &mut impl Write, legend: &Legend, width: f64, height: f64) -> Result<()> {
    let box_height = LEGEND_ROW * (legend.bands.len() as f64 + 1.0) + 8.0;
    let x = width - LEGEND_WIDTH - MARGIN;
    let y = (height - box_height - MARGIN).max(0.0);

    writeln!(writer, r#"<g transform="translate({x:.1},{y:.1})">"#)?;
    writeln!(writer, r#"<rect class="legend" width="{LEGEND_WIDTH}" height="{box_height:.1}" rx="4"/>"#)?;
    writeln!(writer, r#"<text class="legend-title" x="8" y="16">{}</text>"#, escape_xml(&legend.title))?;
    for (i, band) in legend.bands.iter().enumerate() {
        let row = LEGEND_ROW * (i as f64 + 1.0) + 6.0;
        writeln!(writer, r#"<rect x="8" y="{row:.1}" width="14" height="14" style="fill:{}"/>"#, band.color)?;
        writeln!(writer, r#"<text class="legend-item" x="28" y="{:.1}">{}</text>"#, row + 11.0, escape_xml(&band.label()))?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

/// Popup card anchored at a projected point.
fn draw_popup(writer: &mut impl Write, popup: &Popup, x: f64, y: f64) -> Result<()> {
    let lines = popup.lines();
    let card_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as f64 * 7.0 + 16.0;
    let card_height = lines.len() as f64 * 16.0 + 10.0;

    writeln!(writer, r#"<g transform="translate({x:.1},{y:.1})">"#)?;
    writeln!(writer, r#"<rect class="popup" x="0" y="{:.1}" width="{card_width:.1}" height="{card_height:.1}" rx="4"/>"#, -card_height)?;
    for (i, line) in lines.iter().enumerate() {
        let baseline = -card_height + 18.0 + i as f64 * 16.0;
        writeln!(writer, r#"<text class="popup-text" x="8" y="{baseline:.1}">{}</text>"#, escape_xml(line))?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};
    use serde_json::json;

    use super::*;
    use crate::{common::Color, data::ValueRange, geom::Feature, style::Palette};

    fn geometry() -> GeometrySource {
        let square = |x: f64| MultiPolygon(vec![polygon![
            (x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0), (x: x, y: 0.0),
        ]]);
        let features = [("Leeds", 0.0), ("Brighton & Hove", 2.0)].iter()
            .map(|&(name, x)| Feature::new(json!({ "local_authority": name }).as_object().cloned().unwrap(), square(x)))
            .collect();
        GeometrySource::new(features, "local_authority")
    }

    fn layer_id(n: u64) -> LayerId { LayerId(n) }

    #[test]
    fn tracks_attach_restyle_and_detach() {
        let mut viewport = SceneViewport::new();
        let base = FeatureStyle::baseline(Color::NO_DATA);

        viewport.attach_layer(layer_id(1), &[base, base]);
        viewport.restyle(layer_id(1), 1, FeatureStyle::hovered(Color::NO_DATA));
        // stale layer ids and out-of-range features are ignored
        viewport.restyle(layer_id(7), 0, FeatureStyle::selected(Color::NO_DATA));
        viewport.restyle(layer_id(1), 9, FeatureStyle::selected(Color::NO_DATA));

        assert_eq!(viewport.scene().styles, vec![base, FeatureStyle::hovered(Color::NO_DATA)]);

        viewport.detach_layer(layer_id(1));
        assert_eq!(viewport.scene().layer, None);
        assert!(viewport.scene().styles.is_empty());
    }

    #[test]
    fn notices_are_taken_once() {
        let mut viewport = SceneViewport::new();
        viewport.notify("Error loading map data");
        assert_eq!(viewport.take_notices(), vec!["Error loading map data".to_string()]);
        assert!(viewport.take_notices().is_empty());
    }

    #[test]
    fn svg_contains_regions_legend_and_escaped_keys() {
        let geometry = geometry();
        let palette = Palette::new(vec![Color::from_u32(0xe8f5e9), Color::from_u32(0x1b5e20)]).unwrap();
        let mut viewport = SceneViewport::new();
        viewport.attach_layer(layer_id(1), &[
            FeatureStyle::baseline(palette.color(0)),
            FeatureStyle::selected(palette.color(1)),
        ]);
        viewport.show_legend(&Legend::new("Air Quality", "air_quality".into(), ValueRange::new(0.0, 1.0), &palette, 2));

        let svg = viewport.scene().to_svg_string(&geometry, 400.0).unwrap();

        assert_eq!(svg.matches(r#"class="region""#).count(), 2);
        assert!(svg.contains("fill:#e8f5e9"));
        assert!(svg.contains("stroke:#000000;stroke-width:4.0;stroke-dasharray:3"));
        assert!(svg.contains(r#"data-key="Brighton &amp; Hove""#));
        assert!(svg.contains("Air Quality"));
        assert!(svg.contains("0.50 \u{2013} 1.00"));
        // the selected (heavier) outline is drawn after the baseline one
        let leeds = svg.find(r#"data-key="Leeds""#).unwrap();
        let brighton = svg.find(r#"data-key="Brighton"#).unwrap();
        assert!(leeds < brighton);
    }

    #[test]
    fn fitted_view_sets_the_svg_window() {
        let geometry = geometry();
        let mut viewport = SceneViewport::new();
        viewport.attach_layer(layer_id(1), &[FeatureStyle::baseline(Color::NO_DATA); 2]);
        viewport.fit_bounds(geometry.bounds_of("Leeds").unwrap(), 20.0);

        let svg = viewport.scene().to_svg_string(&geometry, 200.0).unwrap();
        assert!(svg.contains(r#"data-lon-max="1""#));
    }

    #[test]
    fn writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let geometry = geometry();
        let mut viewport = SceneViewport::new();
        viewport.attach_layer(layer_id(3), &[FeatureStyle::baseline(Color::NO_DATA); 2]);

        viewport.scene().write_svg(&path, &geometry, 300.0).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#"class="region""#));
    }

    #[test]
    fn scene_serializes_for_hosts() {
        let mut viewport = SceneViewport::new();
        viewport.attach_layer(layer_id(2), &[FeatureStyle::baseline(Color::WHITE)]);
        let json = serde_json::to_value(viewport.scene()).unwrap();
        assert_eq!(json["layer"], 2);
        assert_eq!(json["styles"][0]["fillColor"], "#ffffff");
        assert!(json["legend"].is_null());
    }
}
