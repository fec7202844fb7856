use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

use super::Feature;

/// Read the features of a GeoJSON FeatureCollection.
/// Features whose geometry is missing, non-polygonal or malformed are kept with an
/// empty shape so that their properties still take part in joins and the catalog.
pub(crate) fn read_features(value: &Value) -> Result<Vec<Feature>> {
    ensure!(
        value["type"].as_str() == Some("FeatureCollection"),
        "[geojson] expected a FeatureCollection, got type {}", value["type"]
    );
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[geojson] FeatureCollection has no features array"))?;

    Ok(features.iter().enumerate()
        .map(|(idx, feature)| {
            let properties = feature["properties"].as_object().cloned().unwrap_or_else(Map::new);
            let shape = match read_geometry(&feature["geometry"]) {
                Ok(shape) => shape,
                Err(e) => {
                    tracing::warn!(feature = idx, "skipping geometry: {e:#}");
                    MultiPolygon(Vec::new())
                }
            };
            Feature::new(properties, shape)
        })
        .collect())
}

/// Convert a GeoJSON geometry object (Polygon or MultiPolygon) into a MultiPolygon.
fn read_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    if geometry.is_null() { bail!("feature has no geometry") }

    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates array"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon_coords(coords)?])),
        Some("MultiPolygon") => coords.iter()
            .map(|polygon| {
                let rings = polygon.as_array()
                    .ok_or_else(|| anyhow!("MultiPolygon member is not an array"))?;
                parse_polygon_coords(rings)
            })
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon),
        other => bail!("unsupported geometry type {:?}", other.unwrap_or("<missing>")),
    }
}

/// Parse Polygon coordinates: [exterior, hole, hole, ...]
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let ring = ring.as_array().ok_or_else(|| anyhow!("ring is not an array"))?;
        parse_ring_coords(ring)
    });

    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Polygon is missing its exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring (exterior or interior) from GeoJSON coordinates.
/// Format: [[x, y], [x, y], ...]
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let pair = pair.as_array().filter(|pair| pair.len() >= 2)
                .ok_or_else(|| anyhow!("position must be an array of at least two numbers"))?;
            let x = pair[0].as_f64().context("Invalid coordinate: x must be a number")?;
            let y = pair[1].as_f64().context("Invalid coordinate: y must be a number")?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::read_features;

    #[test]
    fn reads_polygons_and_multipolygons() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "local_authority": "Leeds" },
                    "geometry": { "type": "Polygon", "coordinates": [
                        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                        [[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]]
                    ] }
                },
                {
                    "type": "Feature",
                    "properties": { "local_authority": "York" },
                    "geometry": { "type": "MultiPolygon", "coordinates": [
                        [[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 0.0]]],
                        [[[4.0, 0.0], [5.0, 0.0], [5.0, 1.0], [4.0, 0.0]]]
                    ] }
                }
            ]
        });

        let features = read_features(&collection).unwrap();
        assert_eq!(features.len(), 2);

        let leeds = &features[0];
        assert_eq!(leeds.shape().0.len(), 1);
        assert_eq!(leeds.shape().0[0].interiors().len(), 1);
        // open exterior ring is closed on read
        let exterior = &leeds.shape().0[0].exterior().0;
        assert_eq!(exterior.first(), exterior.last());
        assert_eq!(exterior.len(), 5);

        assert_eq!(features[1].shape().0.len(), 2);
        assert_eq!(features[1].property_key("local_authority").as_deref(), Some("York"));
    }

    #[test]
    fn keeps_features_with_unusable_geometry() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "NoGeom" }, "geometry": null },
                { "type": "Feature", "properties": { "name": "Point" },
                  "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } },
                { "type": "Feature", "properties": null,
                  "geometry": { "type": "Polygon", "coordinates": [[[0.0, "x"]]] } }
            ]
        });

        let features = read_features(&collection).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.shape().0.is_empty()));
        assert_eq!(features[0].property_key("name").as_deref(), Some("NoGeom"));
        assert!(features[2].properties().is_empty());
    }

    #[test]
    fn rejects_non_collections() {
        assert!(read_features(&json!({ "type": "Feature" })).is_err());
        assert!(read_features(&json!({ "type": "FeatureCollection" })).is_err());
    }
}
