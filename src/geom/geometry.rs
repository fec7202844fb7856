use ahash::AHashMap;
use anyhow::{Context, Result};
use geo::{Intersects, Point, Rect};
use rstar::{RTree, AABB};
use serde_json::Value;

use super::{bbox::{union_rect, FeatureBounds}, geojson::read_features, Feature};

/// The polygon features of every region, indexed by their matching key.
///
/// A GeometrySource is immutable once built; reloading geometry means building a
/// new one. Keys may repeat across features (multi-part regions published as
/// separate features), in which case a key resolves to all of them.
#[derive(Debug)]
pub struct GeometrySource {
    matching_property: String,
    features: Vec<Feature>,
    keys: Vec<Option<String>>,          // Resolved matching key per feature
    index: AHashMap<String, Vec<usize>>, // Key -> feature indices, in feature order
    rtree: RTree<FeatureBounds>,
}

impl GeometrySource {
    /// Index features by the given matching property.
    pub fn new(features: Vec<Feature>, matching_property: impl Into<String>) -> Self {
        let matching_property = matching_property.into();

        let keys: Vec<Option<String>> = features.iter()
            .map(|feature| feature.property_key(&matching_property))
            .collect();

        let mut index: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (i, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                index.entry(key.clone()).or_default().push(i);
            }
        }

        let rtree = RTree::bulk_load(
            features.iter().enumerate()
                .filter_map(|(i, feature)| feature.bounds().map(|bbox| FeatureBounds::new(i, bbox)))
                .collect()
        );

        let unkeyed = keys.iter().filter(|key| key.is_none()).count();
        if unkeyed > 0 {
            tracing::debug!(unkeyed, property = %matching_property, "features without a matching key");
        }

        Self { matching_property, features, keys, index, rtree }
    }

    /// Build from a parsed GeoJSON FeatureCollection.
    pub fn from_geojson(value: &Value, matching_property: impl Into<String>) -> Result<Self> {
        Ok(Self::new(read_features(value)?, matching_property))
    }

    /// Build from GeoJSON bytes.
    pub fn from_geojson_bytes(bytes: &[u8], matching_property: impl Into<String>) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("[GeometrySource] Failed to parse GeoJSON bytes")?;
        Self::from_geojson(&value, matching_property)
    }

    /// Get the number of features.
    #[inline] pub fn len(&self) -> usize { self.features.len() }

    /// Check if there are no features.
    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Name of the property used as the join key.
    #[inline] pub fn matching_property(&self) -> &str { &self.matching_property }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    #[inline] pub fn feature(&self, idx: usize) -> Option<&Feature> { self.features.get(idx) }

    /// Matching key of the feature at `idx`, if it has one.
    #[inline]
    pub fn key(&self, idx: usize) -> Option<&str> {
        self.keys.get(idx).and_then(|key| key.as_deref())
    }

    /// Matching keys in feature order (None for features without one).
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.keys.iter().map(|key| key.as_deref())
    }

    /// Distinct matching keys, in no particular order.
    #[inline]
    pub fn region_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Indices of all features carrying `key`.
    #[inline]
    pub fn indices_of(&self, key: &str) -> &[usize] {
        self.index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline] pub fn contains_key(&self, key: &str) -> bool { self.index.contains_key(key) }

    /// Bounding rectangle of every feature carrying `key`.
    pub fn bounds_of(&self, key: &str) -> Option<Rect<f64>> {
        self.indices_of(key).iter()
            .filter_map(|&i| self.features[i].bounds())
            .reduce(union_rect)
    }

    /// Compute the bounding rectangle of all features.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features.iter()
            .filter_map(Feature::bounds)
            .reduce(union_rect)
    }

    /// Index of the feature under a lon/lat point. When features overlap, the one
    /// drawn last (highest index) wins.
    pub fn feature_at(&self, point: Point<f64>) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(FeatureBounds::idx)
            .filter(|&i| self.features[i].shape().intersects(&point))
            .max()
    }
}
