use geo::{BoundingRect, MultiPolygon, Rect};
use serde_json::{Map, Value};

/// An immutable region geometry with its GeoJSON properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    properties: Map<String, Value>,
    shape: MultiPolygon<f64>,
}

impl Feature {
    pub fn new(properties: Map<String, Value>, shape: MultiPolygon<f64>) -> Self {
        Self { properties, shape }
    }

    #[inline] pub fn properties(&self) -> &Map<String, Value> { &self.properties }

    #[inline] pub fn shape(&self) -> &MultiPolygon<f64> { &self.shape }

    /// Resolve a property as a join key. Strings are used as-is and numbers in
    /// their JSON spelling; null, empty and non-scalar values have no key.
    pub fn property_key(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Bounding rectangle of the shape, if it has any coordinates.
    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.shape.bounding_rect() }
}
