use serde::Serialize;

use crate::geom::GeometrySource;

/// Sorted, de-duplicated region names for area pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AreaCatalog(Vec<String>);

impl AreaCatalog {
    /// Collect every non-empty matching key of the geometry, sorted case-sensitively.
    pub fn build(geometry: &GeometrySource) -> Self {
        let mut names: Vec<String> = geometry.region_keys().map(str::to_string).collect();
        names.sort_unstable();
        Self(names)
    }

    #[inline] pub fn names(&self) -> &[String] { &self.0 }

    #[inline] pub fn len(&self) -> usize { self.0.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|probe| probe.as_str().cmp(name)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;
    use serde_json::{json, Value};

    use super::*;
    use crate::geom::Feature;

    fn geometry(names: &[Value]) -> GeometrySource {
        let features = names.iter()
            .map(|name| Feature::new(json!({ "local_authority": name }).as_object().cloned().unwrap(), MultiPolygon(vec![])))
            .collect();
        GeometrySource::new(features, "local_authority")
    }

    #[test]
    fn sorted_deduplicated_and_non_empty() {
        let catalog = AreaCatalog::build(&geometry(&[json!("Leeds"), json!("Aberdeen"), json!("Leeds"), json!(""), json!(null)]));
        assert_eq!(catalog.names(), &["Aberdeen".to_string(), "Leeds".to_string()]);
    }

    #[test]
    fn ordering_is_case_sensitive() {
        let catalog = AreaCatalog::build(&geometry(&[json!("bath"), json!("York"), json!("Bath")]));
        assert_eq!(catalog.names(), &["Bath".to_string(), "York".to_string(), "bath".to_string()]);
        assert!(catalog.contains("bath"));
        assert!(!catalog.contains("BATH"));
    }

    #[test]
    fn features_without_the_property_are_skipped() {
        let features = vec![
            Feature::new(json!({ "name": "Leeds" }).as_object().cloned().unwrap(), MultiPolygon(vec![])),
            Feature::new(json!({ "local_authority": "York" }).as_object().cloned().unwrap(), MultiPolygon(vec![])),
        ];
        let catalog = AreaCatalog::build(&GeometrySource::new(features, "local_authority"));
        assert_eq!(catalog.len(), 1);
        assert!(AreaCatalog::default().is_empty());
    }
}
