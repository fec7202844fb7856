use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{data::ValueRecord, geom::GeometrySource};

/// Closed value interval spanned by a join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self { Self { min, max } }

    /// True when every value in the join is the same.
    #[inline] pub fn is_degenerate(&self) -> bool { self.min == self.max }

    /// Position of `value` within the range, clamped to [0, 1].
    /// A degenerate range places every value at the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() { return 0.5 }
        let spread = self.max - self.min;
        let position = if spread.is_finite() {
            (value - self.min) / spread
        } else {
            // ends too far apart to subtract; halve first
            (value / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
        };
        position.clamp(0.0, 1.0)
    }

    /// `n + 1` evenly spaced break points from min to max inclusive.
    pub fn breaks(&self, n: usize) -> Vec<f64> {
        let spread = self.max - self.min;
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                if spread.is_finite() {
                    self.min + spread * t
                } else {
                    self.min * (1.0 - t) + self.max * t
                }
            })
            .collect()
    }
}

/// Region key -> value mapping for one year/factor selection.
///
/// Always rebuilt from a complete value table, never patched. Regions missing
/// from the table have no entry, which is distinct from a value of zero.
#[derive(Debug, Clone, Default)]
pub struct JoinIndex {
    values: AHashMap<String, f64>,
    range: Option<ValueRange>, // None when the join is empty
    overwritten: usize,
}

impl JoinIndex {
    /// Index records by region key. Repeated keys keep the last value seen;
    /// non-finite values are ignored.
    pub fn build<'a>(records: impl IntoIterator<Item = &'a ValueRecord>) -> Self {
        let mut values: AHashMap<String, f64> = AHashMap::new();
        let mut overwritten = 0;
        let mut skipped = 0;

        for record in records {
            if !record.value.is_finite() {
                skipped += 1;
                continue;
            }
            if values.insert(record.region_key.clone(), record.value).is_some() {
                overwritten += 1;
            }
        }

        if overwritten > 0 {
            tracing::debug!(overwritten, "value table repeats region keys; last value wins");
        }
        if skipped > 0 {
            tracing::warn!(skipped, "ignoring non-finite values in value table");
        }

        let range = values.values().fold(None, |range: Option<ValueRange>, &v| Some(match range {
            Some(r) => ValueRange::new(r.min.min(v), r.max.max(v)),
            None => ValueRange::new(v, v),
        }));

        Self { values, range, overwritten }
    }

    /// Value joined to `key`, or None when the region has no data.
    #[inline] pub fn get(&self, key: &str) -> Option<f64> { self.values.get(key).copied() }

    /// Range of present values; None signals an empty join.
    #[inline] pub fn range(&self) -> Option<ValueRange> { self.range }

    #[inline] pub fn len(&self) -> usize { self.values.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Number of records that replaced an earlier record with the same key.
    #[inline] pub fn overwritten(&self) -> usize { self.overwritten }

    /// Compare the keys of this join against a geometry source.
    pub fn coverage(&self, geometry: &GeometrySource) -> JoinCoverage {
        let geometry_keys: BTreeSet<&str> = geometry.region_keys().collect();
        let value_keys: BTreeSet<&str> = self.values.keys().map(String::as_str).collect();

        JoinCoverage {
            matched: geometry_keys.intersection(&value_keys).count(),
            only_in_values: value_keys.difference(&geometry_keys).map(|k| k.to_string()).collect(),
            only_in_geometry: geometry_keys.difference(&value_keys).map(|k| k.to_string()).collect(),
        }
    }
}

/// Key agreement between a value table and the geometry it is joined to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinCoverage {
    pub matched: usize,
    /// Sorted keys with a value but no feature.
    pub only_in_values: Vec<String>,
    /// Sorted keys with a feature but no value.
    pub only_in_geometry: Vec<String>,
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};
    use serde_json::json;

    use super::*;
    use crate::geom::Feature;

    fn records(pairs: &[(&str, f64)]) -> Vec<ValueRecord> {
        pairs.iter().map(|&(k, v)| ValueRecord::new(k, v)).collect()
    }

    #[test]
    fn tracks_range_over_present_values() {
        let join = JoinIndex::build(&records(&[("Leeds", 10.0), ("York", 30.0), ("Hull", -5.0)]));

        assert_eq!(join.len(), 3);
        assert_eq!(join.get("York"), Some(30.0));
        assert_eq!(join.get("Manchester"), None);
        assert_eq!(join.range(), Some(ValueRange::new(-5.0, 30.0)));
    }

    #[test]
    fn zero_is_data_not_missing() {
        let join = JoinIndex::build(&records(&[("Leeds", 0.0)]));
        assert_eq!(join.get("Leeds"), Some(0.0));
        assert_eq!(join.range(), Some(ValueRange::new(0.0, 0.0)));
    }

    #[test]
    fn repeated_keys_keep_last_value() {
        let join = JoinIndex::build(&records(&[("Leeds", 100.0), ("York", 30.0), ("Leeds", 10.0)]));

        assert_eq!(join.get("Leeds"), Some(10.0));
        assert_eq!(join.overwritten(), 1);
        // the overwritten 100.0 no longer contributes to the range
        assert_eq!(join.range(), Some(ValueRange::new(10.0, 30.0)));
    }

    #[test]
    fn empty_table_has_no_range() {
        let join = JoinIndex::build(&Vec::<ValueRecord>::new());
        assert!(join.is_empty());
        assert_eq!(join.range(), None);
        assert_eq!(join.get("Leeds"), None);
    }

    #[test]
    fn non_finite_values_are_absent() {
        let join = JoinIndex::build(&records(&[("Leeds", f64::NAN), ("York", f64::INFINITY), ("Hull", 2.0)]));
        assert_eq!(join.get("Leeds"), None);
        assert_eq!(join.get("York"), None);
        assert_eq!(join.range(), Some(ValueRange::new(2.0, 2.0)));
    }

    #[test]
    fn normalize_clamps_and_centers_degenerate_ranges() {
        let range = ValueRange::new(10.0, 30.0);
        assert_eq!(range.normalize(10.0), 0.0);
        assert_eq!(range.normalize(20.0), 0.5);
        assert_eq!(range.normalize(30.0), 1.0);
        assert_eq!(range.normalize(-100.0), 0.0);
        assert_eq!(range.normalize(100.0), 1.0);

        assert_eq!(ValueRange::new(7.0, 7.0).normalize(7.0), 0.5);
        assert_eq!(ValueRange::new(7.0, 7.0).normalize(1e9), 0.5);
    }

    #[test]
    fn extreme_ranges_stay_finite() {
        let range = ValueRange::new(-1e308, 1e308);
        assert_eq!(range.normalize(-1e308), 0.0);
        assert_eq!(range.normalize(0.0), 0.5);
        assert_eq!(range.normalize(1e308), 1.0);

        let breaks = range.breaks(8);
        assert!(breaks.iter().all(|b| b.is_finite()));
        assert_eq!((breaks[0], breaks[8]), (-1e308, 1e308));
        assert_eq!(breaks[4], 0.0);
        assert!(breaks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn breaks_are_evenly_spaced_and_inclusive() {
        assert_eq!(ValueRange::new(0.0, 8.0).breaks(4), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(ValueRange::new(3.0, 3.0).breaks(2), vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn coverage_reports_both_sides() {
        let square = MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)]]);
        let features = ["Leeds", "Manchester", "York", "Leeds"].iter()
            .map(|name| Feature::new(json!({ "local_authority": name }).as_object().cloned().unwrap(), square.clone()))
            .collect();
        let geometry = GeometrySource::new(features, "local_authority");
        let join = JoinIndex::build(&records(&[("Leeds", 1.0), ("York", 2.0), ("Aberdeen", 3.0)]));

        let coverage = join.coverage(&geometry);
        assert_eq!(coverage.matched, 2);
        assert_eq!(coverage.only_in_values, vec!["Aberdeen".to_string()]);
        assert_eq!(coverage.only_in_geometry, vec!["Manchester".to_string()]);
    }
}
