use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{config::FactorId, interact::MapError};

/// The year/factor pair a value table is fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub year: i32,
    pub factor: FactorId,
}

impl Filter {
    pub fn new(year: i32, factor: impl Into<FactorId>) -> Self {
        Self { year, factor: factor.into() }
    }
}

/// Monotonic identifier of a value-table fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    #[inline] pub fn get(&self) -> u64 { self.0 }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self { Self(id) }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "request#{}", self.0) }
}

/// A fetch the host must perform, then report back with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub id: RequestId,
    pub year: i32,
    pub factor: FactorId,
}

/// Orders concurrent fetches so that only the newest completion is applied.
///
/// A response is applied only if its id is greater than every id applied so
/// far. Older or unknown ids are stale.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    applied: u64,
    pending: BTreeMap<u64, Filter>,
}

impl RequestSequencer {
    pub fn new() -> Self { Self::default() }

    /// Register a fetch for `filter` and return its id.
    pub fn issue(&mut self, filter: Filter) -> FetchRequest {
        self.issued += 1;
        let id = RequestId(self.issued);
        let request = FetchRequest { id, year: filter.year, factor: filter.factor.clone() };
        self.pending.insert(self.issued, filter);
        request
    }

    /// Resolve a completion, returning its filter if it may be applied.
    pub fn complete(&mut self, id: RequestId) -> Result<Filter, MapError> {
        if id.0 <= self.applied {
            self.pending.remove(&id.0);
            return Err(MapError::StaleResponse(id));
        }
        let filter = self.pending.remove(&id.0).ok_or(MapError::StaleResponse(id))?;

        self.applied = id.0;
        // anything older can no longer be applied
        self.pending.retain(|&pending, _| pending > id.0);
        Ok(filter)
    }

    /// Number of fetches issued but not yet resolved.
    #[inline] pub fn in_flight(&self) -> usize { self.pending.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_completions_apply() {
        let mut requests = RequestSequencer::new();
        let a = requests.issue(Filter::new(2025, "air_quality"));
        let b = requests.issue(Filter::new(2030, "noise"));
        assert_eq!((a.id.get(), b.id.get()), (1, 2));

        assert_eq!(requests.complete(a.id), Ok(Filter::new(2025, "air_quality")));
        assert_eq!(requests.complete(b.id), Ok(Filter::new(2030, "noise")));
        assert_eq!(requests.in_flight(), 0);
    }

    #[test]
    fn older_completion_after_newer_is_stale() {
        let mut requests = RequestSequencer::new();
        let a = requests.issue(Filter::new(2025, "air_quality"));
        let b = requests.issue(Filter::new(2025, "noise"));

        assert!(requests.complete(b.id).is_ok());
        assert_eq!(requests.complete(a.id), Err(MapError::StaleResponse(a.id)));
        assert_eq!(requests.in_flight(), 0);
    }

    #[test]
    fn unknown_and_repeated_ids_are_stale() {
        let mut requests = RequestSequencer::new();
        let a = requests.issue(Filter::new(2025, "noise"));

        assert!(requests.complete(RequestId(42)).is_err());
        assert!(requests.complete(a.id).is_ok());
        assert!(requests.complete(a.id).is_err());
    }
}
