use std::collections::HashMap;

use anyhow::Result;
use serde_json::Value;

use crate::{config::FactorId, data::{ValueRecord, ValuesResponse}};

/// The data-fetch collaborator: supplies boundary geometry once per session and
/// a value table per year/factor selection.
pub trait DataSource {
    /// Fetch the boundary FeatureCollection.
    fn fetch_geometry(&self) -> Result<Value>;

    /// Fetch the value table for one selection. `Err` means the fetch itself
    /// failed (transport, parse); a server-side refusal is `success: false`.
    fn fetch_values(&self, year: i32, factor: &FactorId) -> Result<ValuesResponse>;
}

/// Simple in-memory source.
/// Tables are keyed by (year, factor); selections without a table answer `success: false`.
#[derive(Debug, Clone, Default)]
pub struct MemSource {
    geometry: Value,
    tables: HashMap<(i32, FactorId), Vec<ValueRecord>>,
}

impl MemSource {
    pub fn new(geometry: Value) -> Self {
        Self { geometry, tables: HashMap::new() }
    }

    /// Builder-style variant of [`MemSource::insert_table`].
    pub fn with_table(mut self, year: i32, factor: impl Into<FactorId>, records: Vec<ValueRecord>) -> Self {
        self.insert_table(year, factor, records);
        self
    }

    pub fn insert_table(&mut self, year: i32, factor: impl Into<FactorId>, records: Vec<ValueRecord>) {
        self.tables.insert((year, factor.into()), records);
    }
}

impl DataSource for MemSource {
    fn fetch_geometry(&self) -> Result<Value> { Ok(self.geometry.clone()) }

    fn fetch_values(&self, year: i32, factor: &FactorId) -> Result<ValuesResponse> {
        Ok(match self.tables.get(&(year, factor.clone())) {
            Some(records) => ValuesResponse::ok(records.clone()),
            None => ValuesResponse::failure(format!("no data for {factor} in {year}")),
        })
    }
}
