//! File-backed data source: a GeoJSON boundary file plus a long-format CSV.

use std::{fs::File, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use polars::{io::SerReader, prelude::*};
use serde_json::Value;

use crate::{config::FactorId, data::{DataSource, ValueRecord, ValuesResponse}};

/// Column names of the long-format value CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueColumns {
    pub region: String,
    pub year: String,
    pub factor: String,
    pub value: String,
}

impl Default for ValueColumns {
    fn default() -> Self {
        Self {
            region: "local_authority".to_string(),
            year: "year".to_string(),
            factor: "co_benefit_type".to_string(),
            value: "value_total".to_string(),
        }
    }
}

/// Serves geometry from a GeoJSON file and value tables from a CSV with one row per
/// (region, year, factor, ...) observation. Rows of a selection are summed per region.
pub struct FileSource {
    geojson_path: PathBuf,
    columns: ValueColumns,
    data: DataFrame,
}

impl FileSource {
    /// Open with the default column names.
    pub fn open(geojson_path: &Path, values_path: &Path) -> Result<Self> {
        Self::open_with_columns(geojson_path, values_path, ValueColumns::default())
    }

    pub fn open_with_columns(geojson_path: &Path, values_path: &Path, columns: ValueColumns) -> Result<Self> {
        Ok(Self {
            geojson_path: geojson_path.to_path_buf(),
            columns,
            data: read_csv(values_path)?,
        })
    }

    /// Number of rows in the value CSV.
    pub fn num_rows(&self) -> usize { self.data.height() }
}

impl DataSource for FileSource {
    fn fetch_geometry(&self) -> Result<Value> {
        let bytes = std::fs::read(&self.geojson_path)
            .with_context(|| format!("[FileSource] Failed to read {}", self.geojson_path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("[FileSource] Failed to parse GeoJSON in {}", self.geojson_path.display()))
    }

    fn fetch_values(&self, year: i32, factor: &FactorId) -> Result<ValuesResponse> {
        let ValueColumns { region, year: year_col, factor: factor_col, value } = &self.columns;

        let table = self.data.clone().lazy()
            .filter(
                col(year_col.as_str()).cast(DataType::Int64).eq(lit(year as i64))
                    .and(col(factor_col.as_str()).cast(DataType::String).eq(lit(factor.as_str())))
            )
            .group_by([col(region.as_str()).cast(DataType::String)])
            .agg([col(value.as_str()).cast(DataType::Float64).sum().alias("value")])
            .collect()
            .with_context(|| format!("[FileSource] Failed to select {factor} for {year}"))?;

        let keys = table.column(region.as_str())?.str()?;
        let values = table.column("value")?.f64()?;

        let mut records: Vec<ValueRecord> = keys.into_iter()
            .zip(values.into_iter())
            .filter_map(|(key, value)| Some(ValueRecord::new(key?, value?)))
            .collect();
        records.sort_by(|a, b| a.region_key.cmp(&b.region_key));

        tracing::debug!(year, %factor, rows = records.len(), "selected value table");
        Ok(ValuesResponse::ok(records))
    }
}

/// Reads a CSV file from `path` into a Polars DataFrame.
fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[FileSource] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .finish()
        .with_context(|| format!("[FileSource] Failed to read CSV from {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path) -> (PathBuf, PathBuf) {
        let geojson = dir.join("boundaries.geojson");
        std::fs::write(&geojson, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

        let csv = dir.join("values.csv");
        std::fs::write(&csv, "\
local_authority,year,co_benefit_type,value_total
Leeds,2020,air_quality,4.0
Leeds,2020,air_quality,6.0
York,2020,air_quality,30.0
York,2020,noise,-2.5
York,2021,air_quality,1.0
").unwrap();

        (geojson, csv)
    }

    #[test]
    fn sums_rows_per_region_for_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (geojson, csv) = write_fixture(dir.path());
        let source = FileSource::open(&geojson, &csv).unwrap();
        assert_eq!(source.num_rows(), 5);

        let response = source.fetch_values(2020, &"air_quality".into()).unwrap();
        assert!(response.success);
        assert_eq!(response.data, vec![ValueRecord::new("Leeds", 10.0), ValueRecord::new("York", 30.0)]);

        let noise = source.fetch_values(2020, &"noise".into()).unwrap();
        assert_eq!(noise.data, vec![ValueRecord::new("York", -2.5)]);
    }

    #[test]
    fn empty_selection_is_successful_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (geojson, csv) = write_fixture(dir.path());
        let source = FileSource::open(&geojson, &csv).unwrap();

        let response = source.fetch_values(1999, &"air_quality".into()).unwrap();
        assert!(response.success);
        assert!(response.data.is_empty());
    }

    #[test]
    fn reads_geometry_file() {
        let dir = tempfile::tempdir().unwrap();
        let (geojson, csv) = write_fixture(dir.path());
        let source = FileSource::open(&geojson, &csv).unwrap();
        assert_eq!(source.fetch_geometry().unwrap()["type"], "FeatureCollection");
    }

    #[test]
    fn missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileSource::open(&dir.path().join("a.geojson"), &dir.path().join("b.csv")).is_err());
    }
}
