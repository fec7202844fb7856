use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One region's value for a single year/factor selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    #[serde(rename = "local_authority", alias = "region_key")]
    pub region_key: String,
    pub value: f64,
}

impl ValueRecord {
    pub fn new(region_key: impl Into<String>, value: f64) -> Self {
        Self { region_key: region_key.into(), value }
    }
}

/// Wire format of a value-table fetch: `{ "success": bool, "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ValueRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValuesResponse {
    pub fn ok(data: Vec<ValueRecord>) -> Self {
        Self { success: true, data, error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: Vec::new(), error: Some(error.into()) }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("[ValuesResponse] Failed to parse value table response")
    }
}
