use crate::error::ContractError;
use crate::payload::finite;
use crate::Payload;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Per-file outcome of a validation run, free-form.
pub type FileResult = Map<String, Value>;

/// Outcome of validating a batch of files.
///
/// `file_results` has no fixed inner schema and round-trips unchanged.
/// `timestamp` is seconds since the Unix epoch (UTC) with sub-second
/// precision. Not versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(from_wire = "ValidationResults::from_wire_map")]
pub struct ValidationResults {
    pub service_id: String,
    pub file_results: HashMap<String, FileResult>,
    #[serde(serialize_with = "finite::serialize")]
    pub timestamp: f64,
    #[serde(default)]
    pub general_error: Option<String>,
}

impl ValidationResults {
    /// Builds results stamped with the current time.
    pub fn new(service_id: impl Into<String>, file_results: HashMap<String, FileResult>) -> Self {
        Self::with_timestamp(service_id, file_results, epoch_seconds(Utc::now()))
    }

    pub fn with_timestamp(
        service_id: impl Into<String>,
        file_results: HashMap<String, FileResult>,
        timestamp: f64,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            file_results,
            timestamp,
            general_error: None,
        }
    }

    pub fn with_general_error(mut self, error: impl Into<String>) -> Self {
        self.general_error = Some(error.into());
        self
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let micros = (self.timestamp * 1_000_000.0).round() as i64;
        Utc.timestamp_opt(
            micros.div_euclid(1_000_000),
            (micros.rem_euclid(1_000_000) * 1_000) as u32,
        )
        .single()
    }

    /// Keeps the wire timestamp; falls back to the ingestion time when absent.
    fn from_wire_map(
        mut map: Map<String, Value>,
        ingested_at: DateTime<Utc>,
    ) -> Result<Self, ContractError> {
        if map.get("timestamp").map_or(true, Value::is_null) {
            let fallback = serde_json::Number::from_f64(epoch_seconds(ingested_at))
                .ok_or_else(|| ContractError::malformed(Self::CONTRACT, "ingestion time out of range"))?;
            map.insert("timestamp".to_string(), Value::Number(fallback));
        }
        serde_json::from_value(Value::Object(map))
            .map_err(|e| ContractError::malformed(Self::CONTRACT, e))
    }
}

/// Seconds since the Unix epoch, microsecond precision.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
