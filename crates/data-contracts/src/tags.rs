//! Tag and signal contracts.

use crate::base::{DataType, IndexType};
use crate::Payload;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Separator between levels of a `system_element` path.
pub const HIERARCHY_SEPARATOR: &str = " - ";

/// A readable/writable point exposed by a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct DataTag {
    pub id: String,
    pub name: String,
    pub is_writable: bool,
    pub is_readable: bool,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub hierarchy: Vec<String>,
    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

/// Every tag a connector currently exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(versioned(children = "data_tags", key = "id"))]
pub struct DataTags {
    pub data_tags: Vec<DataTag>,
    pub connector: String,
}

/// Description of a published signal.
///
/// The hierarchy is not stored; see [`SignalData::hierarchy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct SignalData {
    pub id: String,
    pub name: String,
    pub source: String,
    pub data_type: DataType,
    pub index_type: IndexType,
    pub topic_name: String,
    #[serde(default)]
    pub system_element: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, Value>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub precision: Option<i64>,
    /// Kept as the wire number so `0` stays `0` and `0.0` stays `0.0`.
    #[serde(default)]
    pub min_value: Option<Number>,
    #[serde(default)]
    pub max_value: Option<Number>,
}

impl SignalData {
    /// Levels of `system_element`, split on `" - "`. Empty when unset.
    pub fn hierarchy(&self) -> Vec<String> {
        match self.system_element.as_deref() {
            Some(element) if !element.is_empty() => element
                .split(HIERARCHY_SEPARATOR)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Binding of a tag to the signal it is logged/published as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct DataTagContext {
    pub id: String,
    pub tag_id: String,
    pub source: String,
    pub topic_name: String,
    pub is_logged: bool,
    pub is_published: bool,
    pub signal: SignalData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(versioned(children = "data_tag_contexts", key = "tag_id"))]
pub struct DataTagContexts {
    pub data_tag_contexts: Vec<DataTagContext>,
}
