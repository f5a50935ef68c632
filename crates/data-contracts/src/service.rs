use crate::base::ServiceType;
use crate::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Announcement a service publishes about itself.
///
/// `version` is whatever release string the service reports. It is an
/// ordinary field: it is encoded as given and kept on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct ServiceDetails {
    pub id: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub hierarchy: Vec<String>,
}

impl ServiceDetails {
    pub fn new(id: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            id: id.into(),
            service_type,
            display_name: None,
            version: None,
            metadata: HashMap::new(),
            hierarchy: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: Vec<String>) -> Self {
        self.hierarchy = hierarchy;
        self
    }
}
