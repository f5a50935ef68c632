//! Contract payload inspector
//!
//! Decodes contract payload files the way a consuming service would and
//! reports their canonical form and recomputed fingerprint. Used to check
//! fixtures against the schema and to detect whether a change to a
//! versioned composite actually moves its version.

use chrono::{DateTime, Utc};
use data_contracts::canonical::canonical_string;
use data_contracts::{ContractError, ContractKind, ContractValidator, Inspection};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Failed to read payload {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not versioned and has no fingerprint")]
    NotVersioned(ContractKind),

    #[error("Failed to render canonical JSON: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl InspectError {
    /// Schema violations, when that is what went wrong.
    pub fn violations(&self) -> Option<&[data_contracts::SchemaViolation]> {
        match self {
            InspectError::Contract(ContractError::SchemaViolation { violations, .. }) => {
                Some(violations)
            }
            _ => None,
        }
    }
}

enum Schema {
    Embedded(&'static ContractValidator),
    Loaded(ContractValidator),
}

/// Result of comparing two payloads of a versioned contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub kind: ContractKind,
    pub current_version: String,
    pub proposed_version: String,
}

impl Comparison {
    pub fn is_changed(&self) -> bool {
        self.current_version != self.proposed_version
    }
}

pub struct Inspector {
    schema: Schema,
    ingested_at: DateTime<Utc>,
}

impl Inspector {
    /// Inspector over the embedded schema, or the document at `schema_path`.
    pub fn new(schema_path: Option<&Path>, ingested_at: DateTime<Utc>) -> Result<Self, InspectError> {
        let schema = match schema_path {
            Some(path) => {
                debug!(path = %path.display(), "loading contract schema override");
                Schema::Loaded(ContractValidator::from_path(path)?)
            }
            None => Schema::Embedded(ContractValidator::shared()?),
        };
        Ok(Self { schema, ingested_at })
    }

    fn validator(&self) -> &ContractValidator {
        match &self.schema {
            Schema::Embedded(validator) => *validator,
            Schema::Loaded(validator) => validator,
        }
    }

    pub fn fingerprint(&self, kind: ContractKind, json: &str) -> Result<String, InspectError> {
        self.inspect(kind, json)?
            .version
            .ok_or(InspectError::NotVersioned(kind))
    }

    /// Canonical JSON text, keys sorted and version freshly computed.
    pub fn canonical(&self, kind: ContractKind, json: &str) -> Result<String, InspectError> {
        let inspection = self.inspect(kind, json)?;
        Ok(canonical_string(&Value::Object(inspection.canonical))?)
    }

    /// Schema check first, then a full decode.
    pub fn validate(&self, kind: ContractKind, json: &str) -> Result<Inspection, InspectError> {
        self.validator().validate_str(kind, json)?;
        self.inspect(kind, json)
    }

    pub fn compare(
        &self,
        kind: ContractKind,
        current: &str,
        proposed: &str,
    ) -> Result<Comparison, InspectError> {
        if !kind.is_versioned() {
            return Err(InspectError::NotVersioned(kind));
        }
        Ok(Comparison {
            kind,
            current_version: self.fingerprint(kind, current)?,
            proposed_version: self.fingerprint(kind, proposed)?,
        })
    }

    fn inspect(&self, kind: ContractKind, json: &str) -> Result<Inspection, InspectError> {
        Ok(kind.inspect(json, self.ingested_at)?)
    }
}

pub fn read_payload(path: &Path) -> Result<String, InspectError> {
    fs::read_to_string(path).map_err(|source| InspectError::Read {
        path: path.to_path_buf(),
        source,
    })
}
