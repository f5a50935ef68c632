use crate::error::{ContractError, SchemaViolation};
use crate::kind::ContractKind;
use crate::Payload;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

const CONTRACT_SCHEMA: &str = include_str!("../../../contracts/schemas/data-contracts.v1.json");

static SHARED_VALIDATOR: OnceCell<ContractValidator> = OnceCell::new();

/// Validates raw payloads against the contract JSON Schema before decode.
pub struct ContractValidator {
    schemas: HashMap<ContractKind, JSONSchema>,
}

impl ContractValidator {
    /// Validator over the schema embedded in the crate.
    pub fn new() -> Result<Self, ContractError> {
        let document: Value = serde_json::from_str(CONTRACT_SCHEMA).map_err(|e| {
            ContractError::Schema {
                message: format!("failed to parse embedded schema: {e}"),
            }
        })?;
        Self::from_document(&document)
    }

    /// Process-wide validator over the embedded schema, compiled on first use.
    pub fn shared() -> Result<&'static Self, ContractError> {
        SHARED_VALIDATOR.get_or_try_init(Self::new)
    }

    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let raw = fs::read_to_string(path).map_err(|e| ContractError::Schema {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|e| ContractError::Schema {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;
        Self::from_document(&document)
    }

    /// Compiles one validator per contract from the document's `definitions`.
    pub fn from_document(document: &Value) -> Result<Self, ContractError> {
        let definitions = document
            .get("definitions")
            .filter(|d| d.is_object())
            .ok_or_else(|| ContractError::Schema {
                message: "schema document has no definitions object".to_string(),
            })?;

        let mut schemas = HashMap::new();
        for kind in ContractKind::ALL {
            if definitions.get(kind.name()).is_none() {
                return Err(ContractError::Schema {
                    message: format!("no definition for {}", kind.name()),
                });
            }

            let root = json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "definitions": definitions,
                "allOf": [{ "$ref": format!("#/definitions/{}", kind.name()) }],
            });

            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&root)
                .map_err(|e| ContractError::Schema {
                    message: format!("failed to compile {} schema: {e}", kind.name()),
                })?;
            schemas.insert(kind, compiled);
        }

        Ok(Self { schemas })
    }

    #[instrument(skip(self, payload))]
    pub fn validate_json(&self, kind: ContractKind, payload: &Value) -> Result<(), ContractError> {
        let schema = self.schemas.get(&kind).ok_or_else(|| ContractError::Schema {
            message: format!("no compiled schema for {kind}"),
        })?;

        if let Err(errors) = schema.validate(payload) {
            let violations: Vec<SchemaViolation> = errors
                .map(|error| SchemaViolation {
                    json_pointer: error.instance_path.to_string(),
                    message: error.to_string(),
                })
                .collect();
            debug!(violations = violations.len(), "payload rejected by schema");
            return Err(ContractError::SchemaViolation {
                contract: kind.name(),
                violations,
            });
        }

        Ok(())
    }

    pub fn validate_str(&self, kind: ContractKind, json: &str) -> Result<(), ContractError> {
        let payload: Value =
            serde_json::from_str(json).map_err(|e| ContractError::malformed(kind.name(), e))?;
        self.validate_json(kind, &payload)
    }

    /// Validates the canonical form of an in-memory contract.
    pub fn validate<T: Payload>(&self, contract: &T) -> Result<(), ContractError> {
        let kind: ContractKind = T::CONTRACT.parse()?;
        self.validate_json(kind, &Value::Object(contract.to_canonical()?))
    }
}
