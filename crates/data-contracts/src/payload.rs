use crate::canonical;
use crate::error::ContractError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Capabilities shared by every contract exchanged between services.
///
/// `#[derive(Payload)]` implements this trait; composites add
/// `#[payload(versioned(children = "...", key = "..."))]` so the derived
/// `version` is injected on the way out and stripped on the way in.
pub trait Payload: Serialize + DeserializeOwned {
    /// Contract name used in errors and logs.
    const CONTRACT: &'static str;

    /// Keys that are recomputed locally and never trusted from the wire.
    const DERIVED_FIELDS: &'static [&'static str] = &[];

    /// Field name to JSON-safe value, nested contracts fully expanded.
    fn to_canonical(&self) -> Result<Map<String, Value>, ContractError> {
        serialized_map(Self::CONTRACT, self)
    }

    /// JSON string of the canonical representation.
    fn encode(&self) -> Result<String, ContractError> {
        let canonical = Value::Object(self.to_canonical()?);
        let encoded = serde_json::to_string(&canonical)
            .map_err(|e| ContractError::unsupported(Self::CONTRACT, e))?;
        debug!(contract = Self::CONTRACT, bytes = encoded.len(), "encoded payload");
        Ok(encoded)
    }

    /// Rebuilds an instance from a JSON string.
    ///
    /// `timestamp` is the ingestion time of the message; most contracts
    /// ignore it.
    fn decode(json: &str, timestamp: DateTime<Utc>) -> Result<Self, ContractError>
    where
        Self: Sized,
    {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ContractError::malformed(Self::CONTRACT, e))?;
        Self::decode_value(value, timestamp)
    }

    /// Same as [`Payload::decode`] for an already parsed value.
    fn decode_value(value: Value, timestamp: DateTime<Utc>) -> Result<Self, ContractError>
    where
        Self: Sized,
    {
        let Value::Object(mut map) = value else {
            return Err(ContractError::malformed(
                Self::CONTRACT,
                format!("expected a JSON object, found {}", json_kind(&value)),
            ));
        };

        let mut stripped = Map::new();
        for field in Self::DERIVED_FIELDS {
            if let Some(incoming) = map.remove(*field) {
                stripped.insert((*field).to_string(), incoming);
            }
        }

        let decoded = Self::from_wire(map, timestamp)?;
        decoded.check_stripped(&stripped);
        debug!(contract = Self::CONTRACT, "decoded payload");
        Ok(decoded)
    }

    /// Reconstruction hook run after derived fields are removed.
    fn from_wire(map: Map<String, Value>, _timestamp: DateTime<Utc>) -> Result<Self, ContractError>
    where
        Self: Sized,
    {
        serde_json::from_value(Value::Object(map))
            .map_err(|e| ContractError::malformed(Self::CONTRACT, e))
    }

    /// Called with the derived fields that were discarded during decode.
    fn check_stripped(&self, _stripped: &Map<String, Value>) {}
}

/// A composite whose `version` is a fingerprint over its children.
pub trait Versioned: Payload {
    /// Field holding the child collection.
    const CHILDREN_FIELD: &'static str;

    type Child: Payload;

    fn children(&self) -> &[Self::Child];

    /// Key the children are ordered by before hashing.
    fn sort_key(child: &Self::Child) -> &str;

    /// Content fingerprint over the sorted, canonicalized children.
    fn version(&self) -> Result<String, ContractError> {
        canonical::fingerprint(Self::CONTRACT, self.children(), Self::sort_key)
    }

    /// Canonical map with children expanded through their own
    /// `to_canonical` and a freshly computed `version`.
    fn canonical_with_version(&self) -> Result<Map<String, Value>, ContractError> {
        let mut map = serialized_map(Self::CONTRACT, self)?;
        let children = self
            .children()
            .iter()
            .map(|child| child.to_canonical().map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        map.insert(Self::CHILDREN_FIELD.to_string(), Value::Array(children));
        map.insert("version".to_string(), Value::String(self.version()?));
        Ok(map)
    }

    /// Logs when a discarded wire `version` disagrees with the recomputed one.
    fn warn_on_stale_version(&self, stripped: &Map<String, Value>) {
        let Some(incoming) = stripped.get("version") else {
            return;
        };
        match self.version() {
            Ok(actual) if incoming.as_str() == Some(actual.as_str()) => {}
            Ok(actual) => warn!(
                contract = Self::CONTRACT,
                incoming = %incoming,
                actual = %actual,
                "discarding stale version from payload"
            ),
            Err(e) => warn!(
                contract = Self::CONTRACT,
                error = %e,
                "could not recompute version after decode"
            ),
        }
    }
}

/// Serializes `value` and requires the result to be a JSON object.
pub fn serialized_map<T>(contract: &'static str, value: &T) -> Result<Map<String, Value>, ContractError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value).map_err(|e| ContractError::unsupported(contract, e))? {
        Value::Object(map) => Ok(map),
        other => Err(ContractError::unsupported(
            contract,
            format!("expected an object representation, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serde helpers rejecting values JSON cannot carry.
pub mod finite {
    use serde::ser::Error;
    use serde::Serializer;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            Err(S::Error::custom(format!("non-finite number {value}")))
        }
    }
}
