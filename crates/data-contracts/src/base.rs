//! Closed enumerations shared by the contracts.
//!
//! Every variant serializes as its display string, so a contract carrying one
//! of these values renders the same text whether it goes through `Display`,
//! `to_canonical` or the wire encoder.

use crate::error::ContractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value type carried by a tag or signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    Integer,
    Boolean,
    String,
    Json,
}

/// How samples of a signal are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Timestamp,
    Sequence,
}

/// Role a service plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Connector,
    Computation,
    Logger,
    Validator,
    Gateway,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::Float,
        DataType::Integer,
        DataType::Boolean,
        DataType::String,
        DataType::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Float => "float",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::String => "string",
            DataType::Json => "json",
        }
    }
}

impl IndexType {
    pub const ALL: [IndexType; 2] = [IndexType::Timestamp, IndexType::Sequence];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Timestamp => "timestamp",
            IndexType::Sequence => "sequence",
        }
    }
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::Connector,
        ServiceType::Computation,
        ServiceType::Logger,
        ServiceType::Validator,
        ServiceType::Gateway,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Connector => "connector",
            ServiceType::Computation => "computation",
            ServiceType::Logger => "logger",
            ServiceType::Validator => "validator",
            ServiceType::Gateway => "gateway",
        }
    }
}

macro_rules! display_from_str {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ContractError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == s)
                    .ok_or_else(|| ContractError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

display_from_str!(DataType, "DataType");
display_from_str!(IndexType, "IndexType");
display_from_str!(ServiceType, "ServiceType");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn serde_renders_the_display_string_for_every_variant() {
        for variant in DataType::ALL {
            assert_eq!(
                serde_json::to_value(variant).unwrap(),
                Value::String(variant.to_string())
            );
        }
        for variant in IndexType::ALL {
            assert_eq!(
                serde_json::to_value(variant).unwrap(),
                Value::String(variant.to_string())
            );
        }
        for variant in ServiceType::ALL {
            assert_eq!(
                serde_json::to_value(variant).unwrap(),
                Value::String(variant.to_string())
            );
        }
    }

    #[test]
    fn from_str_inverts_display() {
        for variant in DataType::ALL {
            assert_eq!(variant.to_string().parse::<DataType>().unwrap(), variant);
        }
        for variant in ServiceType::ALL {
            assert_eq!(variant.as_str().parse::<ServiceType>().unwrap(), variant);
        }
        assert_eq!("sequence".parse::<IndexType>().unwrap(), IndexType::Sequence);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "FLOAT".parse::<DataType>().unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnknownVariant { kind: "DataType", .. }
        ));
        assert!(serde_json::from_str::<IndexType>("\"hourly\"").is_err());
    }
}
