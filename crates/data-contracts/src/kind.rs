use crate::computations::{Computation, ComputationContext, ComputationContexts, Computations};
use crate::error::ContractError;
use crate::results::ValidationResults;
use crate::service::ServiceDetails;
use crate::tags::{DataTag, DataTagContext, DataTagContexts, DataTags, SignalData};
use crate::{Payload, Versioned};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Every contract that can be decoded on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    DataTag,
    DataTags,
    SignalData,
    DataTagContext,
    DataTagContexts,
    ServiceDetails,
    Computation,
    Computations,
    ComputationContext,
    ComputationContexts,
    ValidationResults,
}

/// A decoded payload reduced to what tooling needs to show.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub kind: ContractKind,
    pub canonical: Map<String, Value>,
    /// Recomputed fingerprint; `None` for non-versioned contracts.
    pub version: Option<String>,
}

impl ContractKind {
    pub const ALL: [ContractKind; 11] = [
        ContractKind::DataTag,
        ContractKind::DataTags,
        ContractKind::SignalData,
        ContractKind::DataTagContext,
        ContractKind::DataTagContexts,
        ContractKind::ServiceDetails,
        ContractKind::Computation,
        ContractKind::Computations,
        ContractKind::ComputationContext,
        ContractKind::ComputationContexts,
        ContractKind::ValidationResults,
    ];

    /// Contract name, also the schema definition name.
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::DataTag => DataTag::CONTRACT,
            ContractKind::DataTags => DataTags::CONTRACT,
            ContractKind::SignalData => SignalData::CONTRACT,
            ContractKind::DataTagContext => DataTagContext::CONTRACT,
            ContractKind::DataTagContexts => DataTagContexts::CONTRACT,
            ContractKind::ServiceDetails => ServiceDetails::CONTRACT,
            ContractKind::Computation => Computation::CONTRACT,
            ContractKind::Computations => Computations::CONTRACT,
            ContractKind::ComputationContext => ComputationContext::CONTRACT,
            ContractKind::ComputationContexts => ComputationContexts::CONTRACT,
            ContractKind::ValidationResults => ValidationResults::CONTRACT,
        }
    }

    /// Kebab-case spelling used on the command line.
    pub fn cli_name(&self) -> String {
        let mut out = String::new();
        for (i, ch) in self.name().chars().enumerate() {
            if ch.is_ascii_uppercase() {
                if i > 0 {
                    out.push('-');
                }
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    pub fn is_versioned(&self) -> bool {
        matches!(
            self,
            ContractKind::DataTags
                | ContractKind::DataTagContexts
                | ContractKind::Computations
                | ContractKind::ComputationContexts
        )
    }

    /// Decodes `json` as this kind and reports its canonical form.
    pub fn inspect(
        &self,
        json: &str,
        ingested_at: DateTime<Utc>,
    ) -> Result<Inspection, ContractError> {
        match self {
            ContractKind::DataTag => plain::<DataTag>(*self, json, ingested_at),
            ContractKind::DataTags => versioned::<DataTags>(*self, json, ingested_at),
            ContractKind::SignalData => plain::<SignalData>(*self, json, ingested_at),
            ContractKind::DataTagContext => plain::<DataTagContext>(*self, json, ingested_at),
            ContractKind::DataTagContexts => {
                versioned::<DataTagContexts>(*self, json, ingested_at)
            }
            ContractKind::ServiceDetails => plain::<ServiceDetails>(*self, json, ingested_at),
            ContractKind::Computation => plain::<Computation>(*self, json, ingested_at),
            ContractKind::Computations => versioned::<Computations>(*self, json, ingested_at),
            ContractKind::ComputationContext => {
                plain::<ComputationContext>(*self, json, ingested_at)
            }
            ContractKind::ComputationContexts => {
                versioned::<ComputationContexts>(*self, json, ingested_at)
            }
            ContractKind::ValidationResults => {
                plain::<ValidationResults>(*self, json, ingested_at)
            }
        }
    }
}

fn plain<T: Payload>(
    kind: ContractKind,
    json: &str,
    ingested_at: DateTime<Utc>,
) -> Result<Inspection, ContractError> {
    let decoded = T::decode(json, ingested_at)?;
    Ok(Inspection {
        kind,
        canonical: decoded.to_canonical()?,
        version: None,
    })
}

fn versioned<T: Versioned>(
    kind: ContractKind,
    json: &str,
    ingested_at: DateTime<Utc>,
) -> Result<Inspection, ContractError> {
    let decoded = T::decode(json, ingested_at)?;
    Ok(Inspection {
        kind,
        canonical: decoded.to_canonical()?,
        version: Some(decoded.version()?),
    })
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractKind {
    type Err = ContractError;

    /// Accepts the contract name (`DataTags`) or its kebab-case form (`data-tags`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s || kind.cli_name() == s)
            .ok_or_else(|| ContractError::UnknownVariant {
                kind: "ContractKind",
                value: s.to_string(),
            })
    }
}
