use thiserror::Error;

/// A single JSON Schema violation found while validating a raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub json_pointer: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.json_pointer.is_empty() {
            write!(f, "{} at /", self.message)
        } else {
            write!(f, "{} at {}", self.message, self.json_pointer)
        }
    }
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Malformed {contract} payload: {reason}")]
    MalformedPayload {
        contract: &'static str,
        reason: String,
    },

    #[error("Unsupported value in {contract}: {reason}")]
    UnsupportedValue {
        contract: &'static str,
        reason: String,
    },

    #[error("Unknown {kind} value: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("{contract} payload failed schema validation: {}", join_violations(.violations))]
    SchemaViolation {
        contract: &'static str,
        violations: Vec<SchemaViolation>,
    },

    #[error("Contract schema unusable: {message}")]
    Schema { message: String },
}

impl ContractError {
    pub fn malformed(contract: &'static str, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            contract,
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(contract: &'static str, reason: impl ToString) -> Self {
        Self::UnsupportedValue {
            contract,
            reason: reason.to_string(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedValue { .. })
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_violation_message_lists_every_pointer() {
        let err = ContractError::SchemaViolation {
            contract: "DataTags",
            violations: vec![
                SchemaViolation {
                    json_pointer: "/connector".to_string(),
                    message: "42 is not of type \"string\"".to_string(),
                },
                SchemaViolation {
                    json_pointer: String::new(),
                    message: "\"data_tags\" is a required property".to_string(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("DataTags payload failed schema validation"));
        assert!(message.contains("at /connector"));
        assert!(message.contains("required property\" at /"));
    }

    #[test]
    fn malformed_and_unsupported_are_distinguishable() {
        assert!(ContractError::malformed("DataTag", "eof").is_malformed());
        assert!(ContractError::unsupported("SignalData", "NaN").is_unsupported());
        assert!(!ContractError::malformed("DataTag", "eof").is_unsupported());
    }
}
