//! Computation definitions and their run-time contexts.

use crate::base::{DataType, IndexType};
use crate::tags::SignalData;
use crate::Payload;
use serde::{Deserialize, Serialize};

/// A function a computation service can run.
///
/// `return_data_type` and `return_index_type` serialize as their display
/// strings, so `to_canonical()["return_data_type"]` always equals
/// `return_data_type.to_string()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct Computation {
    pub id: String,
    pub func_name: String,
    pub func_hash: String,
    pub description: String,
    pub args: Vec<String>,
    pub return_data_type: DataType,
    pub return_index_type: IndexType,
    pub source: String,
}

/// The computations one service offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(versioned(children = "computations", key = "func_name"))]
pub struct Computations {
    pub computations: Vec<Computation>,
    pub service: String,
}

/// Binds one computation argument to an input signal.
///
/// Only ever travels inside a [`ComputationContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgMapping {
    pub arg: String,
    pub signal: Option<SignalData>,
    pub is_trigger: bool,
}

impl ArgMapping {
    pub fn new(arg: impl Into<String>, signal: Option<SignalData>, is_trigger: bool) -> Self {
        Self {
            arg: arg.into(),
            signal,
            is_trigger,
        }
    }

    /// A trigger argument fires the computation when its signal updates.
    pub fn trigger(arg: impl Into<String>, signal: SignalData) -> Self {
        Self::new(arg, Some(signal), true)
    }

    pub fn unbound(arg: impl Into<String>) -> Self {
        Self::new(arg, None, false)
    }
}

/// A deployed computation: which function runs, on which inputs, and where
/// its output goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
pub struct ComputationContext {
    pub computation_id: String,
    pub func_hash: String,
    pub source: String,
    pub func_name: String,
    pub topic_name: String,
    pub is_logged: bool,
    pub is_published: bool,
    pub on_interval_ms: u64,
    pub signal: SignalData,
    pub arg_mappings: Vec<ArgMapping>,
}

impl ComputationContext {
    pub fn triggers(&self) -> impl Iterator<Item = &ArgMapping> {
        self.arg_mappings.iter().filter(|mapping| mapping.is_trigger)
    }

    /// Signal bound to `arg`, if the argument exists and is bound.
    pub fn signal_for(&self, arg: &str) -> Option<&SignalData> {
        self.arg_mappings
            .iter()
            .find(|mapping| mapping.arg == arg)
            .and_then(|mapping| mapping.signal.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(versioned(children = "computation_contexts", key = "computation_id"))]
pub struct ComputationContexts {
    pub computation_contexts: Vec<ComputationContext>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Versioned;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn signal(id: &str) -> SignalData {
        SignalData {
            id: id.to_string(),
            name: id.to_uppercase(),
            source: "compute".to_string(),
            data_type: DataType::Integer,
            index_type: IndexType::Sequence,
            topic_name: format!("signals/{id}"),
            system_element: None,
            config: HashMap::new(),
            unit: None,
            precision: None,
            min_value: None,
            max_value: None,
        }
    }

    fn computation(func_name: &str) -> Computation {
        Computation {
            id: format!("comp-{func_name}"),
            func_name: func_name.to_string(),
            func_hash: "abc123".to_string(),
            description: "moving average".to_string(),
            args: vec!["x".to_string(), "window".to_string()],
            return_data_type: DataType::Float,
            return_index_type: IndexType::Timestamp,
            source: "compute".to_string(),
        }
    }

    #[test]
    fn return_types_render_as_display_strings() {
        let comp = computation("rolling_mean");
        let canonical = comp.to_canonical().unwrap();
        assert_eq!(
            canonical["return_data_type"],
            json!(comp.return_data_type.to_string())
        );
        assert_eq!(canonical["return_index_type"], json!("timestamp"));
    }

    #[test]
    fn computations_version_is_keyed_by_func_name() {
        let a = Computations {
            computations: vec![computation("b_func"), computation("a_func")],
            service: "compute-1".to_string(),
        };
        let b = Computations {
            computations: vec![computation("a_func"), computation("b_func")],
            service: "compute-1".to_string(),
        };
        assert_eq!(a.version().unwrap(), b.version().unwrap());
    }

    #[test]
    fn unbound_argument_is_emitted_as_null_signal() {
        let ctx = ComputationContext {
            computation_id: "cc-1".to_string(),
            func_hash: "abc123".to_string(),
            source: "compute".to_string(),
            func_name: "rolling_mean".to_string(),
            topic_name: "signals/out".to_string(),
            is_logged: true,
            is_published: true,
            on_interval_ms: 1000,
            signal: signal("out"),
            arg_mappings: vec![
                ArgMapping::trigger("x", signal("in")),
                ArgMapping::unbound("window"),
            ],
        };

        let canonical = ctx.to_canonical().unwrap();
        assert_eq!(canonical["arg_mappings"][1]["signal"], Value::Null);
        assert_eq!(canonical["arg_mappings"][0]["signal"]["id"], json!("in"));
        assert_eq!(ctx.triggers().count(), 1);
        assert_eq!(ctx.signal_for("x").map(|s| s.id.as_str()), Some("in"));
        assert!(ctx.signal_for("window").is_none());

        let decoded = ComputationContext::decode(&ctx.encode().unwrap(), Utc::now()).unwrap();
        assert_eq!(decoded, ctx);
    }

    #[test]
    fn arg_mapping_signal_must_be_an_object() {
        let payload = json!({
            "computation_id": "cc-1",
            "func_hash": "abc",
            "source": "compute",
            "func_name": "f",
            "topic_name": "t",
            "is_logged": false,
            "is_published": false,
            "on_interval_ms": 0,
            "signal": {
                "id": "s", "name": "S", "source": "compute",
                "data_type": "float", "index_type": "timestamp", "topic_name": "t"
            },
            "arg_mappings": [{"arg": "x", "signal": "not-a-signal", "is_trigger": true}]
        });

        let err = ComputationContext::decode(&payload.to_string(), Utc::now()).unwrap_err();
        assert!(err.is_malformed());
    }
}
