//! # Data Contracts
//!
//! Versioned, JSON-serializable records exchanged between the services of the
//! acquisition/computation pipeline: tags, signals, computation definitions
//! and the contexts they run in.
//!
//! Every contract implements [`Payload`]: a canonical map representation, a
//! JSON encoder, and a decoder that takes the ingestion timestamp of the
//! message. Composites also implement [`Versioned`]; their `version` is an
//! MD5 fingerprint over the children sorted by a designated key, recomputed
//! on every read and never trusted from the wire.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chrono::Utc;
//! use data_contracts::*;
//!
//! let tags = DataTags {
//!     data_tags: vec![
//!         DataTag::builder("t2", "Flow").data_type("float").build(),
//!         DataTag::builder("t1", "Temperature").writable(true).build(),
//!     ],
//!     connector: "opcua".to_string(),
//! };
//!
//! let encoded = tags.encode().expect("encodes");
//! let decoded = DataTags::decode(&encoded, Utc::now()).expect("decodes");
//!
//! assert_eq!(decoded, tags);
//! assert_eq!(decoded.version().unwrap(), tags.version().unwrap());
//! ```
//!
//! ## Defining a contract
//!
//! ```rust
//! use data_contracts::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
//! struct Alarm {
//!     id: String,
//!     severity: u8,
//! }
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
//! #[payload(versioned(children = "alarms", key = "id"))]
//! struct Alarms {
//!     alarms: Vec<Alarm>,
//! }
//!
//! let alarms = Alarms { alarms: vec![Alarm { id: "a1".into(), severity: 3 }] };
//! let canonical = alarms.to_canonical().unwrap();
//! assert_eq!(canonical["version"], serde_json::json!(alarms.version().unwrap()));
//! ```

extern crate self as data_contracts;

mod base;
mod builder;
pub mod canonical;
mod computations;
mod error;
mod kind;
mod payload;
mod results;
mod service;
mod tags;
mod validation;

pub use base::*;
pub use builder::*;
pub use computations::*;
pub use error::*;
pub use kind::*;
pub use payload::{finite, serialized_map, Payload, Versioned};
pub use results::*;
pub use service::*;
pub use tags::*;
pub use validation::*;

// Re-export the derive macro
pub use data_contracts_derive::Payload;

#[doc(hidden)]
pub mod __private {
    pub use chrono;
    pub use serde_json;
}
