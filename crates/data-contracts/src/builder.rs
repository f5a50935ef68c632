use crate::base::{DataType, IndexType};
use crate::computations::{ArgMapping, ComputationContext};
use crate::results::{epoch_seconds, FileResult, ValidationResults};
use crate::tags::{DataTag, SignalData};
use chrono::{DateTime, Utc};
use serde_json::{Number, Value};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Signal is required to build a computation context")]
    MissingSignal,

    #[error("min_value {min} is greater than max_value {max}")]
    InvertedBounds { min: Number, max: Number },

    #[error("Signal bound {0} is not a finite number")]
    NonFiniteBound(f64),
}

pub struct SignalDataBuilder {
    signal: SignalData,
    bounds: Option<(f64, f64)>,
}

impl SignalDataBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        topic_name: impl Into<String>,
    ) -> Self {
        Self {
            signal: SignalData {
                id: id.into(),
                name: name.into(),
                source: source.into(),
                data_type: DataType::Float,
                index_type: IndexType::Timestamp,
                topic_name: topic_name.into(),
                system_element: None,
                config: HashMap::new(),
                unit: None,
                precision: None,
                min_value: None,
                max_value: None,
            },
            bounds: None,
        }
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.signal.data_type = data_type;
        self
    }

    pub fn index_type(mut self, index_type: IndexType) -> Self {
        self.signal.index_type = index_type;
        self
    }

    pub fn system_element(mut self, system_element: impl Into<String>) -> Self {
        self.signal.system_element = Some(system_element.into());
        self
    }

    /// Joins `levels` with the hierarchy separator.
    pub fn hierarchy<I, S>(self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = levels
            .into_iter()
            .map(|level| level.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(crate::tags::HIERARCHY_SEPARATOR);
        self.system_element(joined)
    }

    pub fn config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.signal.config.insert(key.into(), value);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.signal.unit = Some(unit.into());
        self
    }

    pub fn precision(mut self, precision: i64) -> Self {
        self.signal.precision = Some(precision);
        self
    }

    /// Floating-point bounds, emitted as JSON floats (`0.0`).
    pub fn bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.bounds = Some((min_value, max_value));
        self
    }

    /// Whole-number bounds, emitted as JSON integers (`0`).
    pub fn integer_bounds(mut self, min_value: i64, max_value: i64) -> Self {
        self.signal.min_value = Some(min_value.into());
        self.signal.max_value = Some(max_value.into());
        self.bounds = None;
        self
    }

    pub fn build(mut self) -> Result<SignalData, BuildError> {
        if let Some((min, max)) = self.bounds {
            let finite = |v: f64| Number::from_f64(v).ok_or(BuildError::NonFiniteBound(v));
            self.signal.min_value = Some(finite(min)?);
            self.signal.max_value = Some(finite(max)?);
        }
        if let (Some(min), Some(max)) = (&self.signal.min_value, &self.signal.max_value) {
            if min.as_f64() > max.as_f64() {
                return Err(BuildError::InvertedBounds {
                    min: min.clone(),
                    max: max.clone(),
                });
            }
        }
        Ok(self.signal)
    }
}

pub struct DataTagBuilder {
    tag: DataTag,
}

impl DataTagBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: DataTag {
                id: id.into(),
                name: name.into(),
                is_writable: false,
                is_readable: true,
                data_type: None,
                hierarchy: Vec::new(),
                meta: HashMap::new(),
            },
        }
    }

    pub fn writable(mut self, is_writable: bool) -> Self {
        self.tag.is_writable = is_writable;
        self
    }

    pub fn readable(mut self, is_readable: bool) -> Self {
        self.tag.is_readable = is_readable;
        self
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.tag.data_type = Some(data_type.into());
        self
    }

    pub fn hierarchy(mut self, hierarchy: Vec<String>) -> Self {
        self.tag.hierarchy = hierarchy;
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.tag.meta.insert(key.into(), value);
        self
    }

    pub fn build(self) -> DataTag {
        self.tag
    }
}

pub struct ComputationContextBuilder {
    computation_id: String,
    func_name: String,
    func_hash: String,
    source: String,
    topic_name: String,
    is_logged: bool,
    is_published: bool,
    on_interval_ms: u64,
    signal: Option<SignalData>,
    arg_mappings: Vec<ArgMapping>,
}

impl ComputationContextBuilder {
    pub fn new(
        computation_id: impl Into<String>,
        func_name: impl Into<String>,
        func_hash: impl Into<String>,
    ) -> Self {
        Self {
            computation_id: computation_id.into(),
            func_name: func_name.into(),
            func_hash: func_hash.into(),
            source: String::new(),
            topic_name: String::new(),
            is_logged: false,
            is_published: false,
            on_interval_ms: 0,
            signal: None,
            arg_mappings: Vec::new(),
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn topic_name(mut self, topic_name: impl Into<String>) -> Self {
        self.topic_name = topic_name.into();
        self
    }

    pub fn logged(mut self, is_logged: bool) -> Self {
        self.is_logged = is_logged;
        self
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    pub fn on_interval_ms(mut self, on_interval_ms: u64) -> Self {
        self.on_interval_ms = on_interval_ms;
        self
    }

    /// Output signal of the computation.
    pub fn signal(mut self, signal: SignalData) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn add_arg_mapping(mut self, mapping: ArgMapping) -> Self {
        self.arg_mappings.push(mapping);
        self
    }

    pub fn add_trigger(self, arg: impl Into<String>, signal: SignalData) -> Self {
        self.add_arg_mapping(ArgMapping::trigger(arg, signal))
    }

    pub fn add_input(self, arg: impl Into<String>, signal: SignalData) -> Self {
        self.add_arg_mapping(ArgMapping::new(arg, Some(signal), false))
    }

    pub fn build(self) -> Result<ComputationContext, BuildError> {
        let signal = self.signal.ok_or(BuildError::MissingSignal)?;

        Ok(ComputationContext {
            computation_id: self.computation_id,
            func_hash: self.func_hash,
            source: self.source,
            func_name: self.func_name,
            topic_name: self.topic_name,
            is_logged: self.is_logged,
            is_published: self.is_published,
            on_interval_ms: self.on_interval_ms,
            signal,
            arg_mappings: self.arg_mappings,
        })
    }
}

pub struct ValidationResultsBuilder {
    service_id: String,
    file_results: HashMap<String, FileResult>,
    timestamp: Option<f64>,
    general_error: Option<String>,
}

impl ValidationResultsBuilder {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            file_results: HashMap::new(),
            timestamp: None,
            general_error: None,
        }
    }

    pub fn file_result(mut self, file: impl Into<String>, result: FileResult) -> Self {
        self.file_results.insert(file.into(), result);
        self
    }

    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn captured_at(self, at: DateTime<Utc>) -> Self {
        self.timestamp(epoch_seconds(at))
    }

    pub fn general_error(mut self, error: impl Into<String>) -> Self {
        self.general_error = Some(error.into());
        self
    }

    /// Stamps the current time unless a timestamp was supplied.
    pub fn build(self) -> ValidationResults {
        ValidationResults {
            service_id: self.service_id,
            file_results: self.file_results,
            timestamp: self
                .timestamp
                .unwrap_or_else(|| epoch_seconds(Utc::now())),
            general_error: self.general_error,
        }
    }
}

impl SignalData {
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        topic_name: impl Into<String>,
    ) -> SignalDataBuilder {
        SignalDataBuilder::new(id, name, source, topic_name)
    }
}

impl DataTag {
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> DataTagBuilder {
        DataTagBuilder::new(id, name)
    }
}

impl ComputationContext {
    pub fn builder(
        computation_id: impl Into<String>,
        func_name: impl Into<String>,
        func_hash: impl Into<String>,
    ) -> ComputationContextBuilder {
        ComputationContextBuilder::new(computation_id, func_name, func_hash)
    }
}

impl ValidationResults {
    pub fn builder(service_id: impl Into<String>) -> ValidationResultsBuilder {
        ValidationResultsBuilder::new(service_id)
    }
}
