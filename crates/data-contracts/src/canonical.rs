//! Canonical JSON and content fingerprints.
//!
//! Canonical JSON sorts object keys recursively and uses the layout the other
//! producers in the pipeline hash: `", "` between items, `": "` after keys, and
//! every character outside printable ASCII escaped as lowercase `\uXXXX`.
//! Two producers holding equal content therefore hash identical bytes.

use crate::error::ContractError;
use crate::payload::Payload;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;

/// Serializes a `Value` with object keys emitted in sorted order at every depth.
struct Sorted<'a>(&'a Value);

impl Serialize for Sorted<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Sorted(value))?;
                }
                out.end()
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Sorted)),
            other => other.serialize(serializer),
        }
    }
}

/// JSON layout used for fingerprint input.
#[derive(Debug, Default, Clone, Copy)]
pub struct FingerprintFormatter;

impl Formatter for FingerprintFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            if start < idx {
                writer.write_all(fragment[start..idx].as_bytes())?;
            }
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                writer.write_all(format!("\\u{:04x}", unit).as_bytes())?;
            }
            start = idx + ch.len_utf8();
        }
        if start < fragment.len() {
            writer.write_all(fragment[start..].as_bytes())?;
        }
        Ok(())
    }
}

/// Canonical JSON bytes for `value`. The output is always ASCII.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, FingerprintFormatter);
    Sorted(value).serialize(&mut serializer)?;
    Ok(buf)
}

/// Canonical JSON as a string, for display and logging.
pub fn canonical_string(value: &Value) -> Result<String, serde_json::Error> {
    let bytes = canonical_json(value)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Lowercase hex MD5 over `bytes`.
///
/// A change-detection checksum; it makes no tamper-resistance claim.
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Fingerprint of a child collection.
///
/// Children are ordered by `sort_key`, ties broken by their canonical bytes,
/// then the ordered list of canonical representations is hashed.
pub fn fingerprint<T, F>(
    contract: &'static str,
    children: &[T],
    sort_key: F,
) -> Result<String, ContractError>
where
    T: Payload,
    F: Fn(&T) -> &str,
{
    let mut keyed = children
        .iter()
        .map(|child| {
            let canonical = Value::Object(child.to_canonical()?);
            let bytes = canonical_json(&canonical)
                .map_err(|e| ContractError::unsupported(contract, e))?;
            Ok((sort_key(child), bytes, canonical))
        })
        .collect::<Result<Vec<_>, ContractError>>()?;

    keyed.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let ordered = Value::Array(keyed.into_iter().map(|(_, _, value)| value).collect());
    let bytes = canonical_json(&ordered).map_err(|e| ContractError::unsupported(contract, e))?;
    Ok(digest_hex(&bytes))
}
