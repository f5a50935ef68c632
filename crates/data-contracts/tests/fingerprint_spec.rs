use chrono::Utc;
use data_contracts::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../contracts/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

fn tag(id: &str, name: &str) -> DataTag {
    DataTag::builder(id, name)
        .data_type("float")
        .meta("unit", json!("bar"))
        .build()
}

fn tags(order: &[(&str, &str)]) -> DataTags {
    DataTags {
        data_tags: order.iter().map(|(id, name)| tag(id, name)).collect(),
        connector: "opcua".to_string(),
    }
}

#[test]
fn given_permuted_children_when_fingerprinting_then_versions_match() {
    let a = tags(&[("t1", "Temp"), ("t2", "Flow"), ("t3", "Level")]);
    let b = tags(&[("t3", "Level"), ("t1", "Temp"), ("t2", "Flow")]);
    let c = tags(&[("t2", "Flow"), ("t3", "Level"), ("t1", "Temp")]);

    let version = a.version().unwrap();
    assert_eq!(b.version().unwrap(), version);
    assert_eq!(c.version().unwrap(), version);
    assert_eq!(version.len(), 32);
    assert!(version.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

#[test]
fn given_duplicate_sort_keys_when_fingerprinting_then_order_still_does_not_matter() {
    let a = tags(&[("t1", "Temp"), ("t1", "Temperature")]);
    let b = tags(&[("t1", "Temperature"), ("t1", "Temp")]);
    assert_eq!(a.version().unwrap(), b.version().unwrap());
}

#[test]
fn given_one_changed_child_field_when_fingerprinting_then_version_changes() {
    let original = tags(&[("t1", "Temp"), ("t2", "Flow")]);
    let mut renamed = original.clone();
    renamed.data_tags[1].name = "Flow rate".to_string();
    assert_ne!(original.version().unwrap(), renamed.version().unwrap());

    let mut re_metad = original.clone();
    re_metad.data_tags[0].meta.insert("unit".to_string(), json!("psi"));
    assert_ne!(original.version().unwrap(), re_metad.version().unwrap());
}

#[test]
fn given_parent_only_field_change_when_fingerprinting_then_version_is_unchanged() {
    let a = tags(&[("t1", "Temp")]);
    let mut b = a.clone();
    b.connector = "modbus".to_string();
    assert_eq!(a.version().unwrap(), b.version().unwrap());
}

#[test]
fn given_nested_signal_change_when_fingerprinting_contexts_then_version_changes() {
    let contexts = DataTagContexts::decode(&fixture("data-tag-contexts.json"), Utc::now()).unwrap();
    let mut changed = contexts.clone();
    changed.data_tag_contexts[0].signal.unit = Some("kPa".to_string());
    assert_ne!(contexts.version().unwrap(), changed.version().unwrap());
}

#[test]
fn given_empty_collection_when_fingerprinting_then_digest_of_empty_list() {
    let empty = Computations {
        computations: vec![],
        service: "compute".to_string(),
    };
    assert_eq!(empty.version().unwrap(), "d751713988987e9331980363e24189ce");
}

#[test]
fn given_fixture_payloads_when_fingerprinting_then_golden_digests_are_stable() {
    let now = Utc::now();
    let cases = [
        ("data-tags.json", ContractKind::DataTags, "a35b295515a6e6e1d6880153e66a3b8f"),
        (
            "data-tag-contexts.json",
            ContractKind::DataTagContexts,
            "d3d36b2e9cde1d1b8bd16fe06dda8b28",
        ),
        ("computations.json", ContractKind::Computations, "a8eca24ec837394f836b99f3a493710a"),
        (
            "computation-contexts.json",
            ContractKind::ComputationContexts,
            "b901c7ea4c28a18323432f127773baf0",
        ),
        (
            "data-tag-contexts-integer-bounds.json",
            ContractKind::DataTagContexts,
            "7bbc9726c1d035dfdcfaacc6eb71e9c0",
        ),
    ];

    for (file, kind, expected) in cases {
        let inspection = kind.inspect(&fixture(file), now).unwrap();
        assert_eq!(inspection.version.as_deref(), Some(expected), "{file}");
    }
}

#[test]
fn given_stale_version_on_the_wire_when_decoding_then_it_is_recomputed() {
    let raw = fixture("data-tags.json");
    assert!(raw.contains("00000000000000000000000000000000"));

    let decoded = DataTags::decode(&raw, Utc::now()).unwrap();
    let version = decoded.version().unwrap();
    assert_ne!(version, "00000000000000000000000000000000");

    let reencoded: serde_json::Value = serde_json::from_str(&decoded.encode().unwrap()).unwrap();
    assert_eq!(reencoded["version"], json!(version));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Payload)]
#[payload(versioned(children = "groups", key = "connector"))]
struct TagGroups {
    groups: Vec<DataTags>,
}

#[test]
fn given_versioned_children_when_fingerprinting_parent_then_child_versions_are_hashed() {
    let group = TagGroups {
        groups: vec![tags(&[("t1", "Temp")])],
    };
    let canonical = group.to_canonical().unwrap();
    let child_version = group.groups[0].version().unwrap();
    assert_eq!(canonical["groups"][0]["version"], json!(child_version));

    let mut changed = group.clone();
    changed.groups[0].data_tags[0].is_writable = true;
    assert_ne!(group.version().unwrap(), changed.version().unwrap());

    let decoded = TagGroups::decode(&group.encode().unwrap(), Utc::now()).unwrap();
    assert_eq!(decoded, group);
}

fn signal_json(id: &str, min: Value, max: Value, unit: Value, element: Value) -> Value {
    json!({
        "id": id, "name": id.to_uppercase(), "source": "opcua",
        "data_type": "float", "index_type": "timestamp",
        "topic_name": format!("signals/{id}"), "system_element": element,
        "config": {}, "unit": unit, "precision": null,
        "min_value": min, "max_value": max
    })
}

fn tag_context_json(id: &str, tag_id: &str, signal: Value) -> Value {
    json!({
        "id": id, "tag_id": tag_id, "source": "opcua",
        "topic_name": signal["topic_name"].clone(),
        "is_logged": true, "is_published": false, "signal": signal
    })
}

// `id` order (a, b, c) is the reverse of `tag_id` order (z, m, a).
fn tag_context_children() -> Vec<Value> {
    vec![
        tag_context_json(
            "ctx-a",
            "tag-z",
            signal_json("level", json!(0), json!(100), json!("%"), json!("Plant - Tank1")),
        ),
        tag_context_json(
            "ctx-b",
            "tag-m",
            signal_json("flow", json!(0.5), json!(2.5), json!("m3/h"), Value::Null),
        ),
        tag_context_json(
            "ctx-c",
            "tag-a",
            signal_json("temp", Value::Null, Value::Null, Value::Null, Value::Null),
        ),
    ]
}

fn tag_contexts_from(children: Vec<Value>) -> DataTagContexts {
    let payload = json!({ "data_tag_contexts": children });
    DataTagContexts::decode(&payload.to_string(), Utc::now()).unwrap()
}

#[test]
fn given_permuted_tag_contexts_when_fingerprinting_then_sorted_by_tag_id() {
    let children = tag_context_children();
    let rotated = vec![children[1].clone(), children[2].clone(), children[0].clone()];
    let reversed: Vec<Value> = children.iter().rev().cloned().collect();

    let expected = "72c90fd0c1784bf6d64e42cce656000d";
    assert_eq!(tag_contexts_from(children).version().unwrap(), expected);
    assert_eq!(tag_contexts_from(rotated).version().unwrap(), expected);
    assert_eq!(tag_contexts_from(reversed).version().unwrap(), expected);
}

#[test]
fn given_changed_tag_context_signal_when_fingerprinting_then_version_changes() {
    let mut children = tag_context_children();
    children[1]["signal"]["unit"] = json!("l/s");
    assert_eq!(
        tag_contexts_from(children).version().unwrap(),
        "04988ff1ed5f364ac026b86d1328dec3"
    );
}

fn computation_context_json(computation_id: &str, func_name: &str, signal: Value, args: Value) -> Value {
    json!({
        "computation_id": computation_id, "func_hash": format!("h-{func_name}"),
        "source": "compute", "func_name": func_name,
        "topic_name": format!("signals/{func_name}"),
        "is_logged": false, "is_published": true, "on_interval_ms": 1000,
        "signal": signal, "arg_mappings": args
    })
}

// `func_name` order (alpha, beta, gamma) disagrees with `computation_id` order.
fn computation_context_children() -> Vec<Value> {
    let none = Value::Null;
    vec![
        computation_context_json(
            "cc-3",
            "alpha",
            signal_json("alpha", json!(0), json!(1), none.clone(), none.clone()),
            json!([{
                "arg": "x",
                "signal": signal_json("in1", none.clone(), none.clone(), none.clone(), none.clone()),
                "is_trigger": true
            }]),
        ),
        computation_context_json(
            "cc-1",
            "gamma",
            signal_json("gamma", json!(-10), json!(10), none.clone(), none.clone()),
            json!([{"arg": "y", "signal": null, "is_trigger": false}]),
        ),
        computation_context_json(
            "cc-2",
            "beta",
            signal_json("beta", json!(0.0), json!(1.0), none.clone(), none),
            json!([]),
        ),
    ]
}

fn computation_contexts_from(children: Vec<Value>) -> ComputationContexts {
    let payload = json!({ "computation_contexts": children });
    ComputationContexts::decode(&payload.to_string(), Utc::now()).unwrap()
}

#[test]
fn given_permuted_computation_contexts_when_fingerprinting_then_sorted_by_computation_id() {
    let children = computation_context_children();
    let rotated = vec![children[2].clone(), children[0].clone(), children[1].clone()];
    let reversed: Vec<Value> = children.iter().rev().cloned().collect();

    let expected = "f900ec62293d1d2dcfc67f5dd5cf6924";
    assert_eq!(computation_contexts_from(children).version().unwrap(), expected);
    assert_eq!(computation_contexts_from(rotated).version().unwrap(), expected);
    assert_eq!(computation_contexts_from(reversed).version().unwrap(), expected);
}

#[test]
fn given_changed_computation_context_when_fingerprinting_then_version_changes() {
    let mut children = computation_context_children();
    children[0]["on_interval_ms"] = json!(500);
    assert_eq!(
        computation_contexts_from(children).version().unwrap(),
        "a62ee912fadccd8474c5ebe2429acf3d"
    );
}

#[test]
fn given_whole_number_bounds_on_the_wire_when_decoding_then_producer_version_is_reproduced() {
    let raw = fixture("data-tag-contexts-integer-bounds.json");
    let contexts = DataTagContexts::decode(&raw, Utc::now()).unwrap();
    assert_eq!(contexts.version().unwrap(), "7bbc9726c1d035dfdcfaacc6eb71e9c0");

    let encoded: Value = serde_json::from_str(&contexts.encode().unwrap()).unwrap();
    let signal = &encoded["data_tag_contexts"][0]["signal"];
    assert!(signal["min_value"].is_u64(), "{signal}");
    assert!(signal["max_value"].is_u64(), "{signal}");
    assert_eq!(encoded["version"], json!("7bbc9726c1d035dfdcfaacc6eb71e9c0"));

    let mut floats = contexts.clone();
    let signal = &mut floats.data_tag_contexts[0].signal;
    signal.min_value = serde_json::Number::from_f64(0.0);
    signal.max_value = serde_json::Number::from_f64(100.0);
    assert_eq!(floats.version().unwrap(), "e0132a8fecf93352ee990c74f96139ce");
}
