//! End-to-end: declaration files on disk → verifier → validators.

use serde_json::json;
use shape_verify::{Options, Verifier};

fn verifier() -> Verifier {
    let pattern = format!("{}/tests/fixtures/*.types.json", env!("CARGO_MANIFEST_DIR"));
    Verifier::new(Options::new(pattern)).expect("fixtures load")
}

#[test]
fn address_optional_field_may_be_absent() {
    let v = verifier().validator("address.types.json", "Address");
    assert!(v.call(&json!({ "province": "ce", "child": [1, 2] })));
    assert!(!v.call(&json!({ "province": "" })));
    assert!(!v.call(&json!({ "address": "" })));
}

#[test]
fn string_literal_alias() {
    let v = verifier().validator("shapes.types.json", "Code");
    assert!(v.call(&json!("A")));
    assert!(!v.call(&json!("B")));
    assert!(!v.call_optional(None));
    assert_eq!(v.body(), r#"return value === "A";"#);
}

#[test]
fn enum_membership_inside_objects() {
    let v = verifier().validator("shapes.types.json", "Palette");
    assert!(v.call(&json!({ "primary": 0, "strict": true })));
    assert!(v.call(&json!({ "primary": 1, "accents": [0, 1, 1], "strict": true })));
    assert!(!v.call(&json!({ "primary": 2, "strict": true })));
    assert!(!v.call(&json!({ "primary": 0, "accents": [2], "strict": true })));
    assert!(!v.call(&json!({ "primary": 0, "strict": false })));
    assert!(v.body().contains(r#"[0, 1].includes(value["primary"])"#));
}

#[test]
fn boolean_alias_rejects_strings() {
    let v = verifier().validator("shapes.types.json", "Flag");
    assert!(v.call(&json!(true)));
    assert!(!v.call(&json!("true")));
}

#[test]
fn unresolvable_declarations_accept_everything() {
    let verifier = verifier();
    for (file, name) in [("shapes.types.json", "Missing"), ("nowhere.types.json", "Address")] {
        let v = verifier.validator(file, name);
        assert!(v.call(&json!(null)));
        assert!(v.call(&json!({})));
        assert!(v.call_optional(None));
        assert_eq!(verifier.run(file, name), "return true");
    }
}

#[test]
fn recursive_interfaces_validate_the_first_level() {
    let v = verifier().validator("shapes.types.json", "Tree");
    assert!(v.call(&json!({ "label": "root", "children": [{ "label": "a", "children": [] }] })));
    assert!(!v.call(&json!({ "label": "root", "children": {} })));
}

#[test]
fn inherited_properties_come_from_other_units() {
    let v = verifier().validator("shapes.types.json", "Located");
    assert!(v.call(&json!({ "province": "ce", "child": [], "note": null })));
    assert!(!v.call(&json!({ "province": "ce", "child": [] })));
    assert!(!v.call(&json!({ "note": null })));
}

#[test]
fn emitted_text_is_stable() {
    let verifier = verifier();
    let first = verifier.run("address.types.json", "Address");
    let second = verifier.run("address.types.json", "Address");
    assert_eq!(first, second);
    assert_eq!(
        first,
        concat!(
            r#"return typeof value === "object" && value !== null && !Array.isArray(value)"#,
            r#" && value.hasOwnProperty("province") && typeof value["province"] === "string""#,
            r#" && (!value.hasOwnProperty("provinceName") || typeof value["provinceName"] === "number")"#,
            r#" && value.hasOwnProperty("child") && Array.isArray(value["child"])"#,
            r#" && value["child"].every((_, i) => typeof value["child"][i] === "number");"#,
        )
    );
}
