//! Type-to-predicate compiler.
//!
//! Walks a [`Ty`] and builds a [`Predicate`] tree that is evaluated directly
//! against JSON values. The same tree renders to boolean expression text
//! (JavaScript flavoured) given an [`AccessPath`], so callers can inspect or
//! snapshot what a validator checks.
//!
//! Category precedence (first match wins):
//!
//! 1. undefined / void
//! 2. null
//! 3. literal (before its primitive)
//! 4. string, number, boolean primitives
//! 5. enum membership
//! 6. array (guard + every element)
//! 7. object (guard + every declared property)
//! 8. named declaration (inlined; re-entry on the current path is deferred)
//! 9. unknown: always true
use std::fmt::{self, Write as _};

use serde_json::Value;

use crate::ir::{DeclKey, Literal, Primitive, Ty};
use crate::project::TypeModel;

// ------------------------------ Access paths ------------------------------ //

/// How to reach a sub-value from the root value under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPath {
    text: String,
    depth: usize, // enclosing array quantifiers
}

impl AccessPath {
    pub fn root(name: impl Into<String>) -> Self {
        Self { text: name.into(), depth: 0 }
    }

    /// `p["name"]`
    pub fn property(&self, name: &str) -> Self {
        Self {
            text: format!("{}[{}]", self.text, quote(name)),
            depth: self.depth,
        }
    }

    /// `p[i]`, with a fresh index variable per nesting level. Returns the variable too.
    pub fn element(&self) -> (Self, String) {
        let index = match self.depth {
            0 => "i".to_string(),
            n => format!("i{n}"),
        };
        let path = Self {
            text: format!("{}[{index}]", self.text),
            depth: self.depth + 1,
        };
        (path, index)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for AccessPath {
    fn default() -> Self {
        Self::root("value")
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn quote(name: &str) -> String {
    Value::from(name).to_string()
}

// ------------------------------- Predicates ------------------------------- //

/// Compiled conformance check, relative to whatever value it is applied to.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Always,
    Undefined,
    Null,
    Equals(Literal),
    TypeOf(Primitive),
    OneOf(Vec<Literal>),
    Every(Box<Predicate>),
    Object(Vec<PropertyCheck>),
    /// A declaration re-entered on its own recursion path; accepted as is.
    Deferred(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCheck {
    pub name: String,
    pub optional: bool,
    pub check: Predicate,
}

impl Predicate {
    /// `None` stands for "no value here" (a missing property, or undefined).
    pub fn test(&self, value: Option<&Value>) -> bool {
        match self {
            Predicate::Always | Predicate::Deferred(_) => true,
            Predicate::Undefined => value.is_none(),
            Predicate::Null => matches!(value, Some(Value::Null)),
            Predicate::Equals(lit) => value.is_some_and(|v| lit.matches(v)),
            Predicate::TypeOf(primitive) => matches!(
                (primitive, value),
                (Primitive::String, Some(Value::String(_)))
                    | (Primitive::Number, Some(Value::Number(_)))
                    | (Primitive::Boolean, Some(Value::Bool(_)))
            ),
            Predicate::OneOf(values) => value.is_some_and(|v| values.iter().any(|lit| lit.matches(v))),
            Predicate::Every(element) => match value {
                Some(Value::Array(xs)) => xs.iter().all(|x| element.test(Some(x))),
                _ => false,
            },
            Predicate::Object(props) => match value {
                Some(Value::Object(map)) => props.iter().all(|prop| match map.get(&prop.name) {
                    Some(v) => prop.check.test(Some(v)),
                    None => prop.optional,
                }),
                _ => false,
            },
        }
    }

    /// Render as a boolean expression over `path`.
    pub fn render(&self, path: &AccessPath) -> String {
        let mut out = String::new();
        self.render_into(path, &mut out);
        out
    }

    fn render_into(&self, path: &AccessPath, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match self {
            Predicate::Always | Predicate::Deferred(_) => write!(out, "true"),
            Predicate::Undefined => write!(out, "{path} === undefined"),
            Predicate::Null => write!(out, "{path} === null"),
            Predicate::Equals(lit) => write!(out, "{path} === {lit}"),
            Predicate::TypeOf(primitive) => write!(out, "typeof {path} === \"{}\"", primitive.tag()),
            Predicate::OneOf(values) => {
                out.push('[');
                for (i, lit) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{lit}");
                }
                write!(out, "].includes({path})")
            }
            Predicate::Every(element) => {
                let (item, index) = path.element();
                let _ = write!(out, "Array.isArray({path}) && {path}.every((_, {index}) => ");
                element.render_into(&item, out);
                write!(out, ")")
            }
            Predicate::Object(props) => {
                let _ = write!(
                    out,
                    "typeof {path} === \"object\" && {path} !== null && !Array.isArray({path})"
                );
                for prop in props {
                    let has = format!("{path}.hasOwnProperty({})", quote(&prop.name));
                    let field = path.property(&prop.name);
                    if prop.optional {
                        let _ = write!(out, " && (!{has} || ");
                        prop.check.render_into(&field, out);
                        out.push(')');
                    } else {
                        let _ = write!(out, " && {has} && ");
                        prop.check.render_into(&field, out);
                    }
                }
                Ok(())
            }
        };
    }
}

// ------------------------------- Expression ------------------------------- //

/// A compiled predicate bound to the access path it was compiled for.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorExpression {
    pub path: AccessPath,
    pub predicate: Predicate,
}

impl ValidatorExpression {
    pub fn test(&self, value: Option<&Value>) -> bool {
        self.predicate.test(value)
    }
}

impl fmt::Display for ValidatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate.render(&self.path))
    }
}

// -------------------------------- Compiler -------------------------------- //

pub struct Compiler<'m, M: TypeModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: TypeModel + ?Sized> Compiler<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    /// Compile `ty` for the value reached through `path`. Total: never fails.
    pub fn compile(&self, ty: &Ty, path: AccessPath) -> ValidatorExpression {
        let mut visiting = Vec::new();
        ValidatorExpression {
            path,
            predicate: self.predicate(ty, &mut visiting),
        }
    }

    fn predicate(&self, ty: &Ty, visiting: &mut Vec<DeclKey>) -> Predicate {
        match ty {
            Ty::Undefined | Ty::Void => Predicate::Undefined,
            Ty::Null => Predicate::Null,
            Ty::Literal(lit) => Predicate::Equals(lit.clone()),
            Ty::Primitive(primitive) => Predicate::TypeOf(*primitive),
            Ty::Enum(key) => match self.model.enum_members(key) {
                Some(members) => Predicate::OneOf(members.iter().map(|m| m.value.clone()).collect()),
                None => {
                    tracing::debug!(name = %key, "enum not found; accepting any value");
                    Predicate::Always
                }
            },
            Ty::Array(element) => Predicate::Every(Box::new(self.predicate(element, visiting))),
            Ty::Object(props) => Predicate::Object(
                props
                    .iter()
                    .map(|prop| PropertyCheck {
                        name: prop.name.clone(),
                        optional: prop.optional,
                        check: self.predicate(&prop.ty, visiting),
                    })
                    .collect(),
            ),
            Ty::Named(key) => {
                if visiting.contains(key) {
                    tracing::debug!(name = %key, "recursive reference; deferring");
                    return Predicate::Deferred(key.name.clone());
                }
                let Some(target) = self.model.named(key) else {
                    tracing::debug!(name = %key, "declaration not found; accepting any value");
                    return Predicate::Always;
                };
                visiting.push(key.clone());
                let predicate = self.predicate(target, visiting);
                visiting.pop();
                predicate
            }
            Ty::Unknown => Predicate::Always,
        }
    }
}

/// Shorthand for `Compiler::new(model).compile(ty, path)`.
pub fn compile<M: TypeModel + ?Sized>(model: &M, ty: &Ty, path: AccessPath) -> ValidatorExpression {
    Compiler::new(model).compile(ty, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EnumMember, Property};
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::Path;

    /// A hand-built type model.
    #[derive(Default)]
    struct Model {
        named: HashMap<DeclKey, Ty>,
        enums: HashMap<DeclKey, Vec<EnumMember>>,
    }

    impl TypeModel for Model {
        fn resolve_declaration(&self, _file: &Path, name: &str) -> Option<Ty> {
            let key = DeclKey::new(0, name);
            self.named.contains_key(&key).then_some(Ty::Named(key))
        }
        fn named(&self, key: &DeclKey) -> Option<&Ty> {
            self.named.get(key)
        }
        fn enum_members(&self, key: &DeclKey) -> Option<&[EnumMember]> {
            self.enums.get(key).map(Vec::as_slice)
        }
    }

    fn string() -> Ty { Ty::Primitive(Primitive::String) }
    fn number() -> Ty { Ty::Primitive(Primitive::Number) }
    fn boolean() -> Ty { Ty::Primitive(Primitive::Boolean) }

    fn check(model: &Model, ty: &Ty) -> ValidatorExpression {
        compile(model, ty, AccessPath::default())
    }

    fn address() -> Ty {
        Ty::Object(vec![
            Property::required("province", string()),
            Property::optional("provinceName", number()),
            Property::required("child", Ty::Array(Box::new(number()))),
        ])
    }

    #[test]
    fn object_with_optional_and_required_properties() {
        let expr = check(&Model::default(), &address());
        assert!(expr.test(Some(&json!({ "province": "ce", "child": [1, 2] }))));
        assert!(expr.test(Some(&json!({ "province": "ce", "provinceName": 1, "child": [] }))));
        assert!(!expr.test(Some(&json!({ "province": "" }))));
        assert!(!expr.test(Some(&json!({ "province": "ce", "provinceName": "x", "child": [] }))));
        assert!(!expr.test(Some(&json!({ "province": "ce", "child": [1, "2"] }))));
        assert!(!expr.test(Some(&json!(null))));
        assert!(!expr.test(Some(&json!([]))));
        assert!(!expr.test(None));
    }

    #[test]
    fn object_rendering_threads_access_paths() {
        let expr = check(&Model::default(), &address());
        assert_eq!(
            expr.to_string(),
            concat!(
                r#"typeof value === "object" && value !== null && !Array.isArray(value)"#,
                r#" && value.hasOwnProperty("province") && typeof value["province"] === "string""#,
                r#" && (!value.hasOwnProperty("provinceName") || typeof value["provinceName"] === "number")"#,
                r#" && value.hasOwnProperty("child") && Array.isArray(value["child"])"#,
                r#" && value["child"].every((_, i) => typeof value["child"][i] === "number")"#,
            )
        );
    }

    #[test]
    fn empty_object_is_just_the_guard() {
        let expr = check(&Model::default(), &Ty::Object(vec![]));
        assert_eq!(
            expr.to_string(),
            r#"typeof value === "object" && value !== null && !Array.isArray(value)"#
        );
        assert!(expr.test(Some(&json!({}))));
        assert!(expr.test(Some(&json!({ "extra": 1 }))));
        assert!(!expr.test(Some(&json!("{}"))));
    }

    #[test]
    fn arrays_quantify_every_element() {
        let nested = Ty::Array(Box::new(Ty::Array(Box::new(boolean()))));
        let expr = check(&Model::default(), &nested);
        assert!(expr.test(Some(&json!([]))));
        assert!(expr.test(Some(&json!([[], [true, false]]))));
        assert!(!expr.test(Some(&json!([[true], [1]]))));
        assert!(!expr.test(Some(&json!({ "0": [] }))));
        assert_eq!(
            expr.to_string(),
            "Array.isArray(value) && value.every((_, i) => Array.isArray(value[i]) \
             && value[i].every((_, i1) => typeof value[i][i1] === \"boolean\"))"
        );
    }

    #[test]
    fn literals_accept_exactly_one_value() {
        let expr = check(&Model::default(), &Ty::Literal(Literal::String("A".into())));
        assert!(expr.test(Some(&json!("A"))));
        assert!(!expr.test(Some(&json!("B"))));
        assert!(!expr.test(None));
        assert_eq!(expr.to_string(), r#"value === "A""#);

        let one = check(&Model::default(), &Ty::Literal(Literal::number(1.0)));
        assert!(one.test(Some(&json!(1))));
        assert!(!one.test(Some(&json!(2))));
        assert!(!one.test(Some(&json!("1"))));

        let yes = check(&Model::default(), &Ty::Literal(Literal::Bool(true)));
        assert!(yes.test(Some(&json!(true))));
        assert!(!yes.test(Some(&json!(false))));
        assert_eq!(yes.to_string(), "value === true");
    }

    #[test]
    fn primitives_check_the_runtime_tag() {
        let model = Model::default();
        let b = check(&model, &boolean());
        assert!(b.test(Some(&json!(true))));
        assert!(!b.test(Some(&json!("true"))));
        assert_eq!(b.to_string(), r#"typeof value === "boolean""#);

        let n = check(&model, &number());
        assert!(n.test(Some(&json!(1.5))));
        assert!(!n.test(Some(&json!(null))));

        let s = check(&model, &string());
        assert!(s.test(Some(&json!(""))));
        assert!(!s.test(None));
    }

    #[test]
    fn undefined_void_and_null() {
        let model = Model::default();
        for ty in [Ty::Undefined, Ty::Void] {
            let expr = check(&model, &ty);
            assert!(expr.test(None));
            assert!(!expr.test(Some(&json!(null))));
            assert_eq!(expr.to_string(), "value === undefined");
        }
        let null = check(&model, &Ty::Null);
        assert!(null.test(Some(&json!(null))));
        assert!(!null.test(None));
    }

    #[test]
    fn optional_undefined_property_must_be_absent() {
        let ty = Ty::Object(vec![Property::optional("gone", Ty::Undefined)]);
        let expr = check(&Model::default(), &ty);
        assert!(expr.test(Some(&json!({}))));
        assert!(!expr.test(Some(&json!({ "gone": null }))));
    }

    #[test]
    fn enums_test_membership() {
        let key = DeclKey::new(0, "Color");
        let mut model = Model::default();
        model.enums.insert(key.clone(), vec![
            EnumMember { name: "Red".into(), value: Literal::number(0.0) },
            EnumMember { name: "Green".into(), value: Literal::number(1.0) },
        ]);
        let expr = check(&model, &Ty::Enum(key));
        assert!(expr.test(Some(&json!(0))));
        assert!(expr.test(Some(&json!(1))));
        assert!(!expr.test(Some(&json!(2))));
        assert!(!expr.test(Some(&json!("Red"))));
        assert_eq!(expr.to_string(), "[0, 1].includes(value)");
    }

    #[test]
    fn missing_enum_or_declaration_accepts_everything() {
        let model = Model::default();
        for ty in [Ty::Enum(DeclKey::new(0, "Gone")), Ty::Named(DeclKey::new(0, "Gone")), Ty::Unknown] {
            let expr = check(&model, &ty);
            assert_eq!(expr.predicate, Predicate::Always);
            assert!(expr.test(None));
            assert!(expr.test(Some(&json!(null))));
            assert_eq!(expr.to_string(), "true");
        }
    }

    #[test]
    fn recursive_declarations_terminate() {
        let tree = DeclKey::new(0, "Tree");
        let mut model = Model::default();
        model.named.insert(tree.clone(), Ty::Object(vec![
            Property::required("label", string()),
            Property::optional("children", Ty::Array(Box::new(Ty::Named(tree.clone())))),
        ]));

        let expr = check(&model, &Ty::Named(tree));
        let Predicate::Object(props) = &expr.predicate else { panic!("expected object") };
        let Predicate::Every(inner) = &props[1].check else { panic!("expected array") };
        assert_eq!(**inner, Predicate::Deferred("Tree".into()));

        assert!(expr.test(Some(&json!({ "label": "root", "children": [{ "label": "leaf" }] }))));
        assert!(!expr.test(Some(&json!({ "children": [] }))));
    }

    #[test]
    fn compiling_is_deterministic() {
        let model = Model::default();
        let a = check(&model, &address());
        let b = check(&model, &address());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn nested_paths_use_bracket_indexing() {
        let ty = Ty::Object(vec![Property::required(
            "a b",
            Ty::Object(vec![Property::required("q\"", Ty::Null)]),
        )]);
        let text = compile(&Model::default(), &ty, AccessPath::root("input")).to_string();
        assert!(text.contains(r#"input["a b"]["q\""] === null"#), "{text}");
    }

    #[test]
    fn access_path_elements_get_fresh_indices() {
        let root = AccessPath::root("v");
        let (first, i) = root.property("xs").element();
        let (second, j) = first.element();
        assert_eq!((i.as_str(), j.as_str()), ("i", "i1"));
        assert_eq!(second.as_str(), r#"v["xs"][i][i1]"#);
    }
}
