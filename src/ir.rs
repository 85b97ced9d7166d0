// Strongly-typed type model consumed by the predicate compiler. No serde_json::Value here.
//
// Nodes are built once by the project (see `project.rs`) and are read-only afterwards.

use std::fmt;

use ordered_float::OrderedFloat;

/// Identifies a declaration inside a loaded project: source unit index + declaration name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclKey {
    pub unit: usize,
    pub name: String,
}

impl DeclKey {
    pub fn new(unit: usize, name: impl Into<String>) -> Self {
        Self { unit, name: name.into() }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One node of the structural type graph.
///
/// Variant order mirrors the compiler's precedence list: a literal is checked
/// before the primitive it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Undefined,
    Void,
    Null,
    Literal(Literal),
    Primitive(Primitive),
    Enum(DeclKey),           // member list lives in the project
    Array(Box<Ty>),
    Object(Vec<Property>),   // declaration order, names unique
    Named(DeclKey),          // interface / alias, resolved lazily
    Unknown,                 // anything goes
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: Ty,
    pub optional: bool,
}

impl Property {
    pub fn required(name: impl Into<String>, ty: Ty) -> Self {
        Self { name: name.into(), ty, optional: false }
    }
    pub fn optional(name: impl Into<String>, ty: Ty) -> Self {
        Self { name: name.into(), ty, optional: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

impl Primitive {
    /// The runtime tag reported by `typeof`.
    pub fn tag(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }
}

/// A single-inhabitant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
}

impl Literal {
    pub fn number(n: f64) -> Self {
        Literal::Number(OrderedFloat(n))
    }

    /// Strict equality against a JSON value; numbers compare numerically (`1 === 1.0`).
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (Literal::Bool(a), Value::Bool(b)) => a == b,
            (Literal::String(a), Value::String(b)) => a == b,
            (Literal::Number(a), Value::Number(b)) => b.as_f64() == Some(a.0),
            _ => false,
        }
    }

    /// Lift a JSON scalar into a literal. Arrays, objects and null have no literal form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Number(n) => n.as_f64().map(Literal::number),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::String(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
            Literal::Number(n) => write!(f, "{}", json_num_pref_i64(n.0)),
        }
    }
}

/// Enum member values are resolved by the project at load time.
pub type EnumValue = Literal;

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
}

// Helper: prefer rendering integers when exact
fn json_num_pref_i64(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Value::from(n)
    }
}
