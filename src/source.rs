//! Declaration file format.
//!
//! A source unit is a JSON document holding named declarations:
//!
//! ```json
//! {
//!   "declarations": {
//!     "Address": {
//!       "kind": "interface",
//!       "properties": [
//!         { "name": "province", "type": "string" },
//!         { "name": "provinceName", "type": "number", "optional": true },
//!         { "name": "child", "type": { "array": "number" } }
//!       ]
//!     },
//!     "Code":  { "kind": "alias", "type": "'A'" },
//!     "Color": { "kind": "enum", "members": [{ "name": "Red" }, { "name": "Green" }] }
//!   }
//! }
//! ```
//!
//! These are the raw, unresolved shapes. `lower.rs` turns them into `ir::Ty`.
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceFile {
    #[serde(default)]
    pub declarations: IndexMap<String, Declaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Interface,
    Alias,
    Enum,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum Declaration {
    Interface {
        #[serde(default)]
        extends: Vec<String>,
        #[serde(default)]
        properties: Vec<PropertyExpr>,
    },
    #[serde(alias = "type")]
    Alias {
        #[serde(rename = "type")]
        ty: TypeExpr,
    },
    Enum {
        #[serde(default)]
        members: Vec<MemberExpr>,
    },
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match self {
            Declaration::Interface { .. } => DeclKind::Interface,
            Declaration::Alias { .. } => DeclKind::Alias,
            Declaration::Enum { .. } => DeclKind::Enum,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyExpr {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
}

/// A type reference as written in a declaration file.
///
/// Text forms: keywords (`string`, `number`, `boolean`, `null`, `undefined`,
/// `void`, `unknown`, `any`, `true`, `false`), textual literals (`'A'`, `42`)
/// or a declaration name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum TypeExpr {
    Text(String),
    Literal { literal: Value },
    Array { array: Box<TypeExpr> },
    Object { object: Vec<PropertyExpr> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberExpr {
    pub name: String,
    /// Either a JSON number or expression text (`"0x10"`, `"'red'"`, `"Red"`).
    #[serde(default)]
    pub initializer: Option<Value>,
}
