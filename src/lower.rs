use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ir::{DeclKey, EnumMember, Literal, Primitive, Property, Ty};
use crate::source::{DeclKind, MemberExpr, PropertyExpr, TypeExpr};

// ------------------------------ Literal text ------------------------------ //

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:0[xX][0-9a-fA-F]+|0[bB][01]+|0[oO][0-7]+|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)$")
        .expect("numeric literal regex")
});

static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")$"#).expect("string literal regex")
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex")
});

/// Recognize literal text: `true`/`false`, numbers (incl. hex/bin/oct) and quoted strings.
///
/// Boolean literals are decided by comparing the text against `"true"`.
/// Numbers that do not fit a finite `f64` are not literals.
pub fn literal_from_text(text: &str) -> Option<Literal> {
    let text = text.trim();
    if text == "true" || text == "false" {
        return Some(Literal::Bool(text == "true"));
    }
    if NUMERIC_LITERAL.is_match(text) {
        return parse_number(text).map(Literal::number);
    }
    let caps = STRING_LITERAL.captures(text)?;
    let body = caps.get(1).or_else(|| caps.get(2))?.as_str();
    Some(Literal::String(unescape(body)))
}

fn parse_number(text: &str) -> Option<f64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };
    let magnitude = match radix {
        Some(radix) => u128::from_str_radix(&digits[2..], radix).ok()? as f64,
        None => digits.parse::<f64>().ok()?,
    };
    magnitude
        .is_finite()
        .then_some(if negative { -magnitude } else { magnitude })
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// ------------------------------ Type lowering ----------------------------- //

/// Name lookup for the unit being lowered.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<(DeclKey, DeclKind)>;
}

pub fn lower_type(expr: &TypeExpr, scope: &dyn Scope) -> Ty {
    match expr {
        TypeExpr::Text(text) => lower_text(text.trim(), scope),
        TypeExpr::Literal { literal: Value::Null } => Ty::Null,
        TypeExpr::Literal { literal } => match Literal::from_json(literal) {
            Some(lit) => Ty::Literal(lit),
            None => {
                tracing::warn!(%literal, "non-scalar literal type; accepting any value");
                Ty::Unknown
            }
        },
        TypeExpr::Array { array } => Ty::Array(Box::new(lower_type(array, scope))),
        TypeExpr::Object { object } => Ty::Object(lower_properties(object, scope)),
    }
}

fn lower_text(text: &str, scope: &dyn Scope) -> Ty {
    if let Some(element) = text.strip_suffix("[]") {
        return Ty::Array(Box::new(lower_text(element.trim_end(), scope)));
    }
    match text {
        "string" => return Ty::Primitive(Primitive::String),
        "number" => return Ty::Primitive(Primitive::Number),
        "boolean" => return Ty::Primitive(Primitive::Boolean),
        "null" => return Ty::Null,
        "undefined" => return Ty::Undefined,
        "void" => return Ty::Void,
        "unknown" | "any" => return Ty::Unknown,
        _ => {}
    }
    if let Some(lit) = literal_from_text(text) {
        return Ty::Literal(lit);
    }
    if NUMERIC_LITERAL.is_match(text) {
        tracing::warn!(literal = text, "numeric literal out of range; accepting any value");
        return Ty::Unknown;
    }
    match scope.lookup(text) {
        Some((key, DeclKind::Enum)) => Ty::Enum(key),
        Some((key, DeclKind::Interface | DeclKind::Alias)) => Ty::Named(key),
        None => {
            tracing::warn!(name = text, "unresolved type name; accepting any value");
            Ty::Unknown
        }
    }
}

/// Lower a property list. A repeated name replaces the earlier entry in place.
pub fn lower_properties(props: &[PropertyExpr], scope: &dyn Scope) -> Vec<Property> {
    let mut out: IndexMap<String, Property> = IndexMap::with_capacity(props.len());
    for prop in props {
        out.insert(prop.name.clone(), Property {
            name: prop.name.clone(),
            ty: lower_type(&prop.ty, scope),
            optional: prop.optional,
        });
    }
    out.into_values().collect()
}

// ------------------------------ Enum members ------------------------------ //

/// Resolve member initializers to concrete values.
///
/// Absent initializers auto-increment from the previous numeric member (first is 0).
pub fn resolve_enum_members(enum_name: &str, members: &[MemberExpr]) -> Result<Vec<EnumMember>> {
    let mut out: Vec<EnumMember> = Vec::with_capacity(members.len());
    let mut next_auto = Some(0.0);

    for member in members {
        let unsupported = |initializer: String| Error::EnumInitializer {
            enum_name: enum_name.to_string(),
            member: member.name.clone(),
            initializer,
        };

        let value = match &member.initializer {
            None => Literal::number(next_auto.ok_or_else(|| unsupported("<auto>".into()))?),
            Some(Value::Number(n)) => {
                Literal::number(n.as_f64().ok_or_else(|| unsupported(n.to_string()))?)
            }
            Some(Value::String(text)) => resolve_initializer_text(enum_name, text, &out)
                .ok_or_else(|| unsupported(text.clone()))?,
            Some(other) => return Err(unsupported(other.to_string())),
        };

        next_auto = match &value {
            Literal::Number(n) => Some(n.0 + 1.0),
            _ => None,
        };
        out.push(EnumMember { name: member.name.clone(), value });
    }
    Ok(out)
}

fn resolve_initializer_text(enum_name: &str, text: &str, earlier: &[EnumMember]) -> Option<Literal> {
    let text = text.trim();
    match literal_from_text(text) {
        Some(Literal::Bool(_)) => return None,
        Some(lit) => return Some(lit),
        None => {}
    }
    let name = text
        .strip_prefix(enum_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(text);
    if !IDENTIFIER.is_match(name) {
        return None;
    }
    earlier.iter().find(|m| m.name == name).map(|m| m.value.clone())
}
