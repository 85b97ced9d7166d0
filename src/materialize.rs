//! Declaration name → callable validator.
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::compile::{AccessPath, Compiler, ValidatorExpression};
use crate::project::TypeModel;

/// Name of the single argument the materialized function takes.
pub const ARGUMENT: &str = "value";

/// A materialized predicate: function body text plus a directly callable check.
///
/// An unresolved declaration yields the permissive validator, which accepts every input.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    expression: Option<ValidatorExpression>,
}

impl Validator {
    pub fn permissive() -> Self {
        Self { expression: None }
    }

    pub fn is_permissive(&self) -> bool {
        self.expression.is_none()
    }

    pub fn expression(&self) -> Option<&ValidatorExpression> {
        self.expression.as_ref()
    }

    /// Body of a one-argument function equivalent to this validator.
    pub fn body(&self) -> String {
        match &self.expression {
            None => "return true".to_string(),
            Some(expr) => format!("return {expr};"),
        }
    }

    pub fn call(&self, value: &Value) -> bool {
        self.call_optional(Some(value))
    }

    /// `None` is the undefined argument.
    pub fn call_optional(&self, value: Option<&Value>) -> bool {
        self.expression.as_ref().is_none_or(|expr| expr.test(value))
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body())
    }
}

pub struct Materializer<'m, M: TypeModel + ?Sized> {
    model: &'m M,
}

impl<'m, M: TypeModel + ?Sized> Materializer<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    /// Look up `name` (interface or type alias) in `file` and compile it against `value`.
    pub fn materialize(&self, file: &Path, name: &str) -> Validator {
        let Some(root) = self.model.resolve_declaration(file, name) else {
            tracing::debug!(file = %file.display(), name, "declaration not found; validator accepts everything");
            return Validator::permissive();
        };
        let expression = Compiler::new(self.model).compile(&root, AccessPath::root(ARGUMENT));
        Validator { expression: Some(expression) }
    }
}
