//! # shape-verify
//!
//! Compile structural type declarations (interfaces, type aliases, enums)
//! into runtime predicates over JSON values.
//!
//! ```no_run
//! use shape_verify::{Options, Verifier};
//!
//! let verifier = Verifier::new(Options::new("types/**/*.types.json"))?;
//! let validator = verifier.validator("types/address.types.json", "Address");
//! assert!(validator.call(&serde_json::json!({ "province": "ce", "child": [1, 2] })));
//! println!("{}", verifier.run("types/address.types.json", "Address")); // return ...;
//! # Ok::<(), shape_verify::Error>(())
//! ```
//!
//! Pipeline: declaration files (`source`) → type graph (`lower`, `project`)
//! → predicate tree (`compile`) → callable validator (`materialize`).
//! Anything that cannot be resolved validates permissively.

pub mod compile;
pub mod config;
pub mod error;
pub mod ir;
pub mod lower;
pub mod materialize;
pub mod path_de;
pub mod project;
pub mod source;
pub mod verifier;

pub use compile::{compile, AccessPath, Compiler, Predicate, ValidatorExpression};
pub use config::{Options, ProjectConfig};
pub use error::{Error, Result};
pub use ir::{DeclKey, EnumMember, Literal, Primitive, Property, Ty};
pub use materialize::{Materializer, Validator};
pub use project::{Project, TypeModel};
pub use verifier::Verifier;
