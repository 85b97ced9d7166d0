//! Load-time errors.
//!
//! Only building a project can fail. Compiling and materializing never do:
//! anything the project cannot resolve degrades to an always-true predicate.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// The project config file could not be read or parsed.
    #[error("config error for '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A source path pattern is not valid glob syntax, or a matched entry could not be read.
    #[error("invalid source pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// A declaration file is not valid JSON or does not fit the declaration format.
    #[error("failed to parse declarations in '{}': {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    /// An enum member initializer is not a constant the project can resolve.
    #[error("enum '{enum_name}' member '{member}': unsupported initializer `{initializer}`")]
    EnumInitializer {
        enum_name: String,
        member: String,
        initializer: String,
    },

    /// An interface (transitively) extends itself.
    #[error("interface '{name}' in '{}' has an inheritance cycle", path.display())]
    InheritanceCycle { path: PathBuf, name: String },

    #[error("io error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
