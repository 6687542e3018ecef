//! Error types shared by the template engine, the registry and the loaders.
//!
//! Lookup misses are not errors: an unknown member renders as a placeholder.
//! Everything here aborts the whole render.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// A directive opener with no matching unescaped closer on the same line.
    #[error("opened tag is not closed at index {offset} on line {line}: {input}")]
    Parse {
        line: usize,
        offset: usize,
        input: String,
    },

    /// A bulk include named a module outside the known set.
    #[error("invalid module name '{0}'")]
    UnknownModule(String),

    #[error("failed to parse config file {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The logo source is not text.
    #[error("the source file '{0}' is a binary file")]
    BinaryLogo(PathBuf),
}

pub type Result<T> = std::result::Result<T, FetchError>;
