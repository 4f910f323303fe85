//! Typed failures for every stage of a conversion.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // ---- input ---- //
    #[error("input file must be json: {}", path.display())]
    NotJsonFile { path: PathBuf },

    #[error("cannot open file with no name")]
    EmptyInputName,

    #[error("cannot open file {}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse json at {pointer}: {source}")]
    DecodeError {
        pointer: String,
        #[source]
        source: serde_json::Error,
    },

    // ---- inference ---- //
    #[error("unrecognized value for struct field `{path}`")]
    MalformedField { path: String },

    #[error("struct field cannot have empty name")]
    EmptyFieldName,

    #[error("struct field `{name}` type cannot be empty")]
    EmptyFieldType { name: String },

    #[error("object at `{path}` is nested deeper than {limit} levels")]
    NestingTooDeep { path: String, limit: usize },

    // ---- output ---- //
    #[error("cannot write file {}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot format file {}: {message}", path.display())]
    FormatFailure { path: PathBuf, message: String },

    #[error("{} inputs would write {}: {}", inputs.len(), path.display(), display_paths(inputs))]
    OutputCollision { path: PathBuf, inputs: Vec<PathBuf> },

    #[error("top-level struct has no type name")]
    UnnamedSchema,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
