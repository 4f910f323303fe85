//! Infer Go struct declarations from sample JSON documents.
//!
//! ```text
//! bytes ─decode─▶ Map<String, Value> ─inference─▶ StructSchema ─codegen─▶ Go source ─format─▶ file
//! ```
pub mod cli;
pub mod codegen;
pub mod convert;
pub mod decode;
pub mod error;
pub mod format;
pub mod inference;
pub mod ir;

pub use error::{Error, Result};
pub use inference::{InferOptions, Inference};
pub use ir::{FieldDecl, FieldType, StructSchema};
