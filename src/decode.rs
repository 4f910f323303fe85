//! Bytes → generic JSON mapping.
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Decoded top-level document. Keeps document order (`preserve_order`).
pub type JsonMap = Map<String, Value>;

/// Decode a JSON object, with JSON-path context in error messages.
pub fn decode_document(bytes: &[u8]) -> Result<JsonMap> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    let map = match serde_path_to_error::deserialize::<_, JsonMap>(&mut *de) {
        Ok(map) => map,
        Err(err) => {
            let pointer = err.path().to_string();
            return Err(Error::DecodeError { pointer, source: err.into_inner() });
        }
    };
    // trailing garbage after the object
    de.end().map_err(|source| Error::DecodeError { pointer: ".".to_string(), source })?;
    Ok(map)
}
