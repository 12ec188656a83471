//! Payload encoding
//!
//! Values are stored as JSON bytes.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Encodes `value` into a payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Decodes a payload into `T`.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(payload)?)
}
