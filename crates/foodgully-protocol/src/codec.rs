//! Codec trait and implementations for serializing/deserializing wire data.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The HTTP client decodes response bodies through it and the token store
//! uses it for its on-disk file, so neither has to care which format is
//! in play.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a codec lives inside the shared HTTP
/// client, which is cloned into every async task that issues requests.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The backend speaks JSON, so this is the codec the client is built with.
///
/// ## Example
///
/// ```rust
/// use foodgully_protocol::{Codec, JsonCodec, JwtResponse};
///
/// let codec = JsonCodec;
/// let body: JwtResponse = codec.decode(br#"{"token":"abc123"}"#).unwrap();
/// assert_eq!(body.token, "abc123");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
