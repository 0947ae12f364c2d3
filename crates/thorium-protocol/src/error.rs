//! Error types for the protocol layer.
//!
//! Each crate in Thorium defines its own error enum. A `ProtocolError`
//! always means the problem is in turning bodies into bytes or back,
//! never in the registries behind the service.

/// Errors that can occur while encoding or decoding wire bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A value could not be written as a body.
    #[cfg(feature = "json")]
    #[error("could not encode body: {0}")]
    Encode(serde_json::Error),

    /// A body could not be read back, usually malformed JSON or the body
    /// of a different endpoint.
    #[cfg(feature = "json")]
    #[error("could not decode body: {0}")]
    Decode(serde_json::Error),

    /// A request body was rejected before reaching the service: not JSON,
    /// a field of the wrong type, or no JSON content type.
    #[error("invalid body: {0}")]
    InvalidMessage(String),
}
