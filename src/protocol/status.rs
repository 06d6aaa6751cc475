//! Status definitions
//!
//! Represents the text responses the server sends back.

/// A server response
///
/// `Listing` is only ever produced by the server; clients read a listing
/// with [`decode_listing`](super::decode_listing) because the body carries
/// no tag. `Unknown` is only ever produced by decoding and must be treated
/// as a failed exchange, never as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Server is waiting for upload bytes
    Ready,

    /// Operation succeeded; bare `SUCCESS` when no message
    Success(Option<String>),

    /// Operation failed
    Error(String),

    /// File names in the storage root
    Listing(Vec<String>),

    /// Text that matched no known tag
    Unknown(String),
}

impl Status {
    /// Create a SUCCESS response carrying a message
    pub fn success(message: &str) -> Self {
        Status::Success(Some(message.to_string()))
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Status::Error(message.to_string())
    }
}
