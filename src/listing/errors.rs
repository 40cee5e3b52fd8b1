use thiserror::Error;

/// Errors returned by [`ListingHandle`](super::ListingHandle) operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The listing worker has stopped
    #[error("Listing worker is no longer running")]
    Disconnected,
}
