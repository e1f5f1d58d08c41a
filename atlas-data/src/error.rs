use thiserror::Error;

/// Errors from the remote flag-evaluation path.
///
/// Local flag operations are infallible; only the optional pass-through
/// to an external service can fail, and callers fall back to the local
/// store value when it does.
#[derive(Error, Debug)]
pub enum FlagError {
    #[error("Flag service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Flag service returned an invalid response: {0}")]
    InvalidResponse(String),
}
