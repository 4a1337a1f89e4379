use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP client behind the default transport could not be built.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Endpoint overrides have to be full URLs.
    #[error("'{0}' is not a valid notify endpoint")]
    InvalidEndpoint(String),
}
