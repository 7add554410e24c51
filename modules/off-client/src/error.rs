use thiserror::Error;

pub type Result<T> = std::result::Result<T, OffError>;

#[derive(Debug, Error)]
pub enum OffError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid barcode: {0:?}")]
    InvalidBarcode(String),

    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for OffError {
    fn from(err: reqwest::Error) -> Self {
        OffError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for OffError {
    fn from(err: serde_json::Error) -> Self {
        OffError::Parse(err.to_string())
    }
}
