use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("Malformed data: {0}")]
    MalformedData(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedData(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for CheckoutError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CheckoutError {
    /// Transport-class failures (network, missing data, non-2xx status).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
