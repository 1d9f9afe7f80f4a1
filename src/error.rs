use thiserror::Error;

/// Errors that can occur while collecting input or producing an invoice
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Please enter a {0}.")]
    MissingRequiredField(&'static str),

    #[error("Failed to render invoice: {0}")]
    RenderFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InvoiceError {
    /// Errors the user can fix by entering a different value.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            InvoiceError::InvalidInput(_) | InvoiceError::MissingRequiredField(_)
        )
    }
}

impl From<lopdf::Error> for InvoiceError {
    fn from(err: lopdf::Error) -> Self {
        InvoiceError::RenderFailure(err.to_string())
    }
}

impl From<image::ImageError> for InvoiceError {
    fn from(err: image::ImageError) -> Self {
        InvoiceError::RenderFailure(format!("unreadable logo: {err}"))
    }
}

impl From<toml::de::Error> for InvoiceError {
    fn from(err: toml::de::Error) -> Self {
        InvoiceError::Config(err.to_string())
    }
}

/// Result type for invoice operations
pub type Result<T> = std::result::Result<T, InvoiceError>;
