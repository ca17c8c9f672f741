//! # PDF Error Types

use thiserror::Error;

/// Invoice rendering errors.
#[derive(Debug, Error)]
pub enum PdfError {
    /// printpdf rejected the document (font registration, serialization).
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// A line amount on the bill could not be computed.
    #[error("Invoice amounts invalid: {0}")]
    Amount(#[from] acbill_core::CoreError),

    /// Writing the finished document failed.
    #[error("PDF output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering operations.
pub type PdfResult<T> = Result<T, PdfError>;
