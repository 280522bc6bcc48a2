//! Error types for flowchart-studio

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowchartError {
    /// Empty input or no file selected. Never shown to the user.
    #[error("Nothing to generate from: {0}")]
    Validation(String),

    /// Network failure or non-success response from the generation service.
    /// The message is shown verbatim.
    #[error("{0}")]
    Request(String),

    #[error("Malformed flowchart payload: {0}")]
    Schema(String),

    /// The diagram has not been rendered, so there is nothing to capture.
    #[error("Render surface not available: {0}")]
    RenderCapture(String),

    #[error("Rasterization failed: {0}")]
    Raster(String),

    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowchartError {
    /// Whether this error should be hidden from the user entirely.
    pub fn is_silent(&self) -> bool {
        matches!(self, FlowchartError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, FlowchartError>;
