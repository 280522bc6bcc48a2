//! Request payloads for the generation service

use serde::Serialize;
use std::path::Path;

use super::GenerationService;
use crate::error::{FlowchartError, Result};
use crate::flowchart::Graph;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: String,
}

/// A file ready to be sent as the multipart `file` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(Path::new(&file_name)).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                FlowchartError::Validation(format!("{} is not a file", path.display()))
            })?;
        Ok(Self::new(file_name, bytes))
    }
}

/// MIME type guessed from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        return "application/pdf";
    }
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// One generation call, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Text(TextRequest),
    Prompt(PromptRequest),
    Image(ImageUpload),
}

impl GenerationRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            GenerationRequest::Text(_) => "/generate/text",
            GenerationRequest::Prompt(_) => "/generate/prompt",
            GenerationRequest::Image(_) => "/generate/image",
        }
    }

    /// Dispatch to the matching service operation
    pub fn send(&self, service: &dyn GenerationService) -> Result<Graph> {
        match self {
            GenerationRequest::Text(req) => service.generate_from_text(&req.text),
            GenerationRequest::Prompt(req) => service.generate_from_prompt(&req.prompt),
            GenerationRequest::Image(upload) => service.generate_from_image(upload),
        }
    }
}
