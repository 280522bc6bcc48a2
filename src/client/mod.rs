//! Generation Client
//!
//! Talks to the flowchart generation service. One operation per input
//! modality, each returning a validated [`Graph`]:
//! - `POST /generate/text`   with `{ "text": ... }`
//! - `POST /generate/prompt` with `{ "prompt": ... }`
//! - `POST /generate/image`  multipart, field `file`

pub mod http;
pub mod models;

pub use http::GenerationClient;
pub use models::{GenerationRequest, ImageUpload, PromptRequest, TextRequest};

use crate::error::Result;
use crate::flowchart::Graph;

/// Something that turns user input into a flowchart graph.
///
/// Implementations must reject payloads that fail [`Graph::validate`].
pub trait GenerationService: Send + Sync {
    fn generate_from_text(&self, text: &str) -> Result<Graph>;

    fn generate_from_prompt(&self, prompt: &str) -> Result<Graph>;

    fn generate_from_image(&self, upload: &ImageUpload) -> Result<Graph>;
}
