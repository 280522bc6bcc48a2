//! HTTP implementation of the generation service

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Serialize;

use super::models::{ImageUpload, PromptRequest, TextRequest};
use super::GenerationService;
use crate::config::ApiConfig;
use crate::error::{FlowchartError, Result};
use crate::flowchart::Graph;

/// Blocking client for the flowchart generation service
pub struct GenerationClient {
    base_url: String,
    http: Client,
}

impl GenerationClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("flowchart-studio/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| FlowchartError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Graph> {
        let url = self.endpoint(path);
        log::info!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| FlowchartError::Request(e.to_string()))?;
        read_graph(response)
    }
}

impl GenerationService for GenerationClient {
    fn generate_from_text(&self, text: &str) -> Result<Graph> {
        self.post_json(
            "/generate/text",
            &TextRequest {
                text: text.to_string(),
            },
        )
    }

    fn generate_from_prompt(&self, prompt: &str) -> Result<Graph> {
        self.post_json(
            "/generate/prompt",
            &PromptRequest {
                prompt: prompt.to_string(),
            },
        )
    }

    fn generate_from_image(&self, upload: &ImageUpload) -> Result<Graph> {
        let url = self.endpoint("/generate/image");
        log::info!(
            "POST {} ({}, {} bytes)",
            url,
            upload.file_name,
            upload.bytes.len()
        );

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)
            .map_err(|e| FlowchartError::Request(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| FlowchartError::Request(e.to_string()))?;
        read_graph(response)
    }
}

/// Turn a service response into a validated graph
fn read_graph(response: Response) -> Result<Graph> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| FlowchartError::Request(e.to_string()))?;

    if !status.is_success() {
        let message = status_message(status.as_u16(), &body);
        log::warn!("{}", message);
        return Err(FlowchartError::Request(message));
    }

    let graph = Graph::from_json_str(&body)?;
    log::debug!(
        "Received {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(graph)
}

/// `Request failed with status code N`, plus the service's `detail` if any
fn status_message(code: u16, body: &str) -> String {
    let base = format!("Request failed with status code {}", code);
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(detail)) => format!("{}: {}", base, detail),
        Some(serde_json::Value::Null) | None => base,
        Some(other) => format!("{}: {}", base, other),
    }
}
