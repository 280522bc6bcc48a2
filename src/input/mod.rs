//! Input Surface
//!
//! Holds the chosen modality and its value, validates it, and runs the
//! generation call on a worker thread. Results come back over an mpsc
//! channel that the UI polls once per frame.

mod ui;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::client::{GenerationRequest, GenerationService, ImageUpload, PromptRequest, TextRequest};
use crate::error::{FlowchartError, Result};
use crate::flowchart::Graph;

/// Input modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Structured text such as `A -> B -> C`
    #[default]
    Text,
    /// Natural-language description
    Prompt,
    /// Image or PDF of an existing diagram
    Image,
}

impl InputMode {
    pub fn all() -> &'static [InputMode] {
        &[InputMode::Text, InputMode::Prompt, InputMode::Image]
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Text => "Text",
            InputMode::Prompt => "Prompt",
            InputMode::Image => "Image",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            InputMode::Text => "📝",
            InputMode::Prompt => "✨",
            InputMode::Image => "🖼",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            InputMode::Text => "Enter structured text:\nStart -> Process -> Decision -> End",
            InputMode::Prompt => "Describe your flowchart:\nCreate a user login process flowchart",
            InputMode::Image => "Choose Image or PDF",
        }
    }
}

/// Modality, input value and the in-flight generation call
#[derive(Default)]
pub struct InputSurface {
    mode: InputMode,
    text: String,
    file: Option<PathBuf>,
    loading: bool,
    pending: Option<Receiver<Result<Graph>>>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn select_file(&mut self, path: PathBuf) {
        log::debug!("Selected {:?}", path);
        self.file = Some(path);
    }

    /// True while a generation call is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Image mode drops the text; text modes drop the file.
    pub fn select_mode(&mut self, mode: InputMode) {
        match mode {
            InputMode::Image => self.text.clear(),
            InputMode::Text | InputMode::Prompt => self.file = None,
        }
        self.mode = mode;
    }

    /// Whether the generate trigger should be enabled
    pub fn can_generate(&self) -> bool {
        !self.loading
            && match self.mode {
                InputMode::Text | InputMode::Prompt => !self.text.trim().is_empty(),
                InputMode::Image => self.file.is_some(),
            }
    }

    /// Validate the current input and turn it into a request.
    ///
    /// Text is sent exactly as typed; whitespace only counts for the
    /// emptiness check.
    pub fn build_request(&self) -> Result<GenerationRequest> {
        match self.mode {
            InputMode::Text | InputMode::Prompt if self.text.trim().is_empty() => Err(
                FlowchartError::Validation("input text is empty".to_string()),
            ),
            InputMode::Text => Ok(GenerationRequest::Text(TextRequest {
                text: self.text.clone(),
            })),
            InputMode::Prompt => Ok(GenerationRequest::Prompt(PromptRequest {
                prompt: self.text.clone(),
            })),
            InputMode::Image => {
                let path = self.file.as_ref().ok_or_else(|| {
                    FlowchartError::Validation("no file selected".to_string())
                })?;
                Ok(GenerationRequest::Image(ImageUpload::from_path(path)?))
            }
        }
    }

    /// Start a generation call on a worker thread.
    ///
    /// Returns `Ok(false)` without doing anything while another call is
    /// outstanding.
    pub fn start(&mut self, service: Arc<dyn GenerationService>) -> Result<bool> {
        if self.loading {
            log::debug!("Generation already in progress, ignoring");
            return Ok(false);
        }

        let request = self.build_request()?;
        log::info!("Generating via {}", request.endpoint());

        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("flowchart-generate".to_string())
            .spawn(move || {
                let result = request.send(service.as_ref());
                // receiver gone means the app is shutting down
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => {
                self.loading = true;
                self.pending = Some(rx);
                Ok(true)
            }
            Err(e) => Err(FlowchartError::Io(e)),
        }
    }

    /// Non-blocking check for the outstanding call's result.
    ///
    /// Yields the result exactly once and clears the loading flag.
    pub fn poll(&mut self) -> Option<Result<Graph>> {
        let received = match self.pending.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(worker_lost()),
        };
        self.finish();
        Some(received)
    }

    /// Block until the outstanding call finishes
    pub fn wait(&mut self) -> Option<Result<Graph>> {
        let received = self.pending.as_ref()?.recv().unwrap_or_else(|_| Err(worker_lost()));
        self.finish();
        Some(received)
    }

    fn finish(&mut self) {
        self.pending = None;
        self.loading = false;
    }
}

fn worker_lost() -> FlowchartError {
    FlowchartError::Request("generation worker exited without a result".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_clears_other_input() {
        let mut input = InputSurface::new();
        input.set_text("A -> B");
        input.select_mode(InputMode::Prompt);
        assert_eq!(input.text(), "A -> B");

        input.select_mode(InputMode::Image);
        assert_eq!(input.text(), "");
        input.select_file(PathBuf::from("chart.png"));

        input.select_mode(InputMode::Text);
        assert!(input.file().is_none());
    }

    #[test]
    fn test_whitespace_is_not_input() {
        let mut input = InputSurface::new();
        input.set_text("  \n\t ");
        assert!(!input.can_generate());
        assert!(matches!(
            input.build_request(),
            Err(FlowchartError::Validation(_))
        ));
    }

    #[test]
    fn test_text_is_sent_untrimmed() {
        let mut input = InputSurface::new();
        input.set_text("  Start -> End\n");
        match input.build_request().unwrap() {
            GenerationRequest::Text(req) => assert_eq!(req.text, "  Start -> End\n"),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_image_mode_needs_file() {
        let mut input = InputSurface::new();
        input.select_mode(InputMode::Image);
        assert!(!input.can_generate());
        let err = input.build_request().unwrap_err();
        assert!(err.is_silent());
    }

    #[test]
    fn test_poll_without_call() {
        let mut input = InputSurface::new();
        assert!(input.poll().is_none());
        assert!(input.wait().is_none());
        assert!(!input.is_loading());
    }
}
