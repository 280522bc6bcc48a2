//! Flowchart Studio - turn text, prompts and images into editable flowcharts
//!
//! Sends user input to a flowchart generation service, renders the returned
//! graph on an interactive canvas, and exports it as JSON, PNG, SVG or PDF.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod flowchart;
pub mod input;
pub mod studio;

// Re-export commonly used types
pub use client::{GenerationClient, GenerationRequest, GenerationService, ImageUpload};
pub use commands::{Command, CommandQueue};
pub use config::StudioConfig;
pub use error::{FlowchartError, Result};
pub use export::{ExportFormat, Exporter};
pub use flowchart::{FlowEdge, FlowNode, FlowchartCanvas, Graph, GraphStore, Orientation};
pub use input::{InputMode, InputSurface};
pub use studio::{Notice, Studio};
