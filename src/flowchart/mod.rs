//! Flowchart Module
//!
//! The diagram side of the studio:
//! - Graph model and schema validation
//! - Canonical store with explicit replace / merge of local edits
//! - Interactive egui canvas (drag, connect, orientation toggle)
//! - Render surface shared by the canvas and the exporters

pub mod canvas;
pub mod graph;
pub mod layout;
pub mod store;
pub mod surface;
pub mod theme;

pub use canvas::FlowchartCanvas;
pub use graph::{FlowEdge, FlowNode, Graph, GraphMetadata, NodeData, NodeStyle, Position};
pub use layout::{apply_orientation, Orientation};
pub use store::GraphStore;
pub use surface::{EdgeSegment, NodeBox, RenderSurface};
pub use theme::{CanvasTheme, NodePaint};
