//! Flowchart Graph Data Structures
//!
//! The node/edge document exchanged with the generation service and written
//! by the JSON export. Field names follow the service's wire format, so a
//! node's label travels as `data.label`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{FlowchartError, Result};

/// Position of a node's top-left corner in diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Payload carried by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Display label
    pub label: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Presentation hints attached by the service (CSS-like values)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStyle {
    /// Fill color, e.g. "#4ade80"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Text color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Border shorthand, e.g. "2px solid #22c55e"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,

    #[serde(
        rename = "borderRadius",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub border_radius: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node in the flowchart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique identifier (e.g., "node_0")
    pub id: String,

    /// Renderer node type ("default", "input", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub data: NodeData,

    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,

    /// Fields we do not interpret but must hand back on export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,

    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generation provenance reported by the service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A flowchart: the unit of generation output and of export
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,
}

impl FlowNode {
    /// Create a plain node with no style
    pub fn new(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: None,
            data: NodeData {
                label: label.into(),
                extra: Map::new(),
            },
            position,
            style: None,
            extra: Map::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = Some(style);
        self
    }
}

impl FlowEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            animated: None,
            label: None,
            extra: Map::new(),
        }
    }

    pub fn is_animated(&self) -> bool {
        self.animated.unwrap_or(false)
    }
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Check the invariants every rendered graph must satisfy: node and edge
    /// ids are non-empty and unique, and every edge endpoint names a node.
    pub fn validate(&self) -> Result<()> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(FlowchartError::Schema("node with empty id".to_string()));
            }
            if !node.position.x.is_finite() || !node.position.y.is_finite() {
                return Err(FlowchartError::Schema(format!(
                    "node '{}' has a non-finite position",
                    node.id
                )));
            }
            if !node_ids.insert(node.id.as_str()) {
                return Err(FlowchartError::Schema(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if edge.id.is_empty() {
                return Err(FlowchartError::Schema("edge with empty id".to_string()));
            }
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(FlowchartError::Schema(format!(
                    "duplicate edge id '{}'",
                    edge.id
                )));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(FlowchartError::Schema(format!(
                        "edge '{}' references unknown node '{}'",
                        edge.id, endpoint
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a graph document
    pub fn from_json_str(source: &str) -> Result<Self> {
        let graph: Graph =
            serde_json::from_str(source).map_err(|e| FlowchartError::Schema(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_PAYLOAD: &str = r##"{
        "nodes": [
            {"id": "node_0", "type": "default", "data": {"label": "Start"},
             "position": {"x": 250, "y": 0},
             "style": {"background": "#4ade80", "color": "white",
                       "border": "2px solid #22c55e", "padding": "10px", "borderRadius": "8px"}},
            {"id": "node_1", "type": "default", "data": {"label": "End"},
             "position": {"x": 250, "y": 100}}
        ],
        "edges": [{"id": "edge_0", "source": "node_0", "target": "node_1", "animated": true}],
        "metadata": {"source": "text", "node_count": 2}
    }"##;

    #[test]
    fn test_parse_service_payload() {
        let graph = Graph::from_json_str(SERVICE_PAYLOAD).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].label(), "Start");
        assert_eq!(graph.nodes[0].kind.as_deref(), Some("default"));
        let style = graph.nodes[0].style.as_ref().unwrap();
        assert_eq!(style.border_radius.as_deref(), Some("8px"));
        assert!(graph.edges[0].is_animated());
        assert_eq!(graph.metadata.as_ref().unwrap().node_count, Some(2));
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let source = r#"{"nodes":[{"id":"a","data":{"label":"A","icon":"x"},
            "position":{"x":1,"y":2},"width":150}],"edges":[]}"#;
        let graph = Graph::from_json_str(source).unwrap();
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][0]["width"], 150);
        assert_eq!(value["nodes"][0]["data"]["icon"], "x");
    }

    #[test]
    fn test_missing_label_is_schema_error() {
        let source = r#"{"nodes":[{"id":"a","data":{},"position":{"x":0,"y":0}}],"edges":[]}"#;
        assert!(matches!(
            Graph::from_json_str(source),
            Err(FlowchartError::Schema(_))
        ));
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut graph = Graph::new();
        graph.nodes.push(FlowNode::new("a", "A", Position::default()));
        graph.edges.push(FlowEdge::new("e", "a", "ghost"));
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = Graph::new();
        graph.nodes.push(FlowNode::new("a", "A", Position::default()));
        graph.nodes.push(FlowNode::new("a", "Again", Position::default()));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_self_loop_is_valid() {
        let mut graph = Graph::new();
        graph.nodes.push(FlowNode::new("a", "A", Position::default()));
        graph.edges.push(FlowEdge::new("e", "a", "a"));
        assert!(graph.validate().is_ok());
    }
}
