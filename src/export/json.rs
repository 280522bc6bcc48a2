//! JSON export and re-import
//!
//! The document holds exactly `{ nodes, edges }`, pretty-printed.

use serde::Serialize;

use crate::error::{FlowchartError, Result};
use crate::flowchart::{FlowEdge, FlowNode, Graph};

#[derive(Serialize)]
struct ExportDocument<'a> {
    nodes: &'a [FlowNode],
    edges: &'a [FlowEdge],
}

pub fn encode(graph: &Graph) -> Result<Vec<u8>> {
    let document = ExportDocument {
        nodes: &graph.nodes,
        edges: &graph.edges,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Parse a previously exported document (or any service response)
pub fn decode(bytes: &[u8]) -> Result<Graph> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FlowchartError::Schema(format!("not UTF-8: {}", e)))?;
    Graph::from_json_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r##"{
        "nodes": [
            {"id": "node_0", "type": "default", "data": {"label": "Start"},
             "position": {"x": 250.0, "y": 0.0},
             "style": {"background": "#4ade80", "color": "white", "border": "2px solid #22c55e"}},
            {"id": "node_1", "type": "default", "data": {"label": "Check input?"},
             "position": {"x": 250.0, "y": 100.0}, "selected": false}
        ],
        "edges": [
            {"id": "edge_0", "source": "node_0", "target": "node_1", "animated": true}
        ],
        "metadata": {"source": "prompt", "node_count": 2}
    }"##;

    #[test]
    fn test_export_then_import_reproduces_graph() {
        let graph = Graph::from_json_str(GENERATED).unwrap();
        let exported = encode(&graph).unwrap();
        let imported = decode(&exported).unwrap();

        assert_eq!(imported.nodes, graph.nodes);
        assert_eq!(imported.edges, graph.edges);
    }

    #[test]
    fn test_dragged_positions_survive_round_trip() {
        use crate::flowchart::Position;

        let mut graph = Graph::new();
        graph.nodes.push(FlowNode::new(
            "node_0",
            "Start",
            Position::new(2043.7496024149239, -17.300000190734863),
        ));
        // Accumulated f32 drag deltas on top of generated coordinates
        for i in 1..200 {
            let dx = (i as f32 * 0.37).sin() * 113.3;
            let dy = (i as f32 * 1.91).cos() * 57.9;
            graph.nodes.push(FlowNode::new(
                format!("node_{i}"),
                format!("Step {i}"),
                Position::new(250.0 + i as f64 / 3.0 + dx as f64, i as f64 * 100.0 + dy as f64),
            ));
        }

        let imported = decode(&encode(&graph).unwrap()).unwrap();

        for (before, after) in graph.nodes.iter().zip(&imported.nodes) {
            assert_eq!(after.position, before.position, "{} drifted", before.id);
        }
    }

    #[test]
    fn test_export_holds_only_nodes_and_edges() {
        let graph = Graph::from_json_str(GENERATED).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encode(&graph).unwrap()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["edges".to_string(), "nodes".to_string()]);
        assert_eq!(value["nodes"][1]["selected"], false);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            decode(b"{\"nodes\": 3}"),
            Err(FlowchartError::Schema(_))
        ));
        assert!(decode(&[0xff, 0xfe]).is_err());
    }
}
