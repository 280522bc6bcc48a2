//! Render surface
//!
//! A snapshot of the diagram as it is drawn: one box per node, one segment
//! per edge, with colors already resolved. The on-screen canvas and every
//! export read the same geometry, so what is exported is what was shown.

use eframe::egui::{Color32, Pos2, Rect, Vec2};
use std::fmt::Write;

use super::graph::{FlowNode, Graph};
use super::theme::{opacity, to_hex, CanvasTheme, NodePaint};
use crate::error::{FlowchartError, Result};

/// Default node box size in diagram units
pub const NODE_WIDTH: f32 = 150.0;
pub const NODE_HEIGHT: f32 = 40.0;

/// Blank margin around the captured diagram
pub const SURFACE_PADDING: f32 = 40.0;

const FONT_SIZE: f32 = 12.0;

/// A node as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub label: String,
    pub rect: Rect,
    pub paint: NodePaint,
}

/// An edge as drawn, clipped to the borders of its endpoint boxes
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegment {
    pub id: String,
    pub source: String,
    pub target: String,
    pub start: Pos2,
    pub end: Pos2,
    pub animated: bool,
    pub label: Option<String>,
}

/// Everything needed to redraw the diagram off-screen
#[derive(Debug, Clone)]
pub struct RenderSurface {
    /// Diagram-space area covered by the surface, padding included
    pub bounds: Rect,
    pub background: Color32,
    pub edge_color: Color32,
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgeSegment>,
}

/// Bounding rectangle of a node in diagram space
pub fn node_rect(node: &FlowNode) -> Rect {
    Rect::from_min_size(
        Pos2::new(node.position.x as f32, node.position.y as f32),
        Vec2::new(NODE_WIDTH, NODE_HEIGHT),
    )
}

/// Connection points between two boxes, on the line joining their centers
pub fn edge_endpoints(from: &Rect, to: &Rect) -> (Pos2, Pos2) {
    if from == to {
        // self loop: leave from the right side, come back in on top
        return (from.right_center(), from.center_top());
    }
    let start = rect_intersection(from, from.center(), to.center());
    let end = rect_intersection(to, to.center(), from.center());
    (start, end)
}

/// Point where the ray from `inside` towards `outside` leaves `rect`
fn rect_intersection(rect: &Rect, inside: Pos2, outside: Pos2) -> Pos2 {
    let dir = outside - inside;
    let mut t = f32::MAX;

    if dir.x != 0.0 {
        let t_left = (rect.left() - inside.x) / dir.x;
        let t_right = (rect.right() - inside.x) / dir.x;
        if t_left > 0.0 {
            t = t.min(t_left);
        }
        if t_right > 0.0 {
            t = t.min(t_right);
        }
    }
    if dir.y != 0.0 {
        let t_top = (rect.top() - inside.y) / dir.y;
        let t_bottom = (rect.bottom() - inside.y) / dir.y;
        if t_top > 0.0 {
            t = t.min(t_top);
        }
        if t_bottom > 0.0 {
            t = t.min(t_bottom);
        }
    }

    if t == f32::MAX {
        inside
    } else {
        inside + dir * t
    }
}

impl EdgeSegment {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Bezier control points for self loops, `None` for straight edges
    pub fn loop_controls(&self) -> Option<[Pos2; 2]> {
        if !self.is_self_loop() {
            return None;
        }
        let reach = NODE_HEIGHT;
        Some([
            self.start + Vec2::new(reach, 0.0),
            self.end + Vec2::new(0.0, -reach),
        ])
    }

    pub fn midpoint(&self) -> Pos2 {
        match self.loop_controls() {
            Some([c1, _]) => Pos2::new(c1.x, self.end.y - NODE_HEIGHT * 0.5),
            None => self.start.lerp(self.end, 0.5),
        }
    }
}

impl RenderSurface {
    /// Snapshot `graph` as the canvas draws it.
    ///
    /// Fails with `RenderCapture` when there is nothing on screen.
    pub fn capture(graph: &Graph, theme: &CanvasTheme) -> Result<Self> {
        if graph.is_empty() {
            return Err(FlowchartError::RenderCapture(
                "the diagram has no rendered nodes".to_string(),
            ));
        }

        let nodes: Vec<NodeBox> = graph
            .nodes
            .iter()
            .map(|node| NodeBox {
                id: node.id.clone(),
                label: node.label().to_string(),
                rect: node_rect(node),
                paint: theme.paint_for(node),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let from = nodes.iter().find(|n| n.id == edge.source)?;
                let to = nodes.iter().find(|n| n.id == edge.target)?;
                let (start, end) = edge_endpoints(&from.rect, &to.rect);
                Some(EdgeSegment {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    start,
                    end,
                    animated: edge.is_animated(),
                    label: edge.label.clone(),
                })
            })
            .collect();

        let mut bounds = nodes[0].rect;
        for node in &nodes[1..] {
            bounds = bounds.union(node.rect);
        }

        Ok(Self {
            bounds: bounds.expand(SURFACE_PADDING),
            background: theme.canvas_bg,
            edge_color: theme.edge_color,
            nodes,
            edges,
        })
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    /// Map a diagram-space point into surface pixels (origin top-left)
    fn local(&self, p: Pos2) -> Pos2 {
        p - self.bounds.min.to_vec2()
    }

    /// The diagram as a standalone SVG scene, suitable for rasterizing
    pub fn to_svg_scene(&self, background: Color32) -> String {
        let mut svg = String::new();
        let edge_hex = to_hex(self.edge_color);
        // writing into a String cannot fail
        let _ = write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="Inter, system-ui, sans-serif">
  <defs>
    <marker id="arrow-end" markerWidth="10" markerHeight="10" refX="9" refY="5" orient="auto" markerUnits="userSpaceOnUse">
      <path d="M0,0 L10,5 L0,10 z" fill="{edge}" />
    </marker>
  </defs>
  <rect x="0" y="0" width="{w:.0}" height="{h:.0}" fill="{bg}" fill-opacity="{bg_opacity:.3}" />
"##,
            w = self.width(),
            h = self.height(),
            edge = edge_hex,
            bg = to_hex(background),
            bg_opacity = opacity(background),
        );

        for edge in &self.edges {
            let dash = if edge.animated {
                r#" stroke-dasharray="5 5""#
            } else {
                ""
            };
            let _ = writeln!(
                svg,
                r#"  <path d="{}" fill="none" stroke="{}" stroke-width="1.5"{} marker-end="url(#arrow-end)" />"#,
                self.path_data(edge),
                edge_hex,
                dash
            );
            if let Some(label) = &edge.label {
                let mid = self.local(edge.midpoint());
                let _ = writeln!(
                    svg,
                    r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" dy="0.35em" font-size="10" fill="{}">{}</text>"#,
                    mid.x,
                    mid.y,
                    edge_hex,
                    escape_xml(label)
                );
            }
        }

        for node in &self.nodes {
            let rect = node.rect.translate(-self.bounds.min.to_vec2());
            let center = rect.center();
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{r:.1}" ry="{r:.1}" fill="{}" fill-opacity="{:.3}" stroke="{}" stroke-width="{:.1}" />"#,
                rect.min.x,
                rect.min.y,
                rect.width(),
                rect.height(),
                to_hex(node.paint.fill),
                opacity(node.paint.fill),
                to_hex(node.paint.stroke),
                node.paint.stroke_width,
                r = node.paint.rounding,
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" dy="0.35em" font-size="{:.0}" fill="{}">{}</text>"#,
                center.x,
                center.y,
                FONT_SIZE,
                to_hex(node.paint.text),
                escape_xml(&node.label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// The diagram as XHTML markup: absolutely positioned node boxes over
    /// an inline SVG edge layer, like a browser-rendered viewport.
    pub fn to_markup(&self) -> String {
        let mut html = String::new();
        let edge_hex = to_hex(self.edge_color);
        let _ = writeln!(
            html,
            r#"<div class="flowchart__viewport" style="position: relative; width: {:.0}px; height: {:.0}px; background: {}; font-family: sans-serif;">"#,
            self.width(),
            self.height(),
            to_hex(self.background)
        );
        let _ = writeln!(
            html,
            r#"<svg class="flowchart__edges" xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" style="position: absolute; left: 0; top: 0; overflow: visible;">"#,
            self.width(),
            self.height()
        );
        for edge in &self.edges {
            let dash = if edge.animated {
                r#" stroke-dasharray="5 5""#
            } else {
                ""
            };
            let _ = writeln!(
                html,
                r#"<path class="flowchart__edge" data-id="{}" d="{}" fill="none" stroke="{}" stroke-width="1.5"{} />"#,
                escape_xml(&edge.id),
                self.path_data(edge),
                edge_hex,
                dash
            );
        }
        html.push_str("</svg>\n");

        for node in &self.nodes {
            let origin = self.local(node.rect.min);
            let _ = writeln!(
                html,
                r#"<div class="flowchart__node" data-id="{}" style="position: absolute; left: {:.1}px; top: {:.1}px; width: {:.0}px; height: {:.0}px; box-sizing: border-box; display: flex; align-items: center; justify-content: center; font-size: {:.0}px; background: {}; color: {}; border: {:.0}px solid {}; border-radius: {:.0}px;">{}</div>"#,
                escape_xml(&node.id),
                origin.x,
                origin.y,
                node.rect.width(),
                node.rect.height(),
                FONT_SIZE,
                to_hex(node.paint.fill),
                to_hex(node.paint.text),
                node.paint.stroke_width,
                to_hex(node.paint.stroke),
                node.paint.rounding,
                escape_xml(&node.label)
            );
        }
        html.push_str("</div>");
        html
    }

    fn path_data(&self, edge: &EdgeSegment) -> String {
        let start = self.local(edge.start);
        let end = self.local(edge.end);
        match edge.loop_controls() {
            Some([c1, c2]) => {
                let c1 = self.local(c1);
                let c2 = self.local(c2);
                format!(
                    "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
                    start.x, start.y, c1.x, c1.y, c2.x, c2.y, end.x, end.y
                )
            }
            None => format!(
                "M {:.1} {:.1} L {:.1} {:.1}",
                start.x, start.y, end.x, end.y
            ),
        }
    }
}

/// Escape text for XML attribute and element content
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowchart::graph::{FlowEdge, Position};
    use crate::flowchart::layout::{apply_orientation, Orientation};

    fn chain(labels: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for (i, label) in labels.iter().enumerate() {
            graph
                .nodes
                .push(FlowNode::new(format!("node_{i}"), *label, Position::default()));
            if i > 0 {
                graph.edges.push(FlowEdge::new(
                    format!("edge_{}", i - 1),
                    format!("node_{}", i - 1),
                    format!("node_{i}"),
                ));
            }
        }
        apply_orientation(&mut graph, Orientation::Vertical);
        graph
    }

    #[test]
    fn test_capture_renders_every_node_and_edge() {
        let graph = chain(&["Start", "Process", "Decision", "End"]);
        let surface = RenderSurface::capture(&graph, &CanvasTheme::light()).unwrap();
        assert_eq!(surface.nodes.len(), 4);
        assert_eq!(surface.edges.len(), 3);
        for edge in &surface.edges {
            assert!(surface.nodes.iter().any(|n| n.id == edge.source));
            assert!(surface.nodes.iter().any(|n| n.id == edge.target));
        }
    }

    #[test]
    fn test_capture_empty_graph_fails() {
        let err = RenderSurface::capture(&Graph::new(), &CanvasTheme::light()).unwrap_err();
        assert!(matches!(err, FlowchartError::RenderCapture(_)));
    }

    #[test]
    fn test_bounds_cover_nodes_with_padding() {
        let graph = chain(&["A", "B", "C"]);
        let surface = RenderSurface::capture(&graph, &CanvasTheme::light()).unwrap();
        // column at x=250, y from 0 to 200 + node height
        assert_eq!(surface.width(), NODE_WIDTH + 2.0 * SURFACE_PADDING);
        assert_eq!(surface.height(), 200.0 + NODE_HEIGHT + 2.0 * SURFACE_PADDING);
    }

    #[test]
    fn test_vertical_edges_meet_box_borders() {
        let a = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(150.0, 40.0));
        let b = Rect::from_min_size(Pos2::new(0.0, 100.0), Vec2::new(150.0, 40.0));
        let (start, end) = edge_endpoints(&a, &b);
        assert_eq!(start, Pos2::new(75.0, 40.0));
        assert_eq!(end, Pos2::new(75.0, 100.0));
    }

    #[test]
    fn test_markup_escapes_labels() {
        let mut graph = chain(&["a < b & c"]);
        graph.nodes[0].id = "x\"y".to_string();
        let surface = RenderSurface::capture(&graph, &CanvasTheme::light()).unwrap();
        let markup = surface.to_markup();
        assert!(markup.contains("a &lt; b &amp; c"));
        assert!(markup.contains("data-id=\"x&quot;y\""));
    }

    #[test]
    fn test_scene_draws_self_loop_as_curve() {
        let mut graph = chain(&["Retry"]);
        graph.edges.push(FlowEdge::new("loop", "node_0", "node_0"));
        let surface = RenderSurface::capture(&graph, &CanvasTheme::light()).unwrap();
        let svg = surface.to_svg_scene(Color32::WHITE);
        assert!(svg.contains(" C "));
        assert_eq!(svg.matches("<rect").count(), 2); // background + node
    }
}
