//! SVG export: the surface markup embedded verbatim in a foreignObject.
//!
//! The canvas is always 1200x800 regardless of the diagram's extent, so
//! large diagrams are clipped and small ones sit in the top-left corner.

use crate::flowchart::RenderSurface;

pub const SVG_WIDTH: u32 = 1200;
pub const SVG_HEIGHT: u32 = 800;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

pub fn wrap_markup(surface: &RenderSurface) -> String {
    format!(
        r#"<svg xmlns="{svg_ns}" width="{width}" height="{height}">
  <foreignObject width="100%" height="100%">
    <div xmlns="{xhtml_ns}">
{markup}
    </div>
  </foreignObject>
</svg>
"#,
        svg_ns = SVG_NS,
        xhtml_ns = XHTML_NS,
        width = SVG_WIDTH,
        height = SVG_HEIGHT,
        markup = surface.to_markup(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowchart::{CanvasTheme, FlowNode, Graph, Position};

    fn surface_with(labels: &[&str]) -> RenderSurface {
        let mut graph = Graph::new();
        for (i, label) in labels.iter().enumerate() {
            graph.nodes.push(FlowNode::new(
                format!("node_{i}"),
                *label,
                Position::new(250.0, i as f64 * 100.0),
            ));
        }
        RenderSurface::capture(&graph, &CanvasTheme::light()).unwrap()
    }

    #[test]
    fn test_fixed_canvas_size() {
        let svg = wrap_markup(&surface_with(&["Start"]));
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="800">"#
        ));
        assert!(svg.contains(r#"<foreignObject width="100%" height="100%">"#));
        assert!(svg.contains(r#"<div xmlns="http://www.w3.org/1999/xhtml">"#));
    }

    #[test]
    fn test_markup_is_embedded_verbatim() {
        let surface = surface_with(&["Start", "Is valid?"]);
        let svg = wrap_markup(&surface);
        assert!(svg.contains(&surface.to_markup()));
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = wrap_markup(&surface_with(&["a < b & c"]));
        assert!(svg.contains("a &lt; b &amp; c"));
    }
}
