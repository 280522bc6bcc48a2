//! Canvas Theme
//!
//! Maps the service's CSS-like node styles onto concrete colors, with
//! light/dark defaults for anything a node does not specify.

use eframe::egui::Color32;

use super::graph::{FlowNode, NodeStyle};

/// Colors used by the on-screen canvas and by exported surfaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTheme {
    /// Background color for the canvas
    pub canvas_bg: Color32,

    /// Background dot color
    pub grid_color: Color32,

    /// Default node fill
    pub node_fill: Color32,

    /// Default node stroke
    pub node_stroke: Color32,

    /// Node text color
    pub node_text: Color32,

    /// Dragged node highlight
    pub node_selected: Color32,

    /// Hovered node highlight
    pub node_hover: Color32,

    /// Edge/connection color
    pub edge_color: Color32,

    /// Connection handle fill
    pub handle: Color32,

    /// Minimap backdrop
    pub minimap_bg: Color32,
}

/// Resolved paint for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePaint {
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
    pub text: Color32,
    pub rounding: f32,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(0xff, 0xff, 0xff),
            grid_color: Color32::from_rgb(0x91, 0x91, 0xa0),
            node_fill: Color32::from_rgb(0xff, 0xff, 0xff),
            node_stroke: Color32::from_rgb(0x1a, 0x19, 0x2b),
            node_text: Color32::from_rgb(0x22, 0x22, 0x22),
            node_selected: Color32::from_rgb(0x3b, 0x82, 0xf6),
            node_hover: Color32::from_rgb(0x60, 0xa5, 0xfa),
            edge_color: Color32::from_rgb(0xb1, 0xb1, 0xb7),
            handle: Color32::from_rgb(0x1a, 0x19, 0x2b),
            minimap_bg: Color32::from_rgba_unmultiplied(0xf1, 0xf5, 0xf9, 220),
        }
    }

    pub fn dark() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(0x14, 0x16, 0x1c),
            grid_color: Color32::from_rgba_unmultiplied(255, 255, 255, 30),
            node_fill: Color32::from_rgb(0x2a, 0x2d, 0x37),
            node_stroke: Color32::from_rgb(0x94, 0xa3, 0xb8),
            node_text: Color32::from_rgb(0xe2, 0xe8, 0xf0),
            node_selected: Color32::from_rgb(0x60, 0xa5, 0xfa),
            node_hover: Color32::from_rgb(0x93, 0xc5, 0xfd),
            edge_color: Color32::from_rgb(0x64, 0x74, 0x8b),
            handle: Color32::from_rgb(0xe2, 0xe8, 0xf0),
            minimap_bg: Color32::from_rgba_unmultiplied(0, 0, 0, 150),
        }
    }

    /// Resolve a node's style against the theme defaults
    pub fn paint_for(&self, node: &FlowNode) -> NodePaint {
        let default_style = NodeStyle::default();
        let style = node.style.as_ref().unwrap_or(&default_style);
        let (stroke_width, stroke) = style
            .border
            .as_deref()
            .map(parse_border)
            .unwrap_or((None, None));

        NodePaint {
            fill: style
                .background
                .as_deref()
                .and_then(parse_css_color)
                .unwrap_or(self.node_fill),
            stroke: stroke.unwrap_or(self.node_stroke),
            stroke_width: stroke_width.unwrap_or(1.0),
            text: style
                .color
                .as_deref()
                .and_then(parse_css_color)
                .unwrap_or(self.node_text),
            rounding: style
                .border_radius
                .as_deref()
                .and_then(parse_px)
                .unwrap_or(3.0),
        }
    }
}

/// Parse a CSS color: hex (#rgb, #rrggbb, #rrggbbaa) or a few keywords
pub fn parse_css_color(color_str: &str) -> Option<Color32> {
    let color_str = color_str.trim();
    match color_str.to_lowercase().as_str() {
        "white" => return Some(Color32::WHITE),
        "black" => return Some(Color32::BLACK),
        "transparent" => return Some(Color32::TRANSPARENT),
        _ => {}
    }

    let hex = color_str.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let expand = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
            Some(Color32::from_rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color32::from_rgba_unmultiplied(r, g, b, a))
        }
        _ => None,
    }
}

/// Parse a border shorthand like "2px solid #22c55e" into (width, color)
pub fn parse_border(border: &str) -> (Option<f32>, Option<Color32>) {
    let mut width = None;
    let mut color = None;
    for token in border.split_whitespace() {
        if let Some(px) = parse_px(token) {
            width = Some(px);
        } else if let Some(c) = parse_css_color(token) {
            color = Some(c);
        }
    }
    (width, color)
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.parse().ok()
}

/// Format a color as "#rrggbb" for SVG/HTML output
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Alpha channel as a 0.0 - 1.0 opacity
pub fn opacity(color: Color32) -> f32 {
    color.a() as f32 / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowchart::graph::Position;

    #[test]
    fn test_css_color_parsing() {
        assert_eq!(
            parse_css_color("#ff0000"),
            Some(Color32::from_rgb(255, 0, 0))
        );
        assert_eq!(parse_css_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_css_color("white"), Some(Color32::WHITE));
        assert_eq!(
            parse_css_color("#00ff0080"),
            Some(Color32::from_rgba_unmultiplied(0, 255, 0, 128))
        );
        assert_eq!(parse_css_color("solid"), None);
    }

    #[test]
    fn test_border_shorthand() {
        let (width, color) = parse_border("2px solid #22c55e");
        assert_eq!(width, Some(2.0));
        assert_eq!(color, Some(Color32::from_rgb(0x22, 0xc5, 0x5e)));
    }

    #[test]
    fn test_paint_uses_style_then_theme() {
        let theme = CanvasTheme::light();
        let plain = FlowNode::new("a", "A", Position::default());
        assert_eq!(theme.paint_for(&plain).fill, theme.node_fill);

        let styled = plain.clone().with_style(NodeStyle {
            background: Some("#60a5fa".to_string()),
            color: Some("white".to_string()),
            border: Some("2px solid #3b82f6".to_string()),
            border_radius: Some("8px".to_string()),
            ..Default::default()
        });
        let paint = theme.paint_for(&styled);
        assert_eq!(to_hex(paint.fill), "#60a5fa");
        assert_eq!(paint.text, Color32::WHITE);
        assert_eq!(paint.stroke_width, 2.0);
        assert_eq!(paint.rounding, 8.0);
    }
}
