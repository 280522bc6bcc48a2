//! Orientation layouts
//!
//! Two fixed formulas keyed by a node's index in the graph ordering:
//! - Vertical: a single column at x = 250, stepping 100 down
//! - Horizontal: a single row at y = 250, stepping 200 right
//!
//! Applying a layout overwrites every position, manual drags included.

use std::str::FromStr;

use super::graph::{Graph, Position};

const COLUMN_X: f64 = 250.0;
const ROW_Y: f64 = 250.0;
const VERTICAL_STEP: f64 = 100.0;
const HORIZONTAL_STEP: f64 = 200.0;

/// Flow direction of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Top to bottom
    #[default]
    Vertical,
    /// Left to right
    Horizontal,
}

impl Orientation {
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::Vertical => "Vertical",
            Orientation::Horizontal => "Horizontal",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    /// Position assigned to the node at `index`
    pub fn position_for(&self, index: usize) -> Position {
        let i = index as f64;
        match self {
            Orientation::Vertical => Position::new(COLUMN_X, i * VERTICAL_STEP),
            Orientation::Horizontal => Position::new(i * HORIZONTAL_STEP, ROW_Y),
        }
    }

}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertical" | "tb" | "down" => Ok(Orientation::Vertical),
            "horizontal" | "lr" | "right" => Ok(Orientation::Horizontal),
            _ => Err(format!("unknown orientation '{}'", s)),
        }
    }
}

/// Reposition every node according to `orientation`
pub fn apply_orientation(graph: &mut Graph, orientation: Orientation) {
    for (index, node) in graph.nodes.iter_mut().enumerate() {
        node.position = orientation.position_for(index);
    }
}
