//! User actions as commands
//!
//! Every interaction (button press, drag, menu pick, finished background
//! call) becomes a [`Command`] pushed onto a [`CommandQueue`]. The
//! [`Studio`](crate::studio::Studio) drains the queue once per frame on the
//! UI thread, so commands apply strictly in the order they were issued.

use std::collections::VecDeque;
use std::path::PathBuf;

use eframe::egui::Vec2;

use crate::error::Result;
use crate::export::ExportFormat;
use crate::flowchart::Graph;
use crate::input::InputMode;

#[derive(Debug)]
pub enum Command {
    /// Switch input modality
    SelectMode(InputMode),

    /// Pick an image or PDF for image mode
    SelectFile(PathBuf),

    /// Start a generation call for the current input
    Generate,

    /// A generation call came back
    GenerationFinished(Result<Graph>),

    /// Move a node by a diagram-space delta
    DragNode { id: String, delta: Vec2 },

    /// Draw a new edge between two existing nodes
    Connect { source: String, target: String },

    /// Flip vertical/horizontal and reposition every node
    ToggleOrientation,

    /// Write the current diagram to a file
    Export(ExportFormat),
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectMode(_) => "select-mode",
            Command::SelectFile(_) => "select-file",
            Command::Generate => "generate",
            Command::GenerationFinished(_) => "generation-finished",
            Command::DragNode { .. } => "drag-node",
            Command::Connect { .. } => "connect",
            Command::ToggleOrientation => "toggle-orientation",
            Command::Export(_) => "export",
        }
    }
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = CommandQueue::new();
        queue.push(Command::ToggleOrientation);
        queue.extend([Command::Generate, Command::Export(ExportFormat::Json)]);
        assert_eq!(queue.len(), 3);

        let names: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|c| c.name()).collect();
        assert_eq!(names, vec!["toggle-orientation", "generate", "export"]);
        assert!(queue.is_empty());
    }
}
