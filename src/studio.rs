//! Studio: owns the graph store, input surface, canvas and exporter, and
//! applies queued commands to them on the UI thread.

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{GenerationClient, GenerationService};
use crate::commands::{Command, CommandQueue};
use crate::config::StudioConfig;
use crate::error::{FlowchartError, Result};
use crate::export::{ExportFormat, Exporter};
use crate::flowchart::{CanvasTheme, FlowchartCanvas, GraphStore};
use crate::input::InputSurface;

/// Something the user should be told about after a batch of commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking alert, e.g. a failed generation
    Alert(String),
    /// Transient status line
    Status(String),
    /// An export artifact was written
    Exported(PathBuf),
}

pub struct Studio {
    store: GraphStore,
    input: InputSurface,
    canvas: FlowchartCanvas,
    exporter: Exporter,
    queue: CommandQueue,
    service: Arc<dyn GenerationService>,
}

impl Studio {
    pub fn new(
        service: Arc<dyn GenerationService>,
        exporter: Exporter,
        theme: CanvasTheme,
    ) -> Self {
        Self {
            store: GraphStore::new(),
            input: InputSurface::new(),
            canvas: FlowchartCanvas::new(theme),
            exporter,
            queue: CommandQueue::new(),
            service,
        }
    }

    /// Build a studio talking to the configured HTTP service
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        let client = GenerationClient::new(&config.api)?;
        log::info!("Generation service at {}", client.base_url());

        let theme = if config.canvas.dark {
            CanvasTheme::dark()
        } else {
            CanvasTheme::light()
        };
        let mut studio = Self::new(Arc::new(client), Exporter::new(&config.export), theme);
        studio.canvas.show_grid = config.canvas.show_grid;
        studio.canvas.show_minimap = config.canvas.show_minimap;
        Ok(studio)
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputSurface {
        &mut self.input
    }

    pub fn canvas(&self) -> &FlowchartCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut FlowchartCanvas {
        &mut self.canvas
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn set_exporter(&mut self, exporter: Exporter) {
        self.exporter = exporter;
    }

    pub fn submit(&mut self, command: Command) {
        self.queue.push(command);
    }

    pub fn submit_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.queue.extend(commands);
    }

    /// Pick up a finished generation call, if any, without blocking
    pub fn poll(&mut self) {
        if let Some(result) = self.input.poll() {
            self.queue.push(Command::GenerationFinished(result));
        }
    }

    /// Block until the outstanding generation call finishes
    pub fn wait(&mut self) {
        if let Some(result) = self.input.wait() {
            self.queue.push(Command::GenerationFinished(result));
        }
    }

    /// Apply every queued command in order
    pub fn process(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(command) = self.queue.pop() {
            log::trace!("Applying {}", command.name());
            self.apply(command, &mut notices);
        }
        self.canvas.sync_from(&self.store);
        notices
    }

    fn apply(&mut self, command: Command, notices: &mut Vec<Notice>) {
        match command {
            Command::SelectMode(mode) => self.input.select_mode(mode),
            Command::SelectFile(path) => self.input.select_file(path),
            Command::Generate => match self.input.start(Arc::clone(&self.service)) {
                Ok(true) => notices.push(Notice::Status("Generating...".to_string())),
                Ok(false) => {}
                Err(e) if e.is_silent() => log::debug!("{}", e),
                Err(e) => notices.push(alert(&e)),
            },
            Command::GenerationFinished(Ok(graph)) => {
                let summary = format!(
                    "Generated {} nodes, {} edges",
                    graph.nodes.len(),
                    graph.edges.len()
                );
                self.store.replace(graph);
                self.canvas.sync_from(&self.store);
                notices.push(Notice::Status(summary));
            }
            Command::GenerationFinished(Err(e)) => {
                log::warn!("Generation failed: {}", e);
                notices.push(alert(&e));
            }
            Command::DragNode { id, delta } => {
                if self.canvas.drag_node(&id, delta) {
                    self.store.merge_local_edit(self.canvas.working_graph());
                }
            }
            Command::Connect { source, target } => {
                if let Some(id) = self.canvas.connect(&source, &target) {
                    log::debug!("Connected {} -> {} as {}", source, target, id);
                    self.store.merge_local_edit(self.canvas.working_graph());
                }
            }
            Command::ToggleOrientation => {
                let orientation = self.canvas.toggle_orientation();
                self.store.merge_local_edit(self.canvas.working_graph());
                notices.push(Notice::Status(format!("Layout: {}", orientation.label())));
            }
            Command::Export(format) => notices.push(self.export(format)),
        }
    }

    fn export(&self, format: ExportFormat) -> Notice {
        match self.exporter.export_canvas(format, &self.canvas) {
            Ok(path) => Notice::Exported(path),
            Err(FlowchartError::RenderCapture(reason)) => {
                log::warn!("Skipping {} export: {}", format.extension(), reason);
                Notice::Status(format!("Nothing to export: {}", reason))
            }
            Err(e) => {
                log::error!("{} export failed: {}", format.extension(), e);
                alert(&e)
            }
        }
    }
}

fn alert(error: &FlowchartError) -> Notice {
    Notice::Alert(format!("Error: {}", error))
}
