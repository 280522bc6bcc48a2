//! Export Pipeline
//!
//! Four independent conversions of the diagram currently on the canvas:
//! - JSON: the graph itself, the only lossless format
//! - PNG: the render surface rasterized at 2x
//! - SVG: the surface markup embedded in a fixed 1200x800 foreignObject
//! - PDF: the PNG raster placed on a single page of the same pixel size
//!
//! Every export reads an immutable snapshot and never touches the graph.

pub mod json;
pub mod pdf;
pub mod raster;
pub mod svg;

use eframe::egui::Color32;
use std::path::{Path, PathBuf};

use crate::config::ExportConfig;
use crate::error::Result;
use crate::flowchart::theme::parse_css_color;
use crate::flowchart::{FlowchartCanvas, Graph, RenderSurface};

/// Fixed raster scale for PNG and PDF
pub const RASTER_SCALE: f32 = 2.0;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    /// Menu order
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Png,
            ExportFormat::Svg,
            ExportFormat::Pdf,
            ExportFormat::Json,
        ]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Fixed artifact name, e.g. "flowchart.png"
    pub fn file_name(&self) -> String {
        format!("flowchart.{}", self.extension())
    }

    pub fn menu_label(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Export as JSON",
            ExportFormat::Png => "Export as PNG",
            ExportFormat::Svg => "Export as SVG",
            ExportFormat::Pdf => "Export as PDF",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// Writes export artifacts into an output directory
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    background: Color32,
}

impl Exporter {
    pub fn new(config: &ExportConfig) -> Self {
        let background = parse_css_color(&config.background).unwrap_or_else(|| {
            log::warn!(
                "Unrecognized export background {:?}, using white",
                config.background
            );
            Color32::WHITE
        });
        Self {
            output_dir: config.output_dir.clone(),
            background,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Encode `graph` as `format`. `capture` is only called by the formats
    /// that need a rendered surface.
    pub fn encode(
        &self,
        format: ExportFormat,
        graph: &Graph,
        capture: impl FnOnce() -> Result<RenderSurface>,
    ) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Json => json::encode(graph),
            ExportFormat::Png => raster::render_png(&capture()?, self.background, RASTER_SCALE),
            ExportFormat::Svg => Ok(svg::wrap_markup(&capture()?).into_bytes()),
            ExportFormat::Pdf => {
                let png = raster::render_png(&capture()?, self.background, RASTER_SCALE)?;
                pdf::encode_png(&png)
            }
        }
    }

    /// Encode and write `flowchart.<ext>` into the output directory
    pub fn write(
        &self,
        format: ExportFormat,
        graph: &Graph,
        capture: impl FnOnce() -> Result<RenderSurface>,
    ) -> Result<PathBuf> {
        let bytes = self.encode(format, graph, capture)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format.file_name());
        std::fs::write(&path, &bytes)?;
        log::info!("Exported {} ({} bytes) to {:?}", format.file_name(), bytes.len(), path);
        Ok(path)
    }

    /// Export what the canvas is currently showing
    pub fn export_canvas(
        &self,
        format: ExportFormat,
        canvas: &FlowchartCanvas,
    ) -> Result<PathBuf> {
        self.write(format, canvas.working_graph(), || canvas.capture_surface())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowchartError;
    use crate::flowchart::{CanvasTheme, FlowNode, Position};

    fn exporter(dir: &Path) -> Exporter {
        Exporter::new(&ExportConfig::default()).with_output_dir(dir)
    }

    #[test]
    fn test_file_names() {
        let names: Vec<_> = ExportFormat::all().iter().map(|f| f.file_name()).collect();
        assert_eq!(
            names,
            vec!["flowchart.png", "flowchart.svg", "flowchart.pdf", "flowchart.json"]
        );
    }

    #[test]
    fn test_json_does_not_need_a_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = exporter(dir.path())
            .write(ExportFormat::Json, &Graph::new(), || {
                Err(FlowchartError::RenderCapture("unused".to_string()))
            })
            .unwrap();
        assert!(path.ends_with("flowchart.json"));
    }

    #[test]
    fn test_visual_formats_fail_without_surface() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(dir.path());
        let theme = CanvasTheme::light();
        let graph = Graph::new();
        for format in [ExportFormat::Png, ExportFormat::Svg, ExportFormat::Pdf] {
            let result = exporter.write(format, &graph, || RenderSurface::capture(&graph, &theme));
            assert!(matches!(result, Err(FlowchartError::RenderCapture(_))));
        }
        assert!(!dir.path().join("flowchart.png").exists());
    }

    #[test]
    fn test_svg_export_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = Graph::new();
        graph
            .nodes
            .push(FlowNode::new("node_0", "Start", Position::new(250.0, 0.0)));
        let theme = CanvasTheme::light();
        let path = exporter(dir.path())
            .write(ExportFormat::Svg, &graph, || RenderSurface::capture(&graph, &theme))
            .unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("Start"));
    }
}
