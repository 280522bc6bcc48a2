//! PNG rasterization of the render surface

use eframe::egui::Color32;
use resvg::tiny_skia::{Pixmap, Transform};

use crate::error::{FlowchartError, Result};
use crate::flowchart::RenderSurface;

/// Largest RGBA pixmap we are willing to allocate
const MAX_PIXMAP_BYTES: u64 = 512 * 1024 * 1024;

/// Rasterize `surface` over `background`, scaled by `scale`
pub fn render_png(surface: &RenderSurface, background: Color32, scale: f32) -> Result<Vec<u8>> {
    if scale <= 0.0 {
        return Err(FlowchartError::Raster(
            "scale must be greater than zero".to_string(),
        ));
    }

    let svg = surface.to_svg_scene(background);

    let mut options = resvg::usvg::Options::default();
    options.font_family = "Inter".to_string();
    options.fontdb_mut().load_system_fonts();

    let tree = resvg::usvg::Tree::from_str(&svg, &options)
        .map_err(|err| FlowchartError::Raster(format!("failed to parse scene: {err}")))?;

    let size = tree.size().to_int_size();
    let (width, height) = scaled_size(size.width(), size.height(), scale)?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        FlowchartError::Raster(format!("failed to allocate {width}x{height} surface"))
    })?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|err| FlowchartError::Raster(format!("failed to encode PNG: {err}")))
}

fn scaled_size(width: u32, height: u32, scale: f32) -> Result<(u32, u32)> {
    let scaled_width = (width as f32 * scale).ceil();
    let scaled_height = (height as f32 * scale).ceil();

    if !scaled_width.is_finite() || !scaled_height.is_finite() {
        return Err(FlowchartError::Raster(
            "scaled dimensions are not finite".to_string(),
        ));
    }
    if scaled_width < 1.0 || scaled_height < 1.0 {
        return Err(FlowchartError::Raster(
            "scaled dimensions collapsed below 1px".to_string(),
        ));
    }
    if scaled_width > u32::MAX as f32 || scaled_height > u32::MAX as f32 {
        return Err(FlowchartError::Raster(
            "scaled dimensions exceed supported limits".to_string(),
        ));
    }

    let (width, height) = (scaled_width as u32, scaled_height as u32);
    if width as u64 * height as u64 * 4 > MAX_PIXMAP_BYTES {
        return Err(FlowchartError::Raster(format!(
            "{width}x{height} image exceeds the {} MiB raster limit",
            MAX_PIXMAP_BYTES / (1024 * 1024)
        )));
    }

    Ok((width, height))
}
