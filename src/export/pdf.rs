//! PDF export: a single page exactly the size of the raster.
//!
//! One image pixel maps to one PDF unit. The page is landscape when the
//! image is wider than tall, otherwise portrait.

use image::ImageFormat;
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::error::{FlowchartError, Result};

const COMPRESSION_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

impl PageOrientation {
    pub fn for_image(width: u32, height: u32) -> Self {
        if width > height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        }
    }

    /// Page size in PDF units for an image of `width` x `height` pixels
    pub fn page_size(&self, width: u32, height: u32) -> (f32, f32) {
        let long = width.max(height) as f32;
        let short = width.min(height) as f32;
        match self {
            PageOrientation::Landscape => (long, short),
            PageOrientation::Portrait => (short, long),
        }
    }
}

/// Wrap a PNG into a one-page PDF
pub fn encode_png(png: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| FlowchartError::Pdf(format!("failed to decode raster: {}", e)))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(FlowchartError::Pdf("raster has no pixels".to_string()));
    }

    let orientation = PageOrientation::for_image(width, height);
    let (page_width, page_height) = orientation.page_size(width, height);
    log::debug!(
        "PDF page {}x{} ({:?}) for {}x{} raster",
        page_width,
        page_height,
        orientation,
        width,
        height
    );

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let image_name = Name(b"Im1");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(image_name, image_id);
    page.finish();

    let pixels = compress_to_vec_zlib(image.as_raw(), COMPRESSION_LEVEL);
    let mut xobject = pdf.image_xobject(image_id, &pixels);
    xobject.filter(Filter::FlateDecode);
    xobject.width(width as i32);
    xobject.height(height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    xobject.finish();

    // Image space is the unit square; scale it over the whole page
    let mut content = Content::new();
    content.save_state();
    content.transform([page_width, 0.0, 0.0, page_height, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    Ok(pdf.finish())
}
