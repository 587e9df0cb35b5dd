//! PDF encoding of rasterized pages.
//!
//! Each page is a full-bleed A4 page holding one Flate-compressed RGB image
//! XObject. Page images are cut from the captured raster according to the
//! overflow policy.

use std::io::Write;
use std::str::FromStr;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::PageGeometry;
use crate::render::raster::Raster;

const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("nothing to encode")]
    NoPages,

    #[error("compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

/// What happens to content taller than one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// One page; anything below it is cut off.
    Clip,
    /// As many consecutive pages as the content needs.
    Paginate,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clip" => Ok(OverflowPolicy::Clip),
            "paginate" => Ok(OverflowPolicy::Paginate),
            other => Err(format!("unknown overflow policy '{other}' (expected clip or paginate)")),
        }
    }
}

/// Cuts the raster into page images. Page width is the raster width; page
/// height follows the page's aspect ratio.
pub fn slice_pages(raster: &Raster, page: PageGeometry, policy: OverflowPolicy) -> Vec<Raster> {
    let page_rows = ((raster.width as f32) * page.height_mm / page.width_mm)
        .round()
        .max(1.0) as u32;
    let count = match policy {
        OverflowPolicy::Clip => 1,
        OverflowPolicy::Paginate => raster.height.div_ceil(page_rows).max(1),
    };
    (0..count)
        .map(|i| raster.rows(i * page_rows, page_rows))
        .collect()
}

fn compress(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Encodes page images into a PDF document.
pub fn encode_pdf(pages: &[Raster], page: PageGeometry) -> Result<Vec<u8>, EncodeError> {
    if pages.is_empty() {
        return Err(EncodeError::NoPages);
    }
    let width_pt = page.width_mm * PT_PER_MM;
    let height_pt = page.height_mm * PT_PER_MM;

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let ids: Vec<(Ref, Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc(), alloc())).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(ids.iter().map(|(page_id, _, _)| *page_id))
        .count(pages.len() as i32);

    let image_name = Name(b"Im1");
    for (raster, (page_id, content_id, image_id)) in pages.iter().zip(&ids) {
        let compressed = compress(&raster.rgb)?;
        let mut image = pdf.image_xobject(*image_id, &compressed);
        image.filter(Filter::FlateDecode);
        image.width(raster.width as i32);
        image.height(raster.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([width_pt, 0.0, 0.0, height_pt, 0.0, 0.0]);
        content.x_object(image_name);
        content.restore_state();
        let stream = compress(&content.finish())?;
        pdf.stream(*content_id, &stream).filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(*page_id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
            .parent(pages_id)
            .contents(*content_id);
        pdf_page.resources().x_objects().pair(image_name, *image_id);
        pdf_page.finish();
    }

    Ok(pdf.finish())
}
