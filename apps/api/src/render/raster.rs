//! Rasterization of a mounted frame into an RGB image.
//!
//! [`SurfaceRasterizer`] is the seam the export pipeline talks to; the default
//! [`SkiaRasterizer`] paints the frame's paint operations with tiny-skia and
//! draws glyph outlines straight from TrueType files via ttf-parser.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tiny_skia::{
    Color as SkiaColor, FillRule, FilterQuality, IntSize, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect as SkiaRect, Stroke, Transform,
};
use tracing::{debug, info, warn};
use ttf_parser::{Face, OutlineBuilder};

use crate::layout::flow::{PaintOp, Rect};
use crate::layout::FontFamily;
use crate::models::Color;
use crate::projection::TextStyle;
use crate::render::images::{DecodedPhoto, PhotoSet};
use crate::render::surface::RenderedFrame;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("raster task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Opaque 8-bit RGB pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Raster {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    /// Copies rows `top..top + rows`, padding with white past the bottom edge.
    pub fn rows(&self, top: u32, rows: u32) -> Raster {
        let stride = self.width as usize * 3;
        let mut rgb = vec![0xff; stride * rows as usize];
        let start = (top.min(self.height)) as usize * stride;
        let end = ((top + rows).min(self.height)) as usize * stride;
        rgb[..end - start].copy_from_slice(&self.rgb[start..end]);
        Raster {
            width: self.width,
            height: rows,
            rgb,
        }
    }
}

#[async_trait]
pub trait SurfaceRasterizer: Send + Sync {
    /// Captures `frame` at `upscale` device pixels per page pixel.
    async fn rasterize(
        &self,
        frame: Arc<RenderedFrame>,
        photos: Arc<PhotoSet>,
        upscale: f32,
    ) -> Result<Raster, RasterError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

const SANS_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SERIF_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/TTF/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/Library/Fonts/Times New Roman.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

/// TrueType data for each family. A missing family falls back to the other;
/// with neither, text is skipped.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    sans: Option<Arc<Vec<u8>>>,
    serif: Option<Arc<Vec<u8>>>,
}

impl FontSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the configured files, probing common system locations for any
    /// family that was not configured.
    pub fn load(sans: Option<&FsPath>, serif: Option<&FsPath>) -> Self {
        let sans = load_family("sans", sans, SANS_CANDIDATES);
        let serif = load_family("serif", serif, SERIF_CANDIDATES);
        if sans.is_none() && serif.is_none() {
            warn!("No usable TrueType font found; exported text will be missing");
        }
        FontSet { sans, serif }
    }

    fn data(&self, family: FontFamily) -> Option<&Arc<Vec<u8>>> {
        match family {
            FontFamily::Sans => self.sans.as_ref().or(self.serif.as_ref()),
            FontFamily::Serif => self.serif.as_ref().or(self.sans.as_ref()),
        }
    }
}

fn load_family(name: &str, configured: Option<&FsPath>, candidates: &[&str]) -> Option<Arc<Vec<u8>>> {
    let paths: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => candidates.iter().map(PathBuf::from).collect(),
    };
    for path in paths {
        let Ok(data) = std::fs::read(&path) else {
            continue;
        };
        match Face::parse(&data, 0) {
            Ok(_) => {
                info!(family = name, path = %path.display(), "Font loaded");
                return Some(Arc::new(data));
            }
            Err(e) => warn!(family = name, path = %path.display(), "Not a usable font: {e}"),
        }
    }
    if configured.is_some() {
        warn!(family = name, "Configured font could not be loaded");
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// tiny-skia rasterizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SkiaRasterizer {
    fonts: Arc<FontSet>,
}

impl SkiaRasterizer {
    pub fn new(fonts: FontSet) -> Self {
        SkiaRasterizer {
            fonts: Arc::new(fonts),
        }
    }
}

#[async_trait]
impl SurfaceRasterizer for SkiaRasterizer {
    async fn rasterize(
        &self,
        frame: Arc<RenderedFrame>,
        photos: Arc<PhotoSet>,
        upscale: f32,
    ) -> Result<Raster, RasterError> {
        let fonts = self.fonts.clone();
        tokio::task::spawn_blocking(move || paint_frame(&frame, &photos, &fonts, upscale)).await?
    }
}

struct PathConverter(PathBuilder);

impl OutlineBuilder for PathConverter {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

fn to_skia_color(color: Color) -> SkiaColor {
    SkiaColor::from_rgba8(color.r, color.g, color.b, 0xff)
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

/// Paints the frame synchronously. Device pixels per layout pixel are
/// `content scale × upscale`; the canvas is one page wide and at least one
/// page tall.
pub fn paint_frame(
    frame: &RenderedFrame,
    photos: &PhotoSet,
    fonts: &FontSet,
    upscale: f32,
) -> Result<Raster, RasterError> {
    let page = &frame.page;
    let device_scale = page.transform.scale * upscale;
    let width = (page.transform.visible_width() * upscale).round().max(1.0) as u32;
    let height = (page.transform.to_page(page.height) * upscale).round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::Canvas { width, height })?;
    pixmap.fill(SkiaColor::WHITE);

    let base = Transform::from_scale(device_scale, device_scale);
    let mut skipped_text = 0usize;

    for op in &page.ops {
        match op {
            PaintOp::FillRect {
                rect,
                color,
                radius,
            } => {
                if let Some(path) = rect_path(rect, *radius) {
                    pixmap.fill_path(&path, &solid(*color), FillRule::Winding, base, None);
                }
            }
            PaintOp::Circle {
                cx,
                cy,
                radius,
                color,
            } => {
                if let Some(path) = PathBuilder::from_circle(*cx, *cy, *radius) {
                    pixmap.fill_path(&path, &solid(*color), FillRule::Winding, base, None);
                }
            }
            PaintOp::Text {
                x,
                baseline,
                text,
                style,
                ..
            } => match fonts.data(style.family) {
                Some(data) => draw_text(&mut pixmap, data, text, *x, *baseline, style, base),
                None => skipped_text += 1,
            },
            PaintOp::Image {
                rect,
                photo,
                border,
            } => {
                if let Some(decoded) = photos.get(photo) {
                    draw_photo(&mut pixmap, decoded, rect, base);
                }
                if let Some((color, width)) = border {
                    stroke_circle(&mut pixmap, rect, *color, *width, base);
                }
            }
        }
    }

    if skipped_text > 0 {
        warn!(lines = skipped_text, "Text skipped: no font available");
    }
    debug!(width, height, ops = page.ops.len(), "Frame rasterized");

    let rgb = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    Ok(Raster { width, height, rgb })
}

fn rect_path(rect: &Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0);
    if r <= 0.0 {
        return SkiaRect::from_xywh(rect.x, rect.y, rect.w, rect.h).map(PathBuilder::from_rect);
    }
    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
    let mut pb = PathBuilder::new();
    pb.move_to(x0 + r, y0);
    pb.line_to(x1 - r, y0);
    pb.quad_to(x1, y0, x1, y0 + r);
    pb.line_to(x1, y1 - r);
    pb.quad_to(x1, y1, x1 - r, y1);
    pb.line_to(x0 + r, y1);
    pb.quad_to(x0, y1, x0, y1 - r);
    pb.line_to(x0, y0 + r);
    pb.quad_to(x0, y0, x0 + r, y0);
    pb.close();
    pb.finish()
}

fn draw_text(
    pixmap: &mut Pixmap,
    data: &[u8],
    text: &str,
    x: f32,
    baseline: f32,
    style: &TextStyle,
    base: Transform,
) {
    let Ok(face) = Face::parse(data, 0) else {
        return;
    };
    let scale = style.size / face.units_per_em() as f32;
    // Faux italic: shear glyphs to the right as they rise.
    let shear = if style.italic { 0.2 * scale } else { 0.0 };

    let mut text_path = PathBuilder::new();
    let mut pen = x;
    for c in text.chars() {
        let Some(glyph) = face.glyph_index(c) else {
            pen += style.size * 0.5;
            continue;
        };
        let mut converter = PathConverter(PathBuilder::new());
        if face.outline_glyph(glyph, &mut converter).is_some() {
            let glyph_transform = Transform::from_row(scale, 0.0, shear, -scale, pen, baseline);
            if let Some(path) = converter.0.finish().and_then(|p| p.transform(glyph_transform)) {
                text_path.push_path(&path);
            }
        }
        pen += face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
    }

    let Some(path) = text_path.finish() else {
        return;
    };
    let paint = solid(style.color);
    pixmap.fill_path(&path, &paint, FillRule::Winding, base, None);
    if style.bold {
        // Faux bold: thicken the outline.
        let stroke = Stroke {
            width: style.size * 0.04,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, base, None);
    }
}

fn draw_photo(pixmap: &mut Pixmap, photo: &DecodedPhoto, rect: &Rect, base: Transform) {
    let Some(size) = IntSize::from_wh(photo.width, photo.height) else {
        return;
    };
    let Some(image) = Pixmap::from_vec(premultiply(&photo.rgba), size) else {
        return;
    };
    let Some(circle) = PathBuilder::from_circle(
        rect.x + rect.w / 2.0,
        rect.y + rect.h / 2.0,
        rect.w.min(rect.h) / 2.0,
    ) else {
        return;
    };
    let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
        return;
    };
    mask.fill_path(&circle, FillRule::Winding, true, base);

    // Cover the box, cropping the longer side.
    let (iw, ih) = (photo.width as f32, photo.height as f32);
    let fit = (rect.w / iw).max(rect.h / ih);
    let placement = Transform::from_row(
        fit,
        0.0,
        0.0,
        fit,
        rect.x + (rect.w - iw * fit) / 2.0,
        rect.y + (rect.h - ih * fit) / 2.0,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, base.pre_concat(placement), Some(&mask));
}

fn stroke_circle(pixmap: &mut Pixmap, rect: &Rect, color: Color, width: f32, base: Transform) {
    let radius = rect.w.min(rect.h) / 2.0 - width / 2.0;
    if radius <= 0.0 {
        return;
    }
    if let Some(path) =
        PathBuilder::from_circle(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0, radius)
    {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(color), &stroke, base, None);
    }
}

/// tiny-skia pixmaps hold premultiplied alpha.
fn premultiply(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as u16;
            let mul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
            [mul(px[0]), mul(px[1]), mul(px[2]), px[3]]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::default_document;
    use crate::models::Template;
    use crate::render::surface::PREVIEW_HANDLE;
    use crate::session::{EditorSession, ViewMode};

    fn frame(template: Template) -> RenderedFrame {
        let session = EditorSession::new(default_document(template), ViewMode::Preview);
        RenderedFrame::render(PREVIEW_HANDLE, &session.snapshot())
    }

    #[test]
    fn test_canvas_is_one_page_at_upscale() {
        let frame = frame(Template::Classic);
        let raster = paint_frame(&frame, &PhotoSet::new(), &FontSet::empty(), 2.0).unwrap();
        let page = frame.page.transform.page;
        assert_eq!(raster.width, (page.width_px() * 2.0).round() as u32);
        assert_eq!(raster.height, (page.height_px() * 2.0).round() as u32);
        assert_eq!(raster.rgb.len(), (raster.width * raster.height * 3) as usize);
    }

    #[test]
    fn test_backgrounds_are_painted() {
        let modern = paint_frame(&frame(Template::Modern), &PhotoSet::new(), &FontSet::empty(), 1.0)
            .unwrap();
        assert_eq!(modern.pixel(10, 10), Some([0x11, 0x18, 0x27]));

        let minimal = paint_frame(&frame(Template::Minimal), &PhotoSet::new(), &FontSet::empty(), 1.0)
            .unwrap();
        assert_eq!(minimal.pixel(10, minimal.height - 10), Some([0x1f, 0x29, 0x37]));
    }

    #[test]
    fn test_photo_is_drawn_inside_its_circle() {
        let frame = frame(Template::Modern);
        let (rect, photo) = frame
            .page
            .ops
            .iter()
            .find_map(|op| match op {
                PaintOp::Image { rect, photo, .. } => Some((*rect, photo.clone())),
                _ => None,
            })
            .unwrap();
        let mut photos = PhotoSet::new();
        photos.insert(
            photo,
            DecodedPhoto {
                width: 2,
                height: 2,
                rgba: [255, 0, 0, 255].repeat(4),
            },
        );
        let raster = paint_frame(&frame, &photos, &FontSet::empty(), 1.0).unwrap();
        let center = raster
            .pixel((rect.x + rect.w / 2.0) as u32, (rect.y + rect.h / 2.0) as u32)
            .unwrap();
        assert_eq!(center, [255, 0, 0]);
    }

    #[test]
    fn test_missing_photo_leaves_circle_unfilled() {
        let frame = frame(Template::Modern);
        let rect = frame
            .page
            .ops
            .iter()
            .find_map(|op| match op {
                PaintOp::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        let raster = paint_frame(&frame, &PhotoSet::new(), &FontSet::empty(), 1.0).unwrap();
        let center = raster
            .pixel((rect.x + rect.w / 2.0) as u32, (rect.y + rect.h / 2.0) as u32)
            .unwrap();
        assert_eq!(center, [0x11, 0x18, 0x27]);
    }

    #[test]
    fn test_rows_pads_past_bottom_with_white() {
        let raster = Raster {
            width: 1,
            height: 2,
            rgb: vec![0, 0, 0, 1, 1, 1],
        };
        let slice = raster.rows(1, 3);
        assert_eq!(slice.height, 3);
        assert_eq!(slice.rgb, vec![1, 1, 1, 255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_premultiply_scales_by_alpha() {
        assert_eq!(premultiply(&[200, 100, 50, 0]), vec![0, 0, 0, 0]);
        assert_eq!(premultiply(&[200, 100, 50, 255]), vec![200, 100, 50, 255]);
    }
}
