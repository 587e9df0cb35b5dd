//! Page geometry and the content-scale transform.
//!
//! Layout runs in CSS pixels (96 per inch). The content block is laid out at
//! `page / scale` and then drawn scaled by `scale`, so the visible page stays
//! exactly A4 whatever density the user picks.

use serde::Serialize;

use crate::models::ContentScale;

pub const CSS_PX_PER_INCH: f32 = 96.0;
pub const MM_PER_INCH: f32 = 25.4;

pub fn mm_to_px(mm: f32) -> f32 {
    mm * CSS_PX_PER_INCH / MM_PER_INCH
}

/// Physical page in millimetres, with its CSS-pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn width_px(&self) -> f32 {
        mm_to_px(self.width_mm)
    }

    pub fn height_px(&self) -> f32 {
        mm_to_px(self.height_mm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContentTransform {
    /// Uniform scale applied when painting the laid-out content.
    pub scale: f32,
    /// Width the content is laid out at, before scaling.
    pub layout_width: f32,
    /// Minimum content height before scaling; fills exactly one page.
    pub min_height: f32,
    pub page: PageGeometry,
}

impl ContentTransform {
    pub fn new(scale: ContentScale, page: PageGeometry) -> Self {
        let s = scale.get();
        ContentTransform {
            scale: s,
            layout_width: page.width_px() / s,
            min_height: page.height_px() / s,
            page,
        }
    }

    /// Width of the content as it appears on the page.
    pub fn visible_width(&self) -> f32 {
        self.layout_width * self.scale
    }

    /// Converts a layout-space length to page pixels.
    pub fn to_page(&self, layout_px: f32) -> f32 {
        layout_px * self.scale
    }
}
