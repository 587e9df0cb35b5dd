//! Page fill analysis: how much of the fixed A4 page the laid-out content uses.
//!
//! The export pipeline uses the verdict to warn when the single-page `clip`
//! policy drops content, and to count pages under `paginate`.

use serde::Serialize;

use crate::layout::flow::LaidOutPage;

/// Tolerance for rounding noise before content counts as overflowing.
const OVERFLOW_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFillVerdict {
    /// Content fits on one page.
    Fits,
    /// Content runs past the bottom of the first page.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFillAnalysis {
    /// Content height as it appears on the page (after scaling), in CSS px.
    pub content_height_px: f32,
    pub page_height_px: f32,
    /// `content / page`; above 1.0 means overflow.
    pub fill_ratio: f32,
    pub whitespace_fraction: f32,
    pub overflow_fraction: f32,
    /// Pages needed to show everything.
    pub pages_needed: usize,
    pub verdict: PageFillVerdict,
}

pub fn analyze_page_fill(page: &LaidOutPage) -> PageFillAnalysis {
    let transform = &page.transform;
    let content_height_px = transform.to_page(page.content_height);
    let page_height_px = transform.page.height_px();
    let fill_ratio = content_height_px / page_height_px;

    let whitespace_fraction = (1.0_f32 - fill_ratio).max(0.0);
    let overflow_fraction = (fill_ratio - 1.0_f32).max(0.0);

    let overflows = content_height_px > page_height_px + OVERFLOW_EPSILON;
    let pages_needed = if overflows {
        (content_height_px / page_height_px).ceil() as usize
    } else {
        1
    };

    PageFillAnalysis {
        content_height_px,
        page_height_px,
        fill_ratio,
        whitespace_fraction,
        overflow_fraction,
        pages_needed,
        verdict: if overflows {
            PageFillVerdict::Overflow
        } else {
            PageFillVerdict::Fits
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::flow::layout;
    use crate::layout::scale::{ContentTransform, PageGeometry};
    use crate::models::defaults::default_document;
    use crate::models::{ItemField, SectionId, Template};
    use crate::projection::project;

    fn analysis_for(doc: &crate::models::ResumeDocument) -> PageFillAnalysis {
        let transform = ContentTransform::new(doc.content_scale, PageGeometry::A4);
        analyze_page_fill(&layout(&project(doc), &transform))
    }

    #[test]
    fn test_default_document_fits_one_page() {
        for template in [Template::Modern, Template::Classic, Template::Minimal] {
            let analysis = analysis_for(&default_document(template));
            assert_eq!(analysis.verdict, PageFillVerdict::Fits, "{template}");
            assert_eq!(analysis.pages_needed, 1);
            assert_eq!(analysis.overflow_fraction, 0.0);
            assert!(analysis.whitespace_fraction > 0.0);
        }
    }

    #[test]
    fn test_long_content_overflows_into_more_pages() {
        let mut doc = default_document(Template::Classic);
        let sid = SectionId::new("edu");
        for _ in 0..40 {
            let (next, item) = doc.add_item(&sid);
            let item = item.unwrap();
            doc = next.update_item(
                &sid,
                &item,
                ItemField::Description,
                "Participação em projetos escolares com apresentações e relatórios.",
            );
        }
        let analysis = analysis_for(&doc);
        assert_eq!(analysis.verdict, PageFillVerdict::Overflow);
        assert!(analysis.pages_needed >= 2);
        assert!(analysis.fill_ratio > 1.0);
    }
}
