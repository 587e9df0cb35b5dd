//! Box-model flow: turns a render tree into absolute paint operations.
//!
//! Coordinates are CSS pixels in layout space (before the content transform is
//! applied). The rasterizer multiplies everything by `scale × upscale`.
//!
//! Rules:
//! - Columns stack children with `gap`; fixed-size leaves (photo, dot) are
//!   placed by the column's `align`, everything else takes the full width.
//! - Splits divide the width by weight, then lay every child out a second time
//!   stretched to the tallest one so side-by-side backgrounds line up.
//! - Grids use equal columns; wraps flow children at their natural width.
//! - Backgrounds are emitted before the content they sit under.

use serde::Serialize;

use crate::layout::font_metrics::get_metrics;
use crate::layout::scale::ContentTransform;
use crate::models::{Color, PhotoRef};
use crate::projection::tree::{Align, BoxStyle, NodeKind, RenderNode, RenderTree, TextNode};
use crate::projection::TextStyle;

/// Baseline position inside the em box, as a fraction of the font size.
const ASCENT: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PaintOp {
    FillRect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    /// One wrapped line of text, already case-transformed.
    Text {
        x: f32,
        baseline: f32,
        width: f32,
        text: String,
        style: TextStyle,
    },
    /// Circular photo clipped to `rect`.
    Image {
        rect: Rect,
        photo: PhotoRef,
        border: Option<(Color, f32)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutPage {
    pub transform: ContentTransform,
    /// Layout-space width, equal to `transform.layout_width`.
    pub width: f32,
    /// Layout-space height; never below `transform.min_height`.
    pub height: f32,
    /// Natural height of the content, which may exceed one page.
    pub content_height: f32,
    pub ops: Vec<PaintOp>,
}

impl LaidOutPage {
    pub fn photos(&self) -> impl Iterator<Item = &PhotoRef> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Image { photo, .. } => Some(photo),
            _ => None,
        })
    }
}

pub fn layout(tree: &RenderTree, transform: &ContentTransform) -> LaidOutPage {
    let width = transform.layout_width;

    let mut scratch = Vec::new();
    let content_height = place(&tree.root, 0.0, 0.0, width, 0.0, &mut scratch);

    let mut ops = Vec::with_capacity(scratch.len());
    let height = place(
        &tree.root,
        0.0,
        0.0,
        width,
        transform.min_height,
        &mut ops,
    );

    LaidOutPage {
        transform: *transform,
        width,
        height,
        content_height,
        ops,
    }
}

/// Lays `node` out at (`x`, `y`) with the given outer width, returning its
/// outer height (at least `min_height`).
fn place(
    node: &RenderNode,
    x: f32,
    y: f32,
    width: f32,
    min_height: f32,
    ops: &mut Vec<PaintOp>,
) -> f32 {
    let style = &node.style;
    let inner_x = x + style.padding.left;
    let inner_y = y + style.padding.top;
    let inner_w = (width - style.padding.horizontal()).max(0.0);
    let inner_min = (min_height - style.padding.vertical()).max(0.0);

    let mut inner = Vec::new();
    let content_h = match &node.kind {
        NodeKind::Column { children } => {
            place_column(children, style, inner_x, inner_y, inner_w, &mut inner)
        }
        NodeKind::Split { weights, children } => place_split(
            weights, children, style, inner_x, inner_y, inner_w, inner_min, &mut inner,
        ),
        NodeKind::Grid { columns, children } => {
            place_grid(*columns, children, style, inner_x, inner_y, inner_w, &mut inner)
        }
        NodeKind::Wrap { children } => {
            place_wrap(children, style, inner_x, inner_y, inner_w, &mut inner)
        }
        NodeKind::Text(text) => place_text(text, inner_x, inner_y, inner_w, &mut inner),
        NodeKind::Photo(photo) => {
            inner.push(PaintOp::Image {
                rect: Rect {
                    x: inner_x,
                    y: inner_y,
                    w: photo.size,
                    h: photo.size,
                },
                photo: photo.photo.clone(),
                border: photo.border,
            });
            photo.size
        }
        NodeKind::Rule(rule) => {
            inner.push(PaintOp::FillRect {
                rect: Rect {
                    x: inner_x,
                    y: inner_y,
                    w: inner_w,
                    h: rule.thickness,
                },
                color: rule.color,
                radius: 0.0,
            });
            rule.thickness
        }
        NodeKind::Dot { color, size } => {
            // Sits roughly on the x-height of the neighbouring first line.
            let radius = size / 2.0;
            inner.push(PaintOp::Circle {
                cx: inner_x + radius,
                cy: inner_y + size + radius,
                radius,
                color: *color,
            });
            size * 2.0
        }
    };

    let height = (content_h + style.padding.vertical()).max(min_height);
    if let Some(background) = style.background {
        ops.push(PaintOp::FillRect {
            rect: Rect {
                x,
                y,
                w: width,
                h: height,
            },
            color: background,
            radius: style.radius,
        });
    }
    ops.extend(inner);
    height
}

fn is_fixed_size(node: &RenderNode) -> bool {
    matches!(node.kind, NodeKind::Photo(_) | NodeKind::Dot { .. })
}

fn aligned_x(x: f32, available: f32, used: f32, align: Align) -> f32 {
    match align {
        Align::Start => x,
        Align::Center => x + ((available - used) / 2.0).max(0.0),
        Align::End => x + (available - used).max(0.0),
    }
}

fn place_column(
    children: &[RenderNode],
    style: &BoxStyle,
    x: f32,
    y: f32,
    width: f32,
    ops: &mut Vec<PaintOp>,
) -> f32 {
    let mut cursor = y;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            cursor += style.gap;
        }
        let (cx, cw) = if is_fixed_size(child) {
            let natural = natural_width(child).min(width);
            (aligned_x(x, width, natural, style.align), natural)
        } else {
            (x, width)
        };
        cursor += place(child, cx, cursor, cw, 0.0, ops);
    }
    cursor - y
}

#[allow(clippy::too_many_arguments)]
fn place_split(
    weights: &[f32],
    children: &[RenderNode],
    style: &BoxStyle,
    x: f32,
    y: f32,
    width: f32,
    min_height: f32,
    ops: &mut Vec<PaintOp>,
) -> f32 {
    if children.is_empty() {
        return 0.0;
    }
    let gaps = style.gap * (children.len() - 1) as f32;
    let available = (width - gaps).max(0.0);
    let total: f32 = weights.iter().sum();
    let widths: Vec<f32> = weights
        .iter()
        .map(|w| {
            if total > 0.0 {
                available * w / total
            } else {
                available / children.len() as f32
            }
        })
        .collect();

    // First pass measures; the second stretches every child to the tallest.
    let mut row_height = min_height;
    let mut scratch = Vec::new();
    let mut cx = x;
    for (child, w) in children.iter().zip(&widths) {
        row_height = row_height.max(place(child, cx, y, *w, 0.0, &mut scratch));
        cx += w + style.gap;
    }

    let mut cx = x;
    for (child, w) in children.iter().zip(&widths) {
        place(child, cx, y, *w, row_height, ops);
        cx += w + style.gap;
    }
    row_height
}

fn place_grid(
    columns: usize,
    children: &[RenderNode],
    style: &BoxStyle,
    x: f32,
    y: f32,
    width: f32,
    ops: &mut Vec<PaintOp>,
) -> f32 {
    let columns = columns.max(1);
    let cell_w = ((width - style.gap * (columns - 1) as f32) / columns as f32).max(0.0);
    let mut cursor = y;
    for (row, cells) in children.chunks(columns).enumerate() {
        if row > 0 {
            cursor += style.gap;
        }
        let mut row_height = 0.0_f32;
        for (col, cell) in cells.iter().enumerate() {
            let cx = x + col as f32 * (cell_w + style.gap);
            row_height = row_height.max(place(cell, cx, cursor, cell_w, 0.0, ops));
        }
        cursor += row_height;
    }
    cursor - y
}

fn place_wrap(
    children: &[RenderNode],
    style: &BoxStyle,
    x: f32,
    y: f32,
    width: f32,
    ops: &mut Vec<PaintOp>,
) -> f32 {
    // Break children into rows by natural width.
    let mut rows: Vec<Vec<(&RenderNode, f32)>> = Vec::new();
    let mut current: Vec<(&RenderNode, f32)> = Vec::new();
    let mut used = 0.0_f32;
    for child in children {
        let w = natural_width(child).min(width);
        let needed = if current.is_empty() { w } else { used + style.gap + w };
        if !current.is_empty() && needed > width {
            rows.push(std::mem::take(&mut current));
            used = w;
        } else {
            used = needed;
        }
        current.push((child, w));
    }
    if !current.is_empty() {
        rows.push(current);
    }

    let mut cursor = y;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            cursor += style.gap;
        }
        let row_w: f32 =
            row.iter().map(|(_, w)| w).sum::<f32>() + style.gap * (row.len() - 1) as f32;
        let mut cx = aligned_x(x, width, row_w, style.align);
        let mut row_height = 0.0_f32;
        for (child, w) in row {
            row_height = row_height.max(place(child, cx, cursor, *w, 0.0, ops));
            cx += w + style.gap;
        }
        cursor += row_height;
    }
    cursor - y
}

fn place_text(text: &TextNode, x: f32, y: f32, width: f32, ops: &mut Vec<PaintOp>) -> f32 {
    let style = &text.style;
    let metrics = get_metrics(style.family);
    let display = text.display_text();
    let lines = metrics.wrap_lines(&display, style.size, style.bold, width);
    let line_h = style.size * style.line_height;
    let baseline_offset = (line_h - style.size) / 2.0 + style.size * ASCENT;

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_w = metrics.measure_px(line, style.size, style.bold);
        ops.push(PaintOp::Text {
            x: aligned_x(x, width, line_w, style.align),
            baseline: y + i as f32 * line_h + baseline_offset,
            width: line_w,
            text: line.clone(),
            style: style.clone(),
        });
    }
    // An empty field still occupies one line.
    lines.len().max(1) as f32 * line_h
}

/// Width a node wants when nothing constrains it.
fn natural_width(node: &RenderNode) -> f32 {
    let padding = node.style.padding.horizontal();
    let gap = node.style.gap;
    let content = match &node.kind {
        NodeKind::Text(text) => {
            let metrics = get_metrics(text.style.family);
            text.display_text()
                .split('\n')
                .map(|line| metrics.measure_px(line.trim(), text.style.size, text.style.bold))
                .fold(0.0_f32, f32::max)
        }
        NodeKind::Photo(photo) => photo.size,
        NodeKind::Dot { size, .. } => *size,
        NodeKind::Rule(_) => 0.0,
        NodeKind::Column { children } => children.iter().map(natural_width).fold(0.0, f32::max),
        NodeKind::Split { children, .. }
        | NodeKind::Grid { children, .. }
        | NodeKind::Wrap { children } => {
            let sum: f32 = children.iter().map(natural_width).sum();
            sum + gap * children.len().saturating_sub(1) as f32
        }
    };
    content + padding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::scale::PageGeometry;
    use crate::models::defaults::default_document;
    use crate::models::{ContentScale, PersonalField, Template};
    use crate::projection::{project, Insets};

    fn laid_out(template: Template, scale: f32) -> LaidOutPage {
        let doc = default_document(template).set_content_scale(f64::from(scale));
        let transform = ContentTransform::new(doc.content_scale, PageGeometry::A4);
        layout(&project(&doc), &transform)
    }

    fn texts(page: &LaidOutPage) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_is_at_least_min_height() {
        for template in [Template::Modern, Template::Classic, Template::Minimal] {
            let page = laid_out(template, 1.0);
            assert_eq!(page.width, page.transform.layout_width);
            assert!(page.height >= page.transform.min_height);
            assert!(page.content_height > 0.0);
            assert!(page.height >= page.content_height);
        }
    }

    #[test]
    fn test_uppercase_applied_when_painting() {
        let page = laid_out(Template::Modern, 1.0);
        assert!(texts(&page).contains(&"MAX K. SILVA"));
    }

    #[test]
    fn test_text_stays_inside_page_width() {
        for template in [Template::Modern, Template::Classic, Template::Minimal] {
            let page = laid_out(template, 1.0);
            for op in &page.ops {
                if let PaintOp::Text { x, width, text, .. } = op {
                    assert!(*x >= 0.0, "{template}: {text}");
                    assert!(x + width <= page.width + 0.5, "{template}: {text}");
                }
            }
        }
    }

    #[test]
    fn test_minimal_side_panel_fills_page_height() {
        let page = laid_out(Template::Minimal, 1.0);
        let panel = page
            .ops
            .iter()
            .find_map(|op| match op {
                PaintOp::FillRect { rect, color, .. } if *color == Color::GRAY_800 => Some(*rect),
                _ => None,
            })
            .expect("side panel background");
        assert_eq!(panel.x, 0.0);
        assert!((panel.h - page.height).abs() < 1e-3);
    }

    #[test]
    fn test_smaller_scale_fits_more_per_page() {
        let dense = laid_out(Template::Modern, ContentScale::MIN);
        let large = laid_out(Template::Modern, ContentScale::MAX);
        let fill = |p: &LaidOutPage| p.content_height / p.transform.min_height;
        assert!(fill(&dense) < fill(&large));
    }

    #[test]
    fn test_photo_placed_by_column_alignment() {
        let page = laid_out(Template::Modern, 1.0);
        let rect = page
            .ops
            .iter()
            .find_map(|op| match op {
                PaintOp::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .expect("photo");
        // Right-aligned inside the 32px header padding.
        assert!((rect.x + rect.w - (page.width - 32.0)).abs() < 1e-3);
    }

    #[test]
    fn test_chips_and_contacts_paint_on_a_single_line() {
        let doc = default_document(Template::Modern);
        let page = laid_out(Template::Modern, 1.0);
        let painted = texts(&page);
        let skills = doc.sections.iter().filter(|s| s.kind.is_skills());
        for item in skills.flat_map(|s| &s.items) {
            assert!(painted.contains(&item.skill_label()), "{}", item.skill_label());
        }
        assert!(painted.contains(&doc.personal_info.address.as_str()));
    }

    #[test]
    fn test_no_photo_no_image_op() {
        let doc = default_document(Template::Minimal).set_photo(None);
        let transform = ContentTransform::new(doc.content_scale, PageGeometry::A4);
        let page = layout(&project(&doc), &transform);
        assert_eq!(page.photos().count(), 0);
    }

    #[test]
    fn test_blank_text_takes_a_line_without_painting() {
        let node = RenderNode::column(
            BoxStyle::default().padding(Insets::all(10.0)),
            vec![RenderNode::text(
                crate::projection::TextRole::Label,
                "",
                TextStyle::sans(10.0, Color::GRAY_800),
            )],
        );
        let tree = RenderTree {
            template: Template::Modern,
            root: node,
        };
        let transform = ContentTransform::new(ContentScale::IDENTITY, PageGeometry::A4);
        let page = layout(&tree, &transform);
        assert!(page.ops.is_empty());
        assert!((page.content_height - (20.0 + 14.0)).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_breaks_rows_when_full() {
        let doc = default_document(Template::Modern)
            .set_personal_field(PersonalField::Address, "Rua muito comprida ".repeat(6));
        let transform = ContentTransform::new(doc.content_scale, PageGeometry::A4);
        let page = layout(&project(&doc), &transform);
        let email_y = page.ops.iter().find_map(|op| match op {
            PaintOp::Text { text, baseline, .. } if text == "exemplo@gmail.com" => Some(*baseline),
            _ => None,
        });
        let address_y = page.ops.iter().find_map(|op| match op {
            PaintOp::Text { text, baseline, .. } if text.starts_with("Rua muito") => Some(*baseline),
            _ => None,
        });
        assert!(email_y.unwrap() > address_y.unwrap());
    }
}
