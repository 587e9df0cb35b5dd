//! Render tree produced by the template projections.
//!
//! The tree is a small box model: columns stack children vertically, splits
//! place them side by side with relative widths, grids fill rows left to
//! right, wraps flow children inline. Every text leaf carries a [`TextRole`]
//! naming what it shows, which is what the projection tests audit.

use serde::Serialize;

use crate::layout::font_metrics::FontFamily;
use crate::models::{Color, ItemField, ItemId, PhotoRef, SectionId, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub const ZERO: Insets = Insets::all(0.0);

    pub const fn all(v: f32) -> Self {
        Insets {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn xy(x: f32, y: f32) -> Self {
        Insets {
            top: y,
            right: x,
            bottom: y,
            left: x,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Named area of the page, used to locate sections and panels in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "region", content = "id", rename_all = "snake_case")]
pub enum Region {
    Header,
    ContactStrip,
    Body,
    SidePanel,
    MainPanel,
    Summary,
    Section(SectionId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStyle {
    pub padding: Insets,
    pub background: Option<Color>,
    /// Corner radius of the background.
    pub radius: f32,
    /// Space between consecutive children.
    pub gap: f32,
    /// Horizontal placement of children narrower than the box.
    pub align: Align,
    pub region: Option<Region>,
}

impl Default for BoxStyle {
    fn default() -> Self {
        BoxStyle {
            padding: Insets::ZERO,
            background: None,
            radius: 0.0,
            gap: 0.0,
            align: Align::Start,
            region: None,
        }
    }
}

impl BoxStyle {
    pub fn padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Address,
    Phone,
    Email,
    Linkedin,
}

/// What a text leaf displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TextRole {
    Name,
    JobTitle,
    Contact { kind: ContactKind },
    /// Fixed caption such as "Contato".
    Label,
    /// Punctuation between inline items.
    Separator,
    SummaryHeading,
    Summary,
    SectionHeading { section: SectionId },
    ItemField {
        section: SectionId,
        item: ItemId,
        field: ItemField,
    },
    Skill { section: SectionId, item: ItemId },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub family: FontFamily,
    /// Font size in CSS pixels.
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub uppercase: bool,
    pub color: Color,
    pub align: Align,
    /// Line box height as a multiple of `size`.
    pub line_height: f32,
}

impl TextStyle {
    pub fn new(family: FontFamily, size: f32, color: Color) -> Self {
        TextStyle {
            family,
            size,
            bold: false,
            italic: false,
            uppercase: false,
            color,
            align: Align::Start,
            line_height: 1.4,
        }
    }

    pub fn sans(size: f32, color: Color) -> Self {
        Self::new(FontFamily::Sans, size, color)
    }

    pub fn serif(size: f32, color: Color) -> Self {
        Self::new(FontFamily::Serif, size, color)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub text: String,
    pub role: TextRole,
    pub style: TextStyle,
}

impl TextNode {
    /// The string as painted, with the uppercase transform applied.
    pub fn display_text(&self) -> String {
        if self.style.uppercase {
            self.text.to_uppercase()
        } else {
            self.text.clone()
        }
    }
}

/// Circular profile photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoNode {
    pub photo: PhotoRef,
    /// Diameter in CSS pixels.
    pub size: f32,
    pub border: Option<(Color, f32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleNode {
    pub color: Color,
    pub thickness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Column { children: Vec<RenderNode> },
    Split { weights: Vec<f32>, children: Vec<RenderNode> },
    Grid { columns: usize, children: Vec<RenderNode> },
    Wrap { children: Vec<RenderNode> },
    Text(TextNode),
    Photo(PhotoNode),
    Rule(RuleNode),
    /// Fixed-size filled dot, used as a list marker.
    Dot { color: Color, size: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub style: BoxStyle,
    pub kind: NodeKind,
}

impl RenderNode {
    pub fn column(style: BoxStyle, children: Vec<RenderNode>) -> Self {
        RenderNode {
            style,
            kind: NodeKind::Column { children },
        }
    }

    pub fn split(style: BoxStyle, weights: Vec<f32>, children: Vec<RenderNode>) -> Self {
        debug_assert_eq!(weights.len(), children.len());
        RenderNode {
            style,
            kind: NodeKind::Split { weights, children },
        }
    }

    pub fn grid(style: BoxStyle, columns: usize, children: Vec<RenderNode>) -> Self {
        RenderNode {
            style,
            kind: NodeKind::Grid {
                columns: columns.max(1),
                children,
            },
        }
    }

    pub fn wrap(style: BoxStyle, children: Vec<RenderNode>) -> Self {
        RenderNode {
            style,
            kind: NodeKind::Wrap { children },
        }
    }

    pub fn text(role: TextRole, text: impl Into<String>, style: TextStyle) -> Self {
        RenderNode {
            style: BoxStyle::default(),
            kind: NodeKind::Text(TextNode {
                text: text.into(),
                role,
                style,
            }),
        }
    }

    pub fn photo(photo: PhotoRef, size: f32, border: Option<(Color, f32)>) -> Self {
        RenderNode {
            style: BoxStyle::default(),
            kind: NodeKind::Photo(PhotoNode {
                photo,
                size,
                border,
            }),
        }
    }

    pub fn rule(color: Color, thickness: f32) -> Self {
        RenderNode {
            style: BoxStyle::default(),
            kind: NodeKind::Rule(RuleNode { color, thickness }),
        }
    }

    pub fn dot(color: Color, size: f32) -> Self {
        RenderNode {
            style: BoxStyle::default(),
            kind: NodeKind::Dot { color, size },
        }
    }

    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn children(&self) -> &[RenderNode] {
        match &self.kind {
            NodeKind::Column { children }
            | NodeKind::Split { children, .. }
            | NodeKind::Grid { children, .. }
            | NodeKind::Wrap { children } => children,
            NodeKind::Text(_) | NodeKind::Photo(_) | NodeKind::Rule(_) | NodeKind::Dot { .. } => {
                &[]
            }
        }
    }

    /// Depth-first, document-order walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RenderNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn texts(&self) -> Vec<&TextNode> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if let NodeKind::Text(text) = &node.kind {
                out.push(text);
            }
        });
        out
    }

    pub fn find_region(&self, region: &Region) -> Option<&RenderNode> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.style.region.as_ref() == Some(region) {
                found = Some(node);
            }
        });
        found
    }
}

/// A projected document: the template it was built for and its root box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub template: Template,
    pub root: RenderNode,
}

impl RenderTree {
    pub fn texts(&self) -> Vec<&TextNode> {
        self.root.texts()
    }

    /// Section ids in the order their headings appear.
    pub fn section_heading_order(&self) -> Vec<SectionId> {
        self.texts()
            .into_iter()
            .filter_map(|t| match &t.role {
                TextRole::SectionHeading { section } => Some(section.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn find_region(&self, region: &Region) -> Option<&RenderNode> {
        self.root.find_region(region)
    }
}
