// Layout: content scaling, box flow and page fill for projected render trees.
// Pure and CPU-bound; async callers run it inside tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;
pub mod page_fill;
pub mod scale;

pub use flow::{layout, LaidOutPage, PaintOp, Rect};
pub use font_metrics::FontFamily;
pub use page_fill::{analyze_page_fill, PageFillAnalysis, PageFillVerdict};
pub use scale::{ContentTransform, PageGeometry};
