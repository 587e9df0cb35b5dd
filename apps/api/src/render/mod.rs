// Render: preview surface, photo loading, rasterization and PDF encoding.
// Raster and encode work is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod images;
pub mod pdf;
pub mod raster;
pub mod surface;

pub use images::{DecodedPhoto, ImageLoader, PhotoSet};
pub use pdf::{encode_pdf, slice_pages, EncodeError, OverflowPolicy};
pub use raster::{FontSet, Raster, RasterError, SkiaRasterizer, SurfaceRasterizer};
pub use surface::{spawn_preview_surface, RenderedFrame, SurfaceRegistry, PREVIEW_HANDLE};
