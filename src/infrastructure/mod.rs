pub mod pdf_rasterizer;

pub use pdf_rasterizer::{PageRenderer, PdfRasterizer, RenderedPages};
