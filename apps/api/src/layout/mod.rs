// Resume layout: font metrics, line wrapping and pagination for the
// in-process PDF renderer. Pure functions only; drawing lives in merge::local.

pub mod document;
pub mod font_metrics;

pub use document::{build_layout, paginate};
pub use font_metrics::{default_page_config, FontFamily, PageConfig};
