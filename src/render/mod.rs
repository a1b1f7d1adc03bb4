//! LaTeX report rendering
//!
//! Pure string generation: no IO happens here. The pipeline in
//! `services::report` feeds these functions the parsed document and the
//! map of already-downloaded images.

pub mod body;
pub mod latex;
pub mod pages;
pub mod template;

pub use body::generate_body;
pub use template::{populate_header, splice_content, CONTENT_MARKER};
