//! Feed module
//!
//! Diff annotation and Atom rendering.

pub mod annotator;
pub mod html;
pub mod renderer;

pub use annotator::DiffHighlight;
pub use html::preformatted;
pub use renderer::{render_feed, FeedMeta};
