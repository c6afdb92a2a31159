//! imagedex-index
//!
//! In-memory label index over classified images: category sections, search
//! over broader search terms, and the confidence-sorted detail rows.

pub mod detail;
pub mod index;

pub use detail::{detail_rows, humanize_label};
pub use index::{section_order, ImageIndex, Positions, Section};
