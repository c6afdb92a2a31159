//! imagedex-vision
//!
//! Turns an image file into an `ImageRecord`: threshold policies over model
//! observations, the JSON sidecar observation source, and thumbnails.

pub mod classify;
pub mod record;
pub mod sidecar;
pub mod thumbnail;

pub use classify::{ObservationClassifier, ThresholdPolicy};
pub use record::RecordBuilder;
pub use sidecar::SidecarSource;
pub use thumbnail::{ImageThumbnailer, NoThumbnails};
