//! Domain types shared by the classifier, the index and the library.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Label → confidence in `[0, 1]`, ordered by label.
pub type LabelMap = BTreeMap<String, f32>;

/// Section key used for records without any category label.
pub const OTHER_SECTION: &str = "other";

/// One operating point on a label's precision/recall curve.
///
/// An observation whose confidence is at least `threshold` is accepted with
/// the given `precision` and `recall`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PrPoint {
    pub threshold: f32,
    pub precision: f32,
    pub recall: f32,
}

/// A single label reported by a vision model for one image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub identifier: String,
    pub confidence: f32,
    #[serde(default)]
    pub curve: Option<Vec<PrPoint>>,
}

impl Observation {
    pub fn new(identifier: impl Into<String>, confidence: f32) -> Self {
        Self { identifier: identifier.into(), confidence, curve: None }
    }

    pub fn with_curve(mut self, curve: Vec<PrPoint>) -> Self {
        self.curve = Some(curve);
        self
    }
}

/// Output of a classifier: high-precision `categories` and the broader
/// high-recall `search_terms`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub categories: LabelMap,
    pub search_terms: LabelMap,
}

/// A downsized RGBA preview of an image.
#[derive(Clone)]
pub struct Thumbnail {
    pixels: Arc<image::RgbaImage>,
}

impl Thumbnail {
    pub fn new(pixels: image::RgbaImage) -> Self {
        Self { pixels: Arc::new(pixels) }
    }

    pub fn width(&self) -> u32 { self.pixels.width() }

    pub fn height(&self) -> u32 { self.pixels.height() }

    pub fn pixels(&self) -> &image::RgbaImage { &self.pixels }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail").field("width", &self.width()).field("height", &self.height()).finish()
    }
}

/// A classified image file. Immutable once built.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: Uuid,
    path: PathBuf,
    thumbnail: Option<Thumbnail>,
    display_name: String,
    categories: LabelMap,
    search_terms: LabelMap,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, thumbnail: Option<Thumbnail>, classification: Classification) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            id: Uuid::new_v4(),
            path,
            thumbnail,
            display_name,
            categories: classification.categories,
            search_terms: classification.search_terms,
        }
    }

    pub fn id(&self) -> Uuid { self.id }

    pub fn path(&self) -> &Path { &self.path }

    pub fn thumbnail(&self) -> Option<&Thumbnail> { self.thumbnail.as_ref() }

    pub fn display_name(&self) -> &str { &self.display_name }

    pub fn categories(&self) -> &LabelMap { &self.categories }

    pub fn search_terms(&self) -> &LabelMap { &self.search_terms }
}

/// One display row of the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRow {
    pub id: Uuid,
    pub label: String,
    pub confidence: f32,
}
