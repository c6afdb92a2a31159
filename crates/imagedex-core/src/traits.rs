use std::path::Path;

use crate::error::Result;
use crate::types::{Classification, Observation, Thumbnail};

/// Produces the two label maps for one image file.
pub trait Classifier: Send + Sync {
    fn classify(&self, path: &Path) -> Result<Classification>;
}

/// Raw, unfiltered label observations for one image file.
pub trait ObservationSource: Send + Sync {
    fn observe(&self, path: &Path) -> Result<Vec<Observation>>;
}

pub trait Thumbnailer: Send + Sync {
    fn thumbnail(&self, path: &Path) -> Result<Thumbnail>;
}
