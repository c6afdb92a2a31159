use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use imagedex_core::config::Settings;
use imagedex_core::traits::{Classifier, Thumbnailer};
use imagedex_core::types::{Classification, ImageRecord};

use crate::classify::ObservationClassifier;
use crate::sidecar::SidecarSource;
use crate::thumbnail::{ImageThumbnailer, NoThumbnails};

/// Builds immutable records from file paths.
///
/// Thumbnail and classification failures are absorbed: the record gets no
/// preview, or empty label maps.
#[derive(Clone)]
pub struct RecordBuilder {
    classifier: Arc<dyn Classifier>,
    thumbnailer: Arc<dyn Thumbnailer>,
}

impl RecordBuilder {
    pub fn new(classifier: Arc<dyn Classifier>, thumbnailer: Arc<dyn Thumbnailer>) -> Self {
        Self { classifier, thumbnailer }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let source = SidecarSource::new(settings.classify.sidecar_suffix.clone());
        let classifier = Arc::new(ObservationClassifier::from_settings(source, &settings.classify));
        let thumbnailer: Arc<dyn Thumbnailer> = if settings.thumbnail.enabled {
            Arc::new(ImageThumbnailer::new(settings.thumbnail.max_pixel_size))
        } else {
            Arc::new(NoThumbnails)
        };
        Self::new(classifier, thumbnailer)
    }

    pub fn build(&self, path: &Path) -> ImageRecord {
        let thumbnail = match self.thumbnailer.thumbnail(path) {
            Ok(t) => Some(t),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no thumbnail");
                None
            }
        };
        let classification = match self.classifier.classify(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "classification failed, using empty labels");
                Classification::default()
            }
        };
        ImageRecord::new(path, thumbnail, classification)
    }
}
