use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use imagedex_core::error::{Error, Result};
use imagedex_core::traits::ObservationSource;
use imagedex_core::types::Observation;

/// Reads model observations from a JSON file stored next to each image.
///
/// For `beach.jpg` and suffix `labels.json` the sidecar is
/// `beach.jpg.labels.json`, holding an array of observations. A missing
/// sidecar means the model reported nothing for that image.
#[derive(Debug, Clone)]
pub struct SidecarSource {
    suffix: String,
}

impl SidecarSource {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }

    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let mut name = image.file_name().map(OsString::from).unwrap_or_default();
        name.push(".");
        name.push(&self.suffix);
        image.with_file_name(name)
    }
}

impl ObservationSource for SidecarSource {
    fn observe(&self, path: &Path) -> Result<Vec<Observation>> {
        let sidecar = self.sidecar_path(path);
        if !sidecar.is_file() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&sidecar)?;
        serde_json::from_str(&raw).map_err(|e| Error::Classification(format!("{}: {}", sidecar.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_sits_next_to_the_image() {
        let source = SidecarSource::new("labels.json");
        assert_eq!(source.sidecar_path(Path::new("/p/beach.jpg")), PathBuf::from("/p/beach.jpg.labels.json"));
    }
}
