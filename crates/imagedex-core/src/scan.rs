//! Expand user-selected files and folders into the image files they contain.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Bytes read from a file when its extension does not identify an image.
const SNIFF_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub follow_links: bool,
    /// Directory extensions treated as opaque bundles (not descended into).
    pub package_extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let package_extensions = ["app", "bundle", "framework", "plugin", "kext", "photoslibrary", "xcodeproj", "pkg"];
        Self { follow_links: false, package_extensions: package_extensions.iter().map(|s| s.to_string()).collect() }
    }
}

/// Resolve `inputs` into image file paths, in input order.
///
/// Directories are walked depth-first with entries sorted by file name.
/// Hidden entries and package directories below an input are skipped.
/// Inputs that do not exist, unreadable directories and non-image files
/// contribute nothing.
pub fn image_files<P: AsRef<Path>>(inputs: &[P], options: &ScanOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        let metadata = match fs::metadata(input) {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %input.display(), error = %e, "skipping unreadable input");
                continue;
            }
        };
        if metadata.is_dir() {
            files.extend(walk_dir(input, options));
        } else if metadata.is_file() && is_image_file(input) {
            files.push(input.to_path_buf());
        }
    }
    files
}

fn walk_dir(root: &Path, options: &ScanOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e) || is_package(e, options)));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_package(entry: &DirEntry, options: &ScanOptions) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .path()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| options.package_extensions.iter().any(|p| p.eq_ignore_ascii_case(ext)))
}

/// True when the extension names an image format, or the leading bytes do.
pub fn is_image_file(path: &Path) -> bool {
    if image::ImageFormat::from_path(path).is_ok() {
        return true;
    }
    let mut header = [0u8; SNIFF_LEN];
    let read = match fs::File::open(path).and_then(|mut f| f.read(&mut header)) {
        Ok(n) => n,
        Err(_) => return false,
    };
    read > 0 && image::guess_format(&header[..read]).is_ok()
}
