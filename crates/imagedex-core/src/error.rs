use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Section {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },

    #[error("Row {row} out of range in section {section} ({count} images)")]
    RowOutOfRange { row: usize, section: usize, count: usize },

    #[error("A load is already in progress")]
    LoadInProgress,

    #[error("Library is busy loading")]
    Busy,

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Thumbnail failed: {0}")]
    Thumbnail(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
