//! imagedex-core
//!
//! Shared domain types, the classifier/thumbnailer seams, configuration and
//! filesystem traversal used by the rest of the workspace.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod scan;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
