//! Vapor Core - Parameter types, path resolution, and error handling

pub mod error;
pub mod path;
pub mod types;

pub use error::{Error, Result};
pub use path::{ensure_trailing_slash, is_subpath, resolve, segments};
pub use types::*;
