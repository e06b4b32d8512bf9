//! Result type alias for mylang operations

use crate::error::MylangError;

/// Standard Result type for mylang operations
pub type Result<T> = std::result::Result<T, MylangError>;
