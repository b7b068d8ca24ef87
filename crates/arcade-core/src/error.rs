//! Error types for arcade games.
//!
//! Gameplay itself never fails. The only fallible operation is writing the
//! coin-flip statistics export to disk.

use thiserror::Error;

/// Errors from exporting statistics.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export file could not be written.
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    /// The export could not be serialized.
    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
        assert_eq!(err.to_string(), "failed to write export: read-only");
    }
}
