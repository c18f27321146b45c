use thiserror::Error;

/// Main error type for the sheetstream crate.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum SheetStreamError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Module errors
    #[error("{0}")]
    GridError(#[from] crate::grid::GridError),

    #[error("{0}")]
    ConfigError(#[from] crate::files::ConfigError),

    #[error("{0}")]
    CellError(#[from] crate::schema::convert::CellError),

    #[error("{0}")]
    FieldError(#[from] crate::schema::field::FieldError),

    #[error("{0}")]
    ReferenceError(#[from] crate::reference::ReferenceError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetStreamError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetStreamError::WithContextError(format!("{}: {}", message, e)))
    }
}
