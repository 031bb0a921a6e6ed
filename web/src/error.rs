use platform::PlatformError;
use thiserror::Error;

use crate::dom::NodeId;

#[derive(Error, Debug)]
pub enum UiError {
    #[error("Element not found: #{0}")]
    ElementNotFound(String),

    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("DOM error: {0}")]
    DomError(String),

    #[error("CSV encoding error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error(transparent)]
    PlatformError(#[from] PlatformError),
}
