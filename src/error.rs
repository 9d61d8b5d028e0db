// Errors that can stop the app. Every variant states *where* things went wrong.
// Runtime hiccups inside the core (a layer that fails to decode, a stale
// composite) are logged and never reach this type.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// A layer file for the viewing session could not be read
    #[error("Failed to read layer file {path:?}: {source}")]
    LayerRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the drawing to disk failed
    #[error("Failed to export drawing to {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
