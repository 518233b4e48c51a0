//! Error types shared by every wrapper in the crate.
//!
//! Loading and construction never leave a half-built object behind. Each
//! failure comes back as an [`Error`] and the caller decides whether to
//! abort, substitute something else, or carry on.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::ShaderStage;

/// Everything that can go wrong while bootstrapping the window and its resources.
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be opened or read.
    #[error("Failed to open file: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image file could not be decoded.
    #[error("Failed to load texture: {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The decoded image has a channel count no transfer format exists for.
    #[error("Unsupported channel count for texture upload: {0}")]
    UnsupportedChannels(u8),

    /// A pixel buffer is not `width * height * channels` bytes long.
    #[error("Pixel data is {actual} bytes, expected {expected}")]
    PixelDataLength { expected: usize, actual: usize },

    /// A shader stage failed to compile. `log` holds the driver diagnostics.
    #[error("Shader compilation error ({stage}):\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// The shader program failed to link.
    #[error("Program linking error:\n{log}")]
    Link { log: String },

    /// SDL or OpenGL context setup failed.
    #[error("Window system error: {0}")]
    Window(String),

    /// The driver refused to allocate a GL object.
    #[error("OpenGL error: {0}")]
    Gl(String),

    /// The configuration file exists but is unreadable or malformed.
    #[error("Invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A global logger was already installed.
    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl Error {
    /// Whether the failing call already wrote this error to the log.
    ///
    /// File reads, image decodes, compiles and links log where they fail;
    /// callers reporting an error should skip these to avoid printing it twice.
    pub fn is_logged_at_source(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::ImageDecode { .. } | Error::Compile { .. } | Error::Link { .. }
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
