//! Phobia: a minimal OpenGL application bootstrap.
//!
//! Opens a window with an OpenGL 3.3 core context, builds a shader program from
//! two source files, optionally uploads a texture, and runs a clear-and-present
//! loop until the window is closed.

pub mod abs;
pub mod config;
pub mod error;
pub mod fileloader;
pub mod logging;

#[cfg(test)]
mod testlog;

pub use error::{Error, Result};
