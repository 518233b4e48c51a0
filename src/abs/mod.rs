//! This module contains the thin wrappers over SDL2 and OpenGL: the window and its
//! context, shader programs, and textures. Each wrapper exclusively owns its handle
//! and releases it on drop.

pub mod shader;
pub mod texture;
pub mod window;

pub use shader::*;
pub use texture::*;
pub use window::*;
