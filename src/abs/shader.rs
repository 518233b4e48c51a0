//! Compiling shader stages and linking them into programs.
//!
//! [`Shader`] is a single compiled stage that only lives until it is linked;
//! [`ShaderProgram`] owns the linked program for the rest of its life.
//! Uniforms are set by name through the [`Uniform`] trait; each program remembers the location
//! of every name it has been asked for, including the names it does not have.

use std::{cell::RefCell, collections::HashMap, fmt, path::Path, sync::Arc};

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::error::{Error, Result};
use crate::fileloader::load_text_file;

/// Maximum number of bytes of driver diagnostics kept from a failed compile or link.
pub const INFO_LOG_LIMIT: usize = 1024;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("VERTEX"),
            ShaderStage::Fragment => f.write_str("FRAGMENT"),
        }
    }
}

fn truncate_log(mut log: String) -> String {
    if log.len() > INFO_LOG_LIMIT {
        let mut end = INFO_LOG_LIMIT;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

/// Represents an individual compiled OpenGL shader stage.
///
/// Stages only live long enough to be linked; dropping one deletes it.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader stage from the given source code.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self> {
        unsafe {
            let shader = gl.create_shader(stage.gl_type()).map_err(Error::Gl)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = truncate_log(gl.get_shader_info_log(shader));
                gl.delete_shader(shader);
                log::error!("Shader compilation error ({stage}):\n{log}");
                return Err(Error::Compile { stage, log });
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// A value that can be uploaded to a uniform location.
pub trait Uniform {
    /// Uploads the value to `location` of the currently bound program.
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for f32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for i32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for Vec3 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for Mat4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

impl<T: Uniform> Uniform for &T {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).upload(gl, location);
    }
}

/// What happened to a uniform write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformStatus {
    /// The value was uploaded.
    Applied,
    /// The program has no active uniform with that name; nothing was uploaded.
    Missing,
}

/// Name to location lookups for one program, resolved at most once per name.
#[derive(Debug)]
pub struct UniformCache<L> {
    locations: RefCell<HashMap<String, Option<L>>>,
}

impl<L: Clone> UniformCache<L> {
    pub fn new() -> Self {
        Self {
            locations: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the cached location for `name`, calling `lookup` on first use.
    /// A `None` result is cached too.
    pub fn resolve(&self, name: &str, lookup: impl FnOnce(&str) -> Option<L>) -> Option<L> {
        if let Some(location) = self.locations.borrow().get(name) {
            return location.clone();
        }
        let location = lookup(name);
        self.locations
            .borrow_mut()
            .insert(name.to_string(), location.clone());
        location
    }

    /// Number of distinct names resolved so far.
    pub fn len(&self) -> usize {
        self.locations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: Clone> Default for UniformCache<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    uniforms: UniformCache<glow::UniformLocation>,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self> {
        unsafe {
            let program = gl.create_program().map_err(Error::Gl)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = truncate_log(gl.get_program_info_log(program));
                gl.delete_program(program);
                log::error!("Program linking error:\n{log}");
                return Err(Error::Link { log });
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                uniforms: UniformCache::new(),
            })
        }
    }

    /// Reads, compiles and links a vertex and a fragment shader from disk.
    ///
    /// The intermediate stages are deleted before this returns, whether or
    /// not linking succeeded.
    pub fn from_files(
        gl: &Arc<glow::Context>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let vertex_source = load_text_file(vertex_path)?;
        let fragment_source = load_text_file(fragment_path)?;

        let vertex = Shader::new(gl, ShaderStage::Vertex, &vertex_source)?;
        let fragment = Shader::new(gl, ShaderStage::Fragment, &fragment_source)?;
        let program = Self::new(gl, &[&vertex, &fragment])?;

        log::info!(
            "Linked shader program: {} + {}",
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(program)
    }

    /// Returns the raw program handle.
    pub fn id(&self) -> glow::Program {
        self.id
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// The program must be bound. Unknown names are not an error; they come
    /// back as [`UniformStatus::Missing`].
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) -> UniformStatus {
        let location = self.uniforms.resolve(name, |name| {
            let location = unsafe { self.gl.get_uniform_location(self.id, name) };
            if location.is_none() {
                log::debug!("uniform `{name}` is not active in program {:?}", self.id);
            }
            location
        });
        match location {
            Some(location) => {
                value.upload(&self.gl, &location);
                UniformStatus::Applied
            }
            None => UniformStatus::Missing,
        }
    }

    pub fn set_mat4(&self, name: &str, value: &Mat4) -> UniformStatus {
        self.set_uniform(name, value)
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) -> UniformStatus {
        self.set_uniform(name, value)
    }

    pub fn set_float(&self, name: &str, value: f32) -> UniformStatus {
        self.set_uniform(name, value)
    }

    pub fn set_int(&self, name: &str, value: i32) -> UniformStatus {
        self.set_uniform(name, value)
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}
