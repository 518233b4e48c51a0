//! SDL2 and OpenGL window management.
//!
//! This module defines the [`Window`] struct which encapsulates the SDL2 window,
//! its OpenGL context, and the event pump that feeds it.
//!
//! Every GL call in the crate goes through a [`glow::Context`] handed out by a
//! [`Window`]. The context behind it is made current on the thread that called
//! [`Window::new`] and stays current until the window is dropped, so the window
//! and everything created from it belong to that thread.

use std::sync::Arc;

use glam::Vec4;
use glow::HasContext;
use sdl2::event::{Event, WindowEvent};

use crate::error::{Error, Result};

/// The [`Window`] struct encapsulates the SDL2 window and OpenGL context.
///
/// Fields drop in declaration order: the GL function table and context go
/// before the window they render into.
pub struct Window {
    gl: Arc<glow::Context>,
    gl_context: sdl2::video::GLContext,
    window: sdl2::video::Window,
    event_pump: sdl2::EventPump,
    _video_subsystem: sdl2::VideoSubsystem,
    sdl: sdl2::Sdl,
    width: u32,
    height: u32,
    should_close: bool,
}

impl Window {
    /// Creates a new window with an OpenGL 3.3 core context.
    ///
    /// On success the context is current on the calling thread and GL
    /// function pointers are loaded.
    pub fn new(width: u32, height: u32, title: &str, vsync: bool) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Window)?;
        let video_subsystem = sdl.video().map_err(Error::Window)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        gl_attr.set_double_buffer(true);

        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .position_centered()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;
        let gl_context = window.gl_create_context().map_err(Error::Window)?;
        window.gl_make_current(&gl_context).map_err(Error::Window)?;

        let interval = if vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("could not set swap interval: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(Error::Window)?;

        debug_assert!(gl_context.is_current());
        log::info!(
            "Created window \"{title}\" ({width}x{height}), {}",
            unsafe { gl.get_parameter_string(glow::VERSION) }
        );

        Ok(Self {
            gl: Arc::new(gl),
            gl_context,
            window,
            event_pump,
            _video_subsystem: video_subsystem,
            sdl,
            width,
            height,
            should_close: false,
        })
    }

    /// Returns the GL function table bound to this window's context.
    ///
    /// Anything built from it ([`ShaderProgram`](crate::abs::ShaderProgram),
    /// [`Texture`](crate::abs::Texture)) deletes its GL object on drop and
    /// needs the context to still be current then. Drop those before the
    /// window, e.g. by declaring the window first in the same scope.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a quit or close request has been seen by [`Window::poll_events`].
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Presents the back buffer. Blocks until the next refresh with v-sync on.
    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }

    /// Drains the SDL event queue, recording close requests.
    pub fn poll_events(&mut self) {
        let window_id = self.window.id();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.should_close = true,
                Event::Window {
                    window_id: id,
                    win_event: WindowEvent::Close,
                    ..
                } if id == window_id => self.should_close = true,
                _ => {}
            }
        }
    }

    /// Turns depth testing on or off.
    pub fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    /// Clears the color and depth buffers, filling with `color`.
    pub fn clear(&self, color: Vec4) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    /// Queues a quit event as if the user had closed the window.
    pub fn request_close(&self) -> Result<()> {
        self.sdl
            .event()
            .map_err(Error::Window)?
            .push_event(Event::Quit { timestamp: 0 })
            .map_err(Error::Window)
    }

    /// Whether this window's GL context is current on the calling thread.
    pub fn is_context_current(&self) -> bool {
        self.gl_context.is_current()
    }
}
