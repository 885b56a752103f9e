use gl;
use glutin::event::{ElementState, VirtualKeyCode};

use super::error::GlError;
use super::opengl::{GlProgram, GlVertexArray};
use super::sources::ShaderSources;
use super::window::{GlWindow, InputState};

/// A unit quad centred on the origin, as 4 xyz positions.
pub const QUAD_VERTICES: [f32; 12] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.5,  0.5, 0.0,
    -0.5,  0.5, 0.0,
];

/// The quad as two triangles sharing the 0-2 diagonal.
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 2,
    2, 3, 0,
];

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

/// The only key that does anything.
pub const EXIT_KEY: VirtualKeyCode = VirtualKeyCode::Escape;

/// Everything one frame needs besides the window.
pub struct Scene {
    pub program: GlProgram,
    pub vao: GlVertexArray,
}

impl Scene {
    pub fn new(sources: &ShaderSources, vertices: &[f32], indices: &[u32]) -> Result<Self, GlError> {
        let program = GlProgram::from_sources(&sources.vertex, &sources.fragment)?;
        let vao = GlVertexArray::from_geometry(vertices, indices)?;

        log::info!(
            "Drawing {} indices from vertex array {} with program {}",
            vao.index_count(),
            vao.id(),
            program.id()
        );
        Ok(Scene { program, vao })
    }

    pub fn quad(sources: &ShaderSources) -> Result<Self, GlError> {
        Self::new(sources, &QUAD_VERTICES, &QUAD_INDICES)
    }

    /// Draws the scene into whatever framebuffer is bound.
    pub fn render(&self) {
        unsafe {
            gl::ClearColor(CLEAR_COLOR[0], CLEAR_COLOR[1], CLEAR_COLOR[2], CLEAR_COLOR[3]);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        self.program.set_used();
        self.vao.bind();
        self.vao.draw_elements();

        // Nothing should draw without binding its own VAO first. If something tries, it draws
        // nothing instead of quietly drawing this one.
        GlVertexArray::unbind();
    }
}

/// Asks the window to close once the exit key is down.
pub fn process_input(input: &mut InputState) {
    if input.key(EXIT_KEY) == ElementState::Pressed {
        input.set_should_close(true);
    }
}

/// One iteration of the main loop.
pub fn draw(window: &mut GlWindow, scene: &Scene) {
    process_input(window.input_mut());

    scene.render();

    window.poll_events();
    if let Err(e) = window.swap_buffers() {
        log::warn!("could not present frame: {}", e);
    }
}
