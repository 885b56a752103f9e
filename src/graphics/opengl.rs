use gl;
// NB: the GL types are all aliases for Rust primitives, they're only used where they document
// what the driver expects
use gl::types::*;
use std::ffi::{CString, c_void};
use std::mem::size_of_val;
use std::ptr::null;

use super::error::{GlError, ShaderStage};
use super::utils::{check_status, GlObjectKind};

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// A compiled shader unit. It only needs to live until it's linked into a program.
pub struct GlShader {
    id: GLuint,
}

impl GlShader {
    pub fn id(&self) -> GLuint { self.id }

    pub fn compile(source: &str, stage: ShaderStage) -> Result<Self, GlError> {
        let source = CString::new(source).map_err(|e| GlError::Compile {
            stage,
            log: format!("source contains a NUL byte at offset {}", e.nul_position()),
        })?;

        let id = unsafe { gl::CreateShader(stage.gl_enum()) };
        // From here on `shader` owns the id, so an early return deletes it
        let shader = Self { id };

        unsafe {
            gl::ShaderSource(id, 1, &source.as_ptr(), null());
            gl::CompileShader(id);
        }

        check_status(GlObjectKind::Shader, id, gl::COMPILE_STATUS)
            .map_err(|log| GlError::Compile { stage, log })?;

        log::debug!("compiled {} shader {}", stage, id);
        Ok(shader)
    }

    pub fn from_vert_source(source: &str) -> Result<Self, GlError> {
        Self::compile(source, ShaderStage::Vertex)
    }

    pub fn from_frag_source(source: &str) -> Result<Self, GlError> {
        Self::compile(source, ShaderStage::Fragment)
    }
}

impl Drop for GlShader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.id);
        }
    }
}

/// A linked vertex + fragment pipeline, ready to draw with.
pub struct GlProgram {
    id: GLuint,
}

impl GlProgram {
    pub fn id(&self) -> GLuint { self.id }

    /// Compiles both stages and links them. Compile failures report which stage broke; a
    /// failure to link the two together is reported as [`GlError::Link`].
    pub fn from_sources(vert_source: &str, frag_source: &str) -> Result<Self, GlError> {
        let vert = GlShader::from_vert_source(vert_source)?;
        let frag = GlShader::from_frag_source(frag_source)?;

        Self::from_shaders(&[vert, frag])
    }

    pub fn from_shaders(shaders: &[GlShader]) -> Result<Self, GlError> {
        let program = Self { id: unsafe { gl::CreateProgram() } };

        unsafe {
            for shader in shaders {
                gl::AttachShader(program.id, shader.id());
            }

            gl::LinkProgram(program.id);
            gl::ValidateProgram(program.id);

            // The units are baked into the program now. Detaching lets them be deleted as soon as
            // the caller drops them; keep them attached if you need to inspect them in a GPU
            // debugger.
            for shader in shaders {
                gl::DetachShader(program.id, shader.id());
            }
        }

        check_status(GlObjectKind::Program, program.id, gl::LINK_STATUS).map_err(GlError::Link)?;

        // Validation depends on the GL state at the time of the call, so it's only a hint
        if let Err(log) = check_status(GlObjectKind::Program, program.id, gl::VALIDATE_STATUS) {
            log::warn!("program {} did not validate: {}", program.id, log);
        }

        log::debug!("linked program {} from {} shaders", program.id, shaders.len());
        Ok(program)
    }

    pub fn set_used(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
    }
}

impl Drop for GlProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

pub enum GlBufferType {
    Array = gl::ARRAY_BUFFER as isize,
    Element = gl::ELEMENT_ARRAY_BUFFER as isize,
}

pub fn unbind_buffers(buffer_type: GlBufferType) {
    unsafe { gl::BindBuffer(buffer_type as GLenum, 0); }
}

/// Uploads `data` to the buffer bound at `target`. The data is written once and drawn many times.
fn upload<T>(target: GLenum, data: &[T]) {
    unsafe {
        gl::BufferData(
            target,
            size_of_val(data) as GLsizeiptr,
            data.as_ptr() as *const c_void,
            gl::STATIC_DRAW,
        );
    }
}

fn gen_buffer() -> GLuint {
    let mut id = 0;
    unsafe { gl::GenBuffers(1, &mut id) };
    id
}

/// Raw vertex positions on the GPU.
pub struct GlVertexBuffer {
    id: GLuint,
}

impl GlVertexBuffer {
    pub fn init(data: &[f32]) -> Self {
        let vbo = Self { id: gen_buffer() };
        vbo.bind();
        upload(gl::ARRAY_BUFFER, data);
        vbo
    }

    pub fn bind(&self) {
        unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, self.id); }
    }
}

impl Drop for GlVertexBuffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.id); }
    }
}

/// A list of vertex ids, three per triangle, so shared corners are only uploaded once.
pub struct GlElementBuffer {
    id: GLuint,
}

impl GlElementBuffer {
    pub fn init(data: &[u32]) -> Self {
        let ebo = Self { id: gen_buffer() };
        ebo.bind();
        upload(gl::ELEMENT_ARRAY_BUFFER, data);
        ebo
    }

    pub fn bind(&self) {
        unsafe { gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.id); }
    }
}

impl Drop for GlElementBuffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.id); }
    }
}

/// Floats per vertex. Positions are the only attribute.
pub const POSITION_SIZE: usize = 3;

/// Attribute slot the position is bound to, i.e. `layout (location = 0)` in the vertex shader.
pub const POSITION_ATTRIB: GLuint = 0;

/// Rejects geometry the draw call can't make sense of before anything is sent to the GPU.
pub fn validate_geometry(vertices: &[f32], indices: &[u32]) -> Result<(), GlError> {
    if vertices.is_empty() || vertices.len() % POSITION_SIZE != 0 {
        return Err(GlError::Geometry(format!(
            "expected whole {}-component positions, got {} floats",
            POSITION_SIZE,
            vertices.len()
        )));
    }

    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(GlError::Geometry(format!(
            "expected whole triangles, got {} indices",
            indices.len()
        )));
    }

    let positions = vertices.len() / POSITION_SIZE;
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions) {
        return Err(GlError::Geometry(format!(
            "index {} is out of range for {} positions",
            bad, positions
        )));
    }

    Ok(())
}

/// The vertex array object, and the only handle callers keep after uploading geometry. It owns
/// the vertex and element buffers it references and deletes everything when dropped.
pub struct GlVertexArray {
    id: GLuint,
    index_count: GLsizei,
    _vbo: GlVertexBuffer,
    _ebo: GlElementBuffer,
}

impl GlVertexArray {
    pub fn id(&self) -> GLuint { self.id }

    pub fn index_count(&self) -> GLsizei { self.index_count }

    pub fn from_geometry(vertices: &[f32], indices: &[u32]) -> Result<Self, GlError> {
        validate_geometry(vertices, indices)?;

        let mut id = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut id);
            gl::BindVertexArray(id);
        }

        let vbo = GlVertexBuffer::init(vertices);
        let ebo = GlElementBuffer::init(indices);

        // Stride 0 means tightly packed
        set_vertex_attrib(POSITION_ATTRIB, POSITION_SIZE as GLint, 0, 0);

        // The VAO has to go first, otherwise unbinding the element buffer would remove it from the
        // VAO as well
        Self::unbind();
        unbind_buffers(GlBufferType::Array);
        unbind_buffers(GlBufferType::Element);

        log::debug!(
            "uploaded {} positions and {} indices to vertex array {}",
            vertices.len() / POSITION_SIZE,
            indices.len(),
            id
        );

        Ok(Self { id, index_count: indices.len() as GLsizei, _vbo: vbo, _ebo: ebo })
    }

    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.id); }
    }

    pub fn unbind() {
        unsafe { gl::BindVertexArray(0); }
    }

    /// One indexed draw of every uploaded index as triangles. The array must be bound.
    pub fn draw_elements(&self) {
        unsafe {
            gl::DrawElements(gl::TRIANGLES, self.index_count, gl::UNSIGNED_INT, null());
        }
    }
}

impl Drop for GlVertexArray {
    fn drop(&mut self) {
        unsafe { gl::DeleteVertexArrays(1, &self.id); }
    }
}

/// Declares float attribute `index` as `size` components read from the bound array buffer.
/// `stride` and `offset` are counted in floats.
pub fn set_vertex_attrib(index: GLuint, size: GLint, stride: usize, offset: usize) {
    unsafe {
        gl::VertexAttribPointer(
            index,
            size,
            gl::FLOAT,
            gl::FALSE,
            (stride * std::mem::size_of::<f32>()) as GLsizei,
            (offset * std::mem::size_of::<f32>()) as *const c_void,
        );
        gl::EnableVertexAttribArray(index);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graphics::frame::{QUAD_INDICES, QUAD_VERTICES};
    use crate::graphics::test_support::headless;

    const PASS_VERT: &str = "#version 330 core
layout (location = 0) in vec3 position;
void main() { gl_Position = vec4(position, 1.0); }
";

    const PASS_FRAG: &str = "#version 330 core
out vec4 color;
void main() { color = vec4(1.0, 0.5, 0.2, 1.0); }
";

    #[test]
    fn partial_positions_are_rejected() {
        let err = validate_geometry(&[0.0, 0.0, 0.0, 1.0], &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, GlError::Geometry(_)));
    }

    #[test]
    fn partial_triangles_are_rejected() {
        let err = validate_geometry(&QUAD_VERTICES, &[0, 1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("4 indices"));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let err = validate_geometry(&QUAD_VERTICES, &[0, 1, 4]).unwrap_err();
        assert_eq!(err.to_string(), "invalid geometry: index 4 is out of range for 4 positions");
    }

    #[test]
    fn empty_geometry_is_rejected() {
        assert!(validate_geometry(&[], &[]).is_err());
        assert!(validate_geometry(&QUAD_VERTICES, &[]).is_err());
    }

    #[test]
    fn nul_bytes_in_source_fail_before_reaching_the_driver() {
        // No context is current here, so this only passes if no GL call is made
        let err = GlShader::compile("void main() {}\0", ShaderStage::Fragment).err().unwrap();

        match err {
            GlError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("offset 14"));
            }
            other => panic!("expected a compile error, got {:?}", other),
        }
    }

    #[test]
    #[ignore = "needs an OpenGL 3.3 capable display"]
    fn pass_through_shaders_link() {
        let _gl = headless();

        let program = GlProgram::from_sources(PASS_VERT, PASS_FRAG).unwrap();
        assert_ne!(program.id(), 0);
    }

    #[test]
    #[ignore = "needs an OpenGL 3.3 capable display"]
    fn vertex_syntax_errors_are_vertex_compile_errors() {
        let _gl = headless();

        let broken = "#version 330 core\nvoid main() { gl_Position = vec4(1.0 }\n";
        let err = GlProgram::from_sources(broken, PASS_FRAG).err().unwrap();

        match &err {
            GlError::Compile { stage, log } => {
                assert_eq!(*stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compile error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("could not compile vertex shader"));
    }

    #[test]
    #[ignore = "needs an OpenGL 3.3 capable display"]
    fn mismatched_interfaces_are_link_errors() {
        let _gl = headless();

        let frag = "#version 330 core
in vec4 tint;
out vec4 color;
void main() { color = tint; }
";
        let err = GlProgram::from_sources(PASS_VERT, frag).err().unwrap();

        match err {
            GlError::Link(log) => assert!(!log.is_empty()),
            other => panic!("expected a link error, got {:?}", other),
        }
    }

    #[test]
    #[ignore = "needs an OpenGL 3.3 capable display"]
    fn quad_uploads_into_one_vertex_array() {
        let _gl = headless();

        let vao = GlVertexArray::from_geometry(&QUAD_VERTICES, &QUAD_INDICES).unwrap();
        assert_ne!(vao.id(), 0);
        assert_eq!(vao.index_count(), 6);

        // Everything is unbound afterwards, but the VAO remembers its element buffer
        let mut bound = -1;
        unsafe { gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound) };
        assert_eq!(bound, 0);

        vao.bind();
        unsafe { gl::GetIntegerv(gl::ELEMENT_ARRAY_BUFFER_BINDING, &mut bound) };
        assert_ne!(bound, 0);

        let program = GlProgram::from_sources(PASS_VERT, PASS_FRAG).unwrap();
        program.set_used();
        vao.draw_elements();
        GlVertexArray::unbind();

        unsafe { gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound) };
        assert_eq!(bound, 0);
    }
}
