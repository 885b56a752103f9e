use std::ffi::CStr;
use std::os::raw::c_char;

use gl;
use gl::types::*;

/// What the driver gave us when a build failed but left the info log empty.
pub const EMPTY_INFO_LOG: &str = "(the driver produced no diagnostic log)";

/// GL objects that have a build status and an info log. Shaders and programs answer the same
/// questions through different entry points, so this picks the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlObjectKind {
    Shader,
    Program,
}

impl GlObjectKind {
    unsafe fn parameter(self, id: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        match self {
            GlObjectKind::Shader => gl::GetShaderiv(id, pname, &mut value),
            GlObjectKind::Program => gl::GetProgramiv(id, pname, &mut value),
        }
        value
    }

    unsafe fn read_info_log(self, id: GLuint, buf: &mut [u8]) -> usize {
        let mut written: GLsizei = 0;
        let size = buf.len() as GLsizei;
        let ptr = buf.as_mut_ptr() as *mut GLchar;
        match self {
            GlObjectKind::Shader => gl::GetShaderInfoLog(id, size, &mut written, ptr),
            GlObjectKind::Program => gl::GetProgramInfoLog(id, size, &mut written, ptr),
        }
        written.max(0) as usize
    }
}

/// Checks `status` (`COMPILE_STATUS`, `LINK_STATUS` or `VALIDATE_STATUS`) on a shader or
/// program. On failure the info log is sized with `INFO_LOG_LENGTH`, read back and returned as
/// the error. Callers decide which kind of error that log becomes.
pub fn check_status(kind: GlObjectKind, id: GLuint, status: GLenum) -> Result<(), String> {
    let ok = unsafe { kind.parameter(id, status) };
    if ok != gl::FALSE as GLint {
        return Ok(());
    }

    let len = unsafe { kind.parameter(id, gl::INFO_LOG_LENGTH) };
    let mut buf = info_log_buffer(len);
    let written = unsafe { kind.read_info_log(id, &mut buf) };
    buf.truncate(written);

    Err(decode_info_log(&buf))
}

/// A zeroed buffer big enough for a log of `len` bytes plus the terminator. Drivers disagree on
/// whether `INFO_LOG_LENGTH` counts the terminator, so there is always room for one more.
pub fn info_log_buffer(len: GLint) -> Vec<u8> {
    vec![0; len.max(0) as usize + 1]
}

/// Turns raw info log bytes into text, stopping at the first NUL and dropping trailing
/// whitespace (most drivers end every message with a newline).
pub fn decode_info_log(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = String::from_utf8_lossy(&bytes[..end]);
    let text = text.trim_end();

    if text.is_empty() {
        EMPTY_INFO_LOG.to_string()
    } else {
        text.to_string()
    }
}

/// Reads one of the driver's identification strings (`VENDOR`, `RENDERER`, `VERSION`, ...).
pub fn gl_string(name: GLenum) -> String {
    unsafe {
        let ptr = gl::GetString(name);
        if ptr.is_null() {
            return String::from("unknown");
        }
        CStr::from_ptr(ptr as *const c_char).to_string_lossy().into_owned()
    }
}
