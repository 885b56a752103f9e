//! A small set of safe wrappers around the raw OpenGL calls this program needs: a window with a
//! context, one shader program, one vertex array, and the frame that draws them.
//!
//! A knowledge of OpenGL is needed to follow any of this. [Learn OpenGL](https://learnopengl.com/)
//! covers every call made here, in the same order.

pub mod error;
pub mod frame;
pub mod opengl;
pub mod sources;
pub mod utils;
pub mod window;
