use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The two programmable stages this crate builds programs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Everything that can go wrong while setting up the window and the GPU objects.
///
/// None of these are recoverable: they are all returned to `main`, which logs them and exits.
#[derive(Debug, Error)]
pub enum GlError {
    #[error("could not create window: {0}")]
    Window(String),

    #[error("could not compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("failed to link program: {0}")]
    Link(String),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("could not read shader source {}: {source}", path.display())]
    Source { path: PathBuf, source: io::Error },
}
