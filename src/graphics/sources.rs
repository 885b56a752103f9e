use std::fs;
use std::path::Path;

use super::error::GlError;

pub const DEFAULT_VERTEX_SOURCE: &str = include_str!("shaders/quad.vert");
pub const DEFAULT_FRAGMENT_SOURCE: &str = include_str!("shaders/quad.frag");

/// GLSL text for the two stages of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        ShaderSources {
            vertex: DEFAULT_VERTEX_SOURCE.to_string(),
            fragment: DEFAULT_FRAGMENT_SOURCE.to_string(),
        }
    }
}

impl ShaderSources {
    /// Starts from the built-in pass-through shaders and swaps in any stage that has a file.
    pub fn load(vertex: Option<&Path>, fragment: Option<&Path>) -> Result<Self, GlError> {
        let mut sources = Self::default();

        if let Some(path) = vertex {
            sources.vertex = read_source(path)?;
        }
        if let Some(path) = fragment {
            sources.fragment = read_source(path)?;
        }

        Ok(sources)
    }
}

fn read_source(path: &Path) -> Result<String, GlError> {
    log::info!("Loading shader {}", path.display());

    fs::read_to_string(path).map_err(|source| GlError::Source {
        path: path.to_path_buf(),
        source,
    })
}
