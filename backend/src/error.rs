use super::geometry::GeometryError;
use super::glutils::GlError;
use super::shaders::ShaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("platform initialization failed: {0}")]
    Platform(String),
    #[error("a graphics context is already active in this process")]
    AlreadyInitialized,
    #[error("unknown scene identifier {0}")]
    UnknownScene(u32),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Gl(#[from] GlError),
}
