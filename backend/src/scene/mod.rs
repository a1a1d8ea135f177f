//! Scenes: self-contained units of rendering behavior, selected by id.

mod quad;
mod triangle;

pub use quad::QuadScene;
pub use triangle::TriangleScene;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::{GeometryPayload, GpuBufferSet};
use crate::glutils::Gl;
use crate::shaders::ShaderProgram;

/// The closed set of scenes, keyed by the integer id drivers select with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SceneId {
    Quad = 0,
    Triangle = 1,
}

impl TryFrom<u32> for SceneId {
    type Error = EngineError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(SceneId::Quad),
            1 => Ok(SceneId::Triangle),
            other => Err(EngineError::UnknownScene(other)),
        }
    }
}

impl SceneId {
    /// Constructs the (still uninitialized) scene for this id.
    pub fn build(self) -> Box<dyn Scene> {
        match self {
            SceneId::Quad => Box::new(QuadScene::new()),
            SceneId::Triangle => Box::new(TriangleScene::new()),
        }
    }
}

pub trait Scene {
    fn id(&self) -> SceneId;

    /// Loads, compiles and links the shader, then uploads the geometry.
    /// Called exactly once, before the first `update`.
    fn init(&mut self, gl: &mut dyn Gl, config: &EngineConfig) -> Result<(), EngineError>;

    /// Per-frame work. `dt` is the previous frame's duration in seconds.
    fn update(&mut self, gl: &mut dyn Gl, dt: f32);

    /// Releases every GPU object the scene owns. Safe after a failed `init`.
    fn teardown(&mut self, gl: &mut dyn Gl);
}

/// One program plus one buffer set, drawn with the bind / draw / unbind
/// protocol. Shared by the concrete scenes.
#[derive(Debug, Default)]
pub struct SceneResources {
    program: Option<ShaderProgram>,
    buffers: Option<GpuBufferSet>,
}

impl SceneResources {
    pub fn load(
        &mut self,
        gl: &mut dyn Gl,
        config: &EngineConfig,
        shader_file: &str,
        payload: &GeometryPayload,
    ) -> Result<(), EngineError> {
        debug_assert!(
            self.program.is_none() && self.buffers.is_none(),
            "scene resources loaded twice"
        );
        let program = ShaderProgram::from_file_with_policy(
            gl,
            config.shader_path(shader_file),
            config.failure_policy,
        )?;
        self.program = Some(program);
        self.buffers = Some(GpuBufferSet::upload(gl, payload));
        Ok(())
    }

    pub fn draw(&self, gl: &mut dyn Gl) {
        let (Some(program), Some(buffers)) = (&self.program, &self.buffers) else {
            debug_assert!(false, "draw before scene init");
            return;
        };
        program.use_program(gl);
        buffers.draw(gl);
        program.detach(gl);
    }

    pub fn release(&mut self, gl: &mut dyn Gl) {
        if let Some(mut program) = self.program.take() {
            program.release(gl);
        }
        if let Some(buffers) = self.buffers.take() {
            buffers.release(gl);
        }
    }
}
