use super::{Scene, SceneId, SceneResources};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::GeometryPayload;
use crate::glutils::Gl;
use crate::math::Vertex;

const SHADER_FILE: &str = "default.glsl";

// position (x, y, z), color (r, g, b, a)
const VERTICES: [Vertex; 4] = [
    Vertex::new([0.5, -0.5, 0.0], [1.0, 0.9, 0.0, 1.0]), // bottom right
    Vertex::new([-0.5, 0.5, 0.0], [1.0, 1.0, 0.9, 1.0]), // top left
    Vertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 1.0, 1.0]),  // top right
    Vertex::new([-0.5, -0.5, 0.0], [1.0, 1.0, 0.0, 1.0]), // bottom left
];

// counter-clockwise
const INDICES: [u32; 6] = [
    2, 1, 0, // top right triangle
    0, 1, 3, // bottom left triangle
];

/// A colored square. Also reports the frame rate once per second.
#[derive(Debug, Default)]
pub struct QuadScene {
    resources: SceneResources,
    elapsed: f32,
    frames: u32,
}

impl QuadScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payload() -> Result<GeometryPayload, EngineError> {
        Ok(GeometryPayload::new(VERTICES.to_vec(), INDICES.to_vec())?)
    }
}

impl Scene for QuadScene {
    fn id(&self) -> SceneId {
        SceneId::Quad
    }

    fn init(&mut self, gl: &mut dyn Gl, config: &EngineConfig) -> Result<(), EngineError> {
        let payload = Self::payload()?;
        self.resources.load(gl, config, SHADER_FILE, &payload)
    }

    fn update(&mut self, gl: &mut dyn Gl, dt: f32) {
        self.resources.draw(gl);

        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed >= 1.0 {
            log::debug!("quad: {:.1} fps", self.frames as f32 / self.elapsed);
            self.elapsed = 0.0;
            self.frames = 0;
        }
    }

    fn teardown(&mut self, gl: &mut dyn Gl) {
        self.resources.release(gl);
    }
}
