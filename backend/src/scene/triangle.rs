use super::{Scene, SceneId, SceneResources};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::GeometryPayload;
use crate::glutils::Gl;
use crate::math::Vertex;

const SHADER_FILE: &str = "triangle.glsl";

const VERTICES: [Vertex; 3] = [
    Vertex::new([0.0, 0.6, 0.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([-0.6, -0.4, 0.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([0.6, -0.4, 0.0], [0.0, 0.0, 1.0, 1.0]),
];

const INDICES: [u32; 3] = [0, 1, 2];

#[derive(Debug, Default)]
pub struct TriangleScene {
    resources: SceneResources,
}

impl TriangleScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scene for TriangleScene {
    fn id(&self) -> SceneId {
        SceneId::Triangle
    }

    fn init(&mut self, gl: &mut dyn Gl, config: &EngineConfig) -> Result<(), EngineError> {
        let payload = GeometryPayload::new(VERTICES.to_vec(), INDICES.to_vec())?;
        self.resources.load(gl, config, SHADER_FILE, &payload)
    }

    fn update(&mut self, gl: &mut dyn Gl, _dt: f32) {
        self.resources.draw(gl);
    }

    fn teardown(&mut self, gl: &mut dyn Gl) {
        self.resources.release(gl);
    }
}
