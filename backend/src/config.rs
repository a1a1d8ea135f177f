use super::math::Vec4;
use std::path::PathBuf;

/// What to do when a scene's shader cannot be loaded, compiled or linked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Hand the error back to the caller; the binary exits on it.
    #[default]
    FailFast,
    /// Log the diagnostic and keep running with the fallback shader.
    Degrade,
}

/// Compiled-in engine settings. Fields are public so the binary or a test
/// can override individual values.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: Vec4,
    /// Directory the scenes resolve their `.glsl` files against.
    pub shader_dir: PathBuf,
    pub initial_scene: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "Sandbox".to_string(),
            clear_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            shader_dir: PathBuf::from("assets/shaders"),
            initial_scene: 0,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

impl EngineConfig {
    pub fn shader_path(&self, file: &str) -> PathBuf {
        self.shader_dir.join(file)
    }
}
