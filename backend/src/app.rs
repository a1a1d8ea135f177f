use super::config::EngineConfig;
use super::error::EngineError;
use super::glutils::{check_gl_err, Gl};
use super::scene::{Scene, SceneId};
use super::system::Platform;
use super::time::FrameTimer;

/// Owns the graphics context, the current scene slot and the frame loop.
///
/// Construct it with an already created platform and GL handle, then call
/// `run`. Everything that can fail during setup comes back as an
/// `EngineError`; whether that ends the process is the caller's call.
pub struct Application<P: Platform, G: Gl> {
    config: EngineConfig,
    platform: P,
    gl: G,
    scene: Option<Box<dyn Scene>>,
}

impl<P: Platform, G: Gl> Application<P, G> {
    pub fn new(config: EngineConfig, platform: P, gl: G) -> Self {
        Self {
            config,
            platform,
            gl,
            scene: None,
        }
    }

    pub fn current_scene(&self) -> Option<SceneId> {
        self.scene.as_ref().map(|s| s.id())
    }

    /// Selects the configured initial scene.
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.change_scene(self.config.initial_scene)?;
        check_gl_err(&self.gl)?;
        Ok(())
    }

    /// `init`, the frame loop, then teardown. Teardown runs even when
    /// `init` fails.
    pub fn run(mut self) -> Result<(), EngineError> {
        let result = self.init().map(|()| {
            let frames = self.run_loop();
            log::info!("frame loop ended after {} frames", frames);
        });
        self.teardown();
        result
    }

    /// Runs frames until the platform reports a close request. Returns the
    /// number of presented frames.
    pub fn run_loop(&mut self) -> u64 {
        let mut timer = FrameTimer::start(self.platform.now());

        while self.platform.poll_events() {
            self.gl.clear(self.config.clear_color);

            if let Some(dt) = timer.delta() {
                if let Some(scene) = self.scene.as_mut() {
                    scene.update(&mut self.gl, dt);
                }
            }

            self.platform.swap_buffers();
            timer.end_frame(self.platform.now());
            log::trace!("frame {} done", timer.frame_index());
        }
        timer.frame_index()
    }

    /// Switches to scene `id`. An unknown id is rejected before anything
    /// changes; otherwise the current scene is torn down first and the new
    /// one is built and initialized.
    pub fn change_scene(&mut self, id: u32) -> Result<(), EngineError> {
        let id = SceneId::try_from(id)?;

        if let Some(mut old) = self.scene.take() {
            log::info!("leaving scene {:?}", old.id());
            old.teardown(&mut self.gl);
        }

        let mut scene = id.build();
        if let Err(e) = scene.init(&mut self.gl, &self.config) {
            scene.teardown(&mut self.gl);
            log::debug!("scene {:?} failed to initialize, slot left empty", id);
            return Err(e);
        }

        log::info!("entered scene {:?}", id);
        self.scene = Some(scene);
        Ok(())
    }

    fn teardown(mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.teardown(&mut self.gl);
        }
        self.platform.shutdown();
    }
}
