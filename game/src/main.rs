use anyhow::Context;
use backend::app::Application;
use backend::config::EngineConfig;
use backend::logging::{init_logging, LoggingConfig};
use backend::system::{Action, InputListener, MouseButtonId, SdlPlatform, WindowHandle};
use std::path::{Path, PathBuf};

/// Traces raw input; the engine itself does not act on it.
struct InputTrace;

impl InputListener for InputTrace {
    fn cursor_position(&mut self, window: WindowHandle, x: f64, y: f64) {
        log::trace!("window {window}: cursor ({x}, {y})");
    }

    fn mouse_button(&mut self, window: WindowHandle, button: MouseButtonId, action: Action) {
        log::trace!("window {window}: {button:?} {action:?}");
    }

    fn scroll(&mut self, window: WindowHandle, dx: f64, dy: f64) {
        log::trace!("window {window}: scroll ({dx}, {dy})");
    }

    fn key(&mut self, window: WindowHandle, scancode: i32, action: Action, mods: u16) {
        log::trace!("window {window}: key {scancode} {action:?} mods {mods:#x}");
    }
}

/// Prefers `relative` next to the executable, so an installed binary finds
/// its assets from any working directory; otherwise keeps it as given.
fn resolve_beside_exe(exe: Option<&Path>, relative: &Path) -> PathBuf {
    exe.and_then(Path::parent)
        .map(|dir| dir.join(relative))
        .filter(|candidate| candidate.is_dir())
        .unwrap_or_else(|| relative.to_path_buf())
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let defaults = EngineConfig::default();
    let exe = std::env::current_exe().ok();
    let shader_dir = resolve_beside_exe(exe.as_deref(), &defaults.shader_dir);
    log::debug!("shader directory {}", shader_dir.display());
    let config = EngineConfig {
        shader_dir,
        ..defaults
    };

    let (platform, gl) = SdlPlatform::new(&config, Box::new(InputTrace))
        .context("Game initialization failure")?;

    Application::new(config, platform, gl)
        .run()
        .context("engine stopped with an error")
}
