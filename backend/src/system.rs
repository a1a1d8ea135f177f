use sdl2::event::Event;
use sdl2::mouse::MouseButton;
use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};
use sdl2::{EventPump, Sdl, TimerSubsystem, VideoSubsystem};
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::EngineConfig;
use super::error::EngineError;
use super::glutils::NativeGl;
use super::time::TimeSource;

/// Native window identifier handed to input callbacks.
pub type WindowHandle = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonId {
    Left,
    Right,
    Middle,
    Other(u8),
}

impl From<MouseButton> for MouseButtonId {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => MouseButtonId::Left,
            MouseButton::Right => MouseButtonId::Right,
            MouseButton::Middle => MouseButtonId::Middle,
            MouseButton::X1 => MouseButtonId::Other(4),
            MouseButton::X2 => MouseButtonId::Other(5),
            MouseButton::Unknown => MouseButtonId::Other(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

/// Receiver for raw device events. The engine forwards events as they
/// arrive and never interprets them.
pub trait InputListener {
    fn cursor_position(&mut self, window: WindowHandle, x: f64, y: f64) {
        let _ = (window, x, y);
    }

    fn mouse_button(&mut self, window: WindowHandle, button: MouseButtonId, action: Action) {
        let _ = (window, button, action);
    }

    fn scroll(&mut self, window: WindowHandle, dx: f64, dy: f64) {
        let _ = (window, dx, dy);
    }

    /// `mods` is the raw modifier bit set.
    fn key(&mut self, window: WindowHandle, scancode: i32, action: Action, mods: u16) {
        let _ = (window, scancode, action, mods);
    }
}

/// Window, presentation and input pumping as seen by the frame loop.
pub trait Platform: TimeSource {
    /// Drains pending events. Returns `false` once a close was requested.
    fn poll_events(&mut self) -> bool;

    /// Presents the back buffer. Blocks for vsync when enabled.
    fn swap_buffers(&mut self);

    /// Releases input listeners, then the window, then the subsystem.
    fn shutdown(self)
    where
        Self: Sized;
}

static CONTEXT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Held while a platform exists; there is at most one per process.
struct ContextGuard;

impl ContextGuard {
    fn acquire() -> Result<ContextGuard, EngineError> {
        CONTEXT_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ContextGuard)
            .map_err(|_| EngineError::AlreadyInitialized)
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CONTEXT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// SDL2 window with an OpenGL 3.3 core context.
///
/// Fields drop in declaration order, which is also the teardown order.
pub struct SdlPlatform {
    listener: Box<dyn InputListener>,
    gl_ctx: GLContext,
    window: Window,
    event_pump: EventPump,
    timer: TimerSubsystem,
    video_subsystem: VideoSubsystem,
    sdl_context: Sdl,
    close_requested: bool,
    _guard: ContextGuard,
}

fn platform_err(what: &str, e: impl std::fmt::Display) -> EngineError {
    EngineError::Platform(format!("{what}: {e}"))
}

impl SdlPlatform {
    /// Creates the window and context and loads the GL function table.
    pub fn new(
        config: &EngineConfig,
        listener: Box<dyn InputListener>,
    ) -> Result<(SdlPlatform, NativeGl), EngineError> {
        let guard = ContextGuard::acquire()?;

        let sdl_context = sdl2::init().map_err(|e| platform_err("SDL init", e))?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|e| platform_err("video subsystem", e))?;
        let timer = sdl_context
            .timer()
            .map_err(|e| platform_err("timer subsystem", e))?;
        log::info!("SDL {}", sdl2::version::version());

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let mut window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .hidden()
            .resizable()
            .maximized()
            .build()
            .map_err(|e| platform_err("Error while building OpenGL window", e))?;

        let event_pump = sdl_context
            .event_pump()
            .map_err(|e| platform_err("event pump", e))?;
        log::debug!("input listener registered");

        let gl_ctx = window
            .gl_create_context()
            .map_err(|e| platform_err("GL context", e))?;
        window
            .gl_make_current(&gl_ctx)
            .map_err(|e| platform_err("make GL context current", e))?;

        if let Err(e) = video_subsystem.gl_set_swap_interval(SwapInterval::VSync) {
            log::warn!("vsync unavailable: {e}");
        }

        window.show();

        let gl = NativeGl::load(|name| video_subsystem.gl_get_proc_address(name) as *const _);
        gl.log_gl_info();

        debug_assert_eq!(gl_attr.context_profile(), GLProfile::Core);
        debug_assert_eq!(gl_attr.context_version(), (3, 3));

        log::info!(
            "window '{}' {}x{} created",
            config.title,
            config.width,
            config.height
        );

        let platform = SdlPlatform {
            listener,
            gl_ctx,
            window,
            event_pump,
            timer,
            video_subsystem,
            sdl_context,
            close_requested: false,
            _guard: guard,
        };
        Ok((platform, gl))
    }
}

fn dispatch(listener: &mut dyn InputListener, event: Event) -> bool {
    match event {
        Event::Quit { .. } => return true,
        Event::MouseMotion {
            window_id, x, y, ..
        } => listener.cursor_position(window_id, x as f64, y as f64),
        Event::MouseButtonDown {
            window_id,
            mouse_btn,
            ..
        } => listener.mouse_button(window_id, mouse_btn.into(), Action::Press),
        Event::MouseButtonUp {
            window_id,
            mouse_btn,
            ..
        } => listener.mouse_button(window_id, mouse_btn.into(), Action::Release),
        Event::MouseWheel {
            window_id, x, y, ..
        } => listener.scroll(window_id, x as f64, y as f64),
        Event::KeyDown {
            window_id,
            scancode,
            keymod,
            repeat,
            ..
        } => {
            let action = if repeat { Action::Repeat } else { Action::Press };
            let code = scancode.map_or(0, |s| s as i32);
            listener.key(window_id, code, action, keymod.bits());
        }
        Event::KeyUp {
            window_id,
            scancode,
            keymod,
            ..
        } => {
            let code = scancode.map_or(0, |s| s as i32);
            listener.key(window_id, code, Action::Release, keymod.bits());
        }
        _ => {}
    }
    false
}

impl TimeSource for SdlPlatform {
    fn now(&mut self) -> f64 {
        self.timer.performance_counter() as f64 / self.timer.performance_frequency() as f64
    }
}

impl Platform for SdlPlatform {
    fn poll_events(&mut self) -> bool {
        let listener = self.listener.as_mut();
        for event in self.event_pump.poll_iter() {
            if dispatch(listener, event) {
                self.close_requested = true;
            }
        }
        !self.close_requested
    }

    fn swap_buffers(&mut self) {
        self.window.gl_swap_window();
    }

    fn shutdown(self) {
        let SdlPlatform {
            listener,
            gl_ctx,
            window,
            event_pump,
            timer,
            video_subsystem,
            sdl_context,
            _guard: guard,
            ..
        } = self;

        drop(listener);
        log::debug!("input listeners released");

        drop(gl_ctx);
        drop(window);
        log::debug!("window destroyed");

        drop(event_pump);
        drop(timer);
        drop(video_subsystem);
        drop(sdl_context);
        log::info!("SDL terminated");

        drop(guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching CONTEXT_ACTIVE; a second one would race with it.
    #[test]
    fn second_context_is_refused_until_the_first_is_dropped() {
        let first = ContextGuard::acquire().unwrap();
        assert!(matches!(
            ContextGuard::acquire(),
            Err(EngineError::AlreadyInitialized)
        ));

        drop(first);
        let again = ContextGuard::acquire();
        assert!(again.is_ok());
    }

    #[test]
    fn mouse_buttons_map_to_ids() {
        assert_eq!(MouseButtonId::from(MouseButton::Left), MouseButtonId::Left);
        assert_eq!(MouseButtonId::from(MouseButton::X2), MouseButtonId::Other(5));
    }
}
