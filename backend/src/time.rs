//! Frame timing.

/// Monotonic clock in seconds.
pub trait TimeSource {
    fn now(&mut self) -> f64;
}

/// Frame delta bookkeeping.
///
/// `dt` starts at a negative sentinel, so the first frame reports no delta
/// and no scene update runs before a real interval has been measured.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    begin: f64,
    dt: f32,
    frame_index: u64,
}

impl FrameTimer {
    pub fn start(now: f64) -> Self {
        Self {
            begin: now,
            dt: -1.0,
            frame_index: 0,
        }
    }

    /// Duration of the previous frame, or `None` before one has completed.
    pub fn delta(&self) -> Option<f32> {
        (self.dt >= 0.0).then_some(self.dt)
    }

    /// Closes the current frame at `now`; `now` becomes the next frame's start.
    pub fn end_frame(&mut self, now: f64) {
        self.dt = (now - self.begin) as f32;
        self.begin = now;
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
