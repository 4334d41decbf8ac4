use std::thread;
use std::time::{Duration, Instant};

/// Caps the loop at a target frame rate by sleeping away whatever is left of
/// each frame's budget. There is no catch-up: a slow frame is just slow.
pub struct FrameLimiter {
    frame_time: Duration,
    last_frame: Instant,
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_time: Duration::from_secs(1) / fps.max(1),
            last_frame: Instant::now(),
        }
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// How long to sleep when `elapsed` has passed since the last frame.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.frame_time.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Blocks until the frame budget is spent, then starts the next frame.
    /// Returns the time between the previous frame and this one.
    pub fn wait(&mut self) -> Duration {
        if let Some(sleep) = self.remaining(self.last_frame.elapsed()) {
            thread::sleep(sleep);
        }
        let now = Instant::now();
        let took = now - self.last_frame;
        self.last_frame = now;
        took
    }
}
