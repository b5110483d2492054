use std::time::{Duration, Instant};

/// Wall-clock time between consecutive redraws.
pub struct RenderTimer {
    started: Instant,
    last_render_time: Instant,
    frames: u64,
}

impl RenderTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_render_time: now,
            frames: 0,
        }
    }

    /// Time since the previous call (or since construction).
    pub fn get_delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta_time = now - self.last_render_time;
        self.last_render_time = now;
        self.frames += 1;
        delta_time
    }

    /// Average frames per second since the timer was created.
    pub fn average_fps(&self) -> f32 {
        let elapsed = self.started.elapsed().as_secs_f32();
        if elapsed > 0.0 { self.frames as f32 / elapsed } else { 0.0 }
    }
}

impl Default for RenderTimer {
    fn default() -> Self {
        Self::new()
    }
}
