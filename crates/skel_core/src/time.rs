use std::time::Instant;

/// Wall-clock frame timer for animation playback.
///
/// `delta` is capped at `max_delta` so a stall (window drag, breakpoint) does
/// not make animations jump. `total_time` accumulates the uncapped time.
pub struct TimeKeeper {
    pub max_delta: f32,
    pub frames_per_second: f32,
    pub delta: f32,
    pub total_time: f32,

    last_instant: Instant,
    frame_count: u32,
    frame_time: f32,
}

impl TimeKeeper {
    pub fn new() -> Self {
        Self {
            max_delta: 0.064,
            frames_per_second: 0.0,
            delta: 0.0,
            total_time: 0.0,
            last_instant: Instant::now(),
            frame_count: 0,
            frame_time: 0.0,
        }
    }

    /// Measures the time since the previous call.
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Steps the timer by `elapsed` seconds without reading the clock.
    pub fn advance(&mut self, elapsed: f32) {
        self.delta = elapsed;
        self.frame_time += elapsed;
        self.total_time += elapsed;
        if self.delta > self.max_delta {
            log::warn!(
                "Frame took {:.1}ms, capping animation delta to {:.1}ms",
                self.delta * 1000.0,
                self.max_delta * 1000.0
            );
            self.delta = self.max_delta;
        }

        self.frame_count += 1;
        if self.frame_time > 1.0 {
            self.frames_per_second = self.frame_count as f32 / self.frame_time;
            self.frame_time = 0.0;
            self.frame_count = 0;
        }
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}
