use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// show up as one enormous frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the clock baseline (e.g. when the render loop restarts).
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Average frame rate over fixed-size windows of frames.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window: u32,
    frames: u32,
    elapsed: f32,
}

impl FpsMeter {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Records one frame; returns the average FPS whenever a window completes.
    pub fn record(&mut self, ft: &FrameTime) -> Option<f32> {
        self.frames += 1;
        self.elapsed += ft.dt;
        if self.frames < self.window {
            return None;
        }

        let fps = self.frames as f32 / self.elapsed.max(f32::EPSILON);
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dt: f32) -> FrameTime {
        FrameTime {
            dt,
            frame_index: 0,
        }
    }

    #[test]
    fn tick_clamps_and_counts() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(10));
        let first = clock.tick();
        assert_eq!(first.frame_index, 0);
        assert!(first.dt >= 0.005 && first.dt <= 0.010);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn fps_reported_once_per_window() {
        let mut meter = FpsMeter::new(4);
        for _ in 0..3 {
            assert_eq!(meter.record(&frame(0.02)), None);
        }
        let fps = meter.record(&frame(0.02)).unwrap_or_default();
        assert!((fps - 50.0).abs() < 1e-3);
        assert_eq!(meter.record(&frame(0.02)), None);
    }
}
