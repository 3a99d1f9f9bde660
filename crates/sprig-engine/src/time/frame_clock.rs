use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Time since the clock was created, in seconds.
    pub elapsed: f32,

    /// Exponentially smoothed frames per second.
    pub fps: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Per-window frame clock.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce a giant step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    fps: f32,
    dt_min: Duration,
    dt_max: Duration,
}

/// Weight of the newest sample in the fps average.
const FPS_SMOOTHING: f32 = 0.05;

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            fps: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock to now.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();
        self.last = now;

        let instant_fps = 1.0 / dt;
        self.fps = if self.frame_index == 0 {
            instant_fps
        } else {
            self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
        };

        let ft = FrameTime {
            dt,
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            fps: self.fps,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::new();
        let t0 = clock.last;
        assert_abs_diff_eq!(clock.tick_at(t0).dt, 0.0001, epsilon = 1e-6);
        assert_abs_diff_eq!(clock.tick_at(t0 + Duration::from_secs(5)).dt, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn frame_index_and_fps_advance() {
        let mut clock = FrameClock::new();
        let t0 = clock.last;
        let mut last = None;
        for i in 1..=10u32 {
            last = Some(clock.tick_at(t0 + Duration::from_millis(10) * i));
        }
        let ft = last.unwrap();
        assert_eq!(ft.frame_index, 9);
        assert_abs_diff_eq!(ft.fps, 100.0, epsilon = 0.5);
        assert_abs_diff_eq!(ft.elapsed, 0.1, epsilon = 1e-4);
    }
}
