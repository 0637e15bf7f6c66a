//! Frame timing.

use std::time::{Duration, Instant};

/// Tracks per-frame timing. Updated once at the top of every tick.
#[derive(Debug, Clone)]
pub struct Time {
    startup: Instant,
    last_update: Instant,
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.startup;
        self.last_update = now;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Milliseconds since startup. Animation timestamps are in this clock.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames over one-second windows.
///
/// [`FpsCounter::update`] returns `Some(frames)` once per second, at which
/// point the window resets.
#[derive(Debug, Default)]
pub struct FpsCounter {
    accumulated: Duration,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, delta: Duration) -> Option<u32> {
        self.accumulated += delta;
        self.frames += 1;
        if self.accumulated >= Duration::from_secs(1) {
            let fps = self.frames;
            self.accumulated = Duration::ZERO;
            self.frames = 0;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_advances_elapsed() {
        let mut time = Time::new();
        time.update();
        assert_eq!(time.frame_count(), 1);
        assert!(time.elapsed_ms() >= 0.0);
    }

    #[test]
    fn fps_counter_rolls_once_per_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..59 {
            assert_eq!(fps.update(Duration::from_millis(16)), None);
        }
        // 60th frame crosses the one-second mark: 60 * 16ms = 960ms, not yet.
        assert_eq!(fps.update(Duration::from_millis(16)), None);
        assert_eq!(fps.update(Duration::from_millis(40)), Some(61));
        // Window reset.
        assert_eq!(fps.update(Duration::from_millis(16)), None);
    }
}
