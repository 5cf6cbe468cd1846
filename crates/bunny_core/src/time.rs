use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Delta reported before the first measured frame. Matches the host contract
/// that `delta()` is never negative and is tiny until real frames arrive.
const INITIAL_DELTA: f64 = 1e-7;

/// Variable-timestep frame clock. The host measures wall-clock time once per
/// frame; programs integrate their rates against `delta`.
pub struct TimeState {
    pub delta: f64,
    pub max_delta: f64,
    pub total_time: f64,
    pub frame_count: u64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            delta: INITIAL_DELTA,
            max_delta: 0.25,
            total_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    /// Resets the baseline so time spent before the first frame (window
    /// creation, asset loading) is not reported as a frame delta.
    pub fn reset(&mut self) {
        self.last_instant = Instant::now();
    }

    /// Measures the wall-clock delta since the previous frame.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        // Long stalls (debugger, window drag) would otherwise teleport the camera.
        let dt = if real_dt > self.max_delta {
            log::warn!(
                "Frame took {:.1}ms, capping delta to {}ms",
                real_dt * 1000.0,
                self.max_delta * 1000.0
            );
            self.max_delta
        } else {
            real_dt
        };
        self.advance(dt);
    }

    /// Records a frame of `dt` seconds without consulting the wall clock.
    /// Used by headless replays, where frame timing is scripted.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.delta = dt;
        self.total_time += dt;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn delta_f32(&self) -> f32 {
        self.delta as f32
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_delta_is_tiny_and_positive() {
        let time = TimeState::new();
        assert!(time.delta > 0.0);
        assert!(time.delta < 1e-3);
        assert_eq!(time.frame_count, 0);
    }

    #[test]
    fn advance_accumulates_total_time() {
        let mut time = TimeState::new();
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.frame_count, 2);
        assert!((time.total_time - 0.75).abs() < 1e-12);
        assert!((time.delta - 0.25).abs() < 1e-12);
    }

    #[test]
    fn advance_clamps_negative_delta() {
        let mut time = TimeState::new();
        time.advance(-1.0);
        assert_eq!(time.delta, 0.0);
        assert_eq!(time.total_time, 0.0);
    }

    #[test]
    fn smoothed_fps_converges_to_steady_rate() {
        let mut time = TimeState::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            time.advance(1.0 / 30.0);
        }
        assert!((time.smoothed_fps - 30.0).abs() < 1e-6);
        assert!((time.smoothed_frame_time_ms - 33.333).abs() < 1e-2);
    }

    #[test]
    fn begin_frame_respects_cap() {
        let mut time = TimeState::new();
        time.max_delta = 0.0;
        time.begin_frame();
        assert_eq!(time.delta, 0.0);
        assert_eq!(time.frame_count, 1);
    }
}
