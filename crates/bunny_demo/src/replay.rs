//! Scripted input playback without a window or GPU.
//!
//! A replay file lists frames of held keys, scroll and pointer position. Each
//! entry may repeat; scroll is applied on every repeated frame. The mouse
//! position carries over until a later frame sets it.

use std::fs;
use std::path::Path;

use bunny_core::{
    AudioQueue, DrawQueue, FrameCtx, HeadlessAssets, InputState, Phase, Program, ProgramDriver,
    TimeState,
};
use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 2],
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default)]
    pub scroll_y: f32,
    #[serde(default)]
    pub mouse: Option<[f32; 2]>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Overrides the sequence dt for this entry.
    #[serde(default)]
    pub dt: Option<f32>,
}

impl ReplaySequence {
    /// `count` frames with no input.
    pub fn idle(count: u32) -> Self {
        Self {
            dt: default_dt(),
            viewport: default_viewport(),
            frames: vec![ReplayFrame {
                held: Vec::new(),
                scroll_y: 0.0,
                mouse: None,
                repeat: count.max(1),
                dt: None,
            }],
        }
    }

    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|f| f.repeat.max(1) as u64).sum()
    }

    pub fn viewport_vec(&self) -> Vec2 {
        Vec2::from(self.viewport)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub frames_run: u64,
    pub elapsed: f64,
    /// Draw commands submitted by the final frame.
    pub last_frame_commands: usize,
    /// Sound keys requested during load, in order.
    pub audio_requests: Vec<String>,
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    let dt_ok = |dt: f32| dt.is_finite() && dt >= 0.0;
    if !dt_ok(replay.dt) {
        return Err("Replay validation failed: dt must be finite and >= 0".to_string());
    }
    if !replay.viewport.iter().all(|v| v.is_finite() && *v > 0.0) {
        return Err("Replay validation failed: viewport must be positive".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        if frame.dt.is_some_and(|dt| !dt_ok(dt)) {
            return Err(format!(
                "Replay validation failed: frame {index} dt must be finite and >= 0"
            ));
        }
        if !frame.scroll_y.is_finite() {
            return Err(format!(
                "Replay validation failed: frame {index} scroll_y is not finite"
            ));
        }
    }
    Ok(())
}

/// Starts the program against headless assets (if not yet started), plays
/// every frame, then shuts it down. The driver stays inspectable afterwards.
pub fn run_replay<P: Program>(
    driver: &mut ProgramDriver<P>,
    replay: &ReplaySequence,
    assets: &mut HeadlessAssets,
) -> Result<ReplayReport, String> {
    let mut audio = AudioQueue::new();
    if driver.phase() == Phase::Created {
        driver.start(assets, &mut audio)?;
    }
    let audio_requests = audio.drain().map(|s| s.key().to_string()).collect();

    let viewport = replay.viewport_vec();
    let mut input = InputState::new();
    let mut time = TimeState::new();
    let mut queue = DrawQueue::new();
    let mut frames_run = 0u64;

    for frame in &replay.frames {
        for _ in 0..frame.repeat.max(1) {
            input.set_held(frame.held.iter().map(String::as_str));
            if frame.scroll_y != 0.0 {
                input.add_scroll(Vec2::new(0.0, frame.scroll_y));
            }
            if let Some(mouse) = frame.mouse {
                input.set_mouse_position(Vec2::from(mouse));
            }
            time.advance(frame.dt.unwrap_or(replay.dt) as f64);

            let ctx = FrameCtx {
                dt: time.delta_f32(),
                input: &input,
                viewport,
            };
            if !driver.frame(&ctx, &mut queue) {
                return Err(format!(
                    "Program refused frame {frames_run} in phase {:?}",
                    driver.phase()
                ));
            }
            input.end_frame();
            frames_run += 1;
        }
    }

    driver.shutdown();
    log::debug!("Replay finished after {frames_run} frames");

    Ok(ReplayReport {
        frames_run,
        elapsed: time.total_time,
        last_frame_commands: queue.len(),
        audio_requests,
    })
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_viewport() -> [f32; 2] {
    [1280.0, 720.0]
}

const fn default_repeat() -> u32 {
    1
}
