//! Data-driven update step for the demo state.
//!
//! Every demo variant shares one state machine. A `ControlScheme` lists which
//! axes are live, the key pair driving each one and its rate; the scroll wheel
//! always feeds the offset. Each axis accumulates independently:
//!
//!   field += (positive_held - negative_held) * rate * dt
//!
//! so holding both keys of a pair is an exact no-op and nothing is clamped.
//! The offset is unbounded and kept in f64; every step is computed in f64 and
//! camera fields are narrowed to f32 once per step.

use std::f64::consts::PI;

use bunny_core::{Camera, InputState};
use serde::Deserialize;

pub const PAN_RATE: f64 = 100.0;
pub const OFFSET_RATE: f64 = 100.0;
pub const ROTATION_RATE: f64 = PI;
pub const ZOOM_RATE: f64 = 1.0;
/// Offset change per scroll unit, applied once per frame regardless of dt.
pub const SCROLL_RATE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoState {
    pub camera: Camera,
    /// Phase of the diagonal sprite grid.
    pub offset: f64,
}

impl DemoState {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(),
            offset: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.camera.is_finite() && self.offset.is_finite()
    }
}

impl Default for DemoState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisTarget {
    CameraX,
    CameraY,
    Offset,
    Rotation,
    Zoom,
}

impl AxisTarget {
    pub fn default_rate(self) -> f64 {
        match self {
            Self::CameraX | Self::CameraY => PAN_RATE,
            Self::Offset => OFFSET_RATE,
            Self::Rotation => ROTATION_RATE,
            Self::Zoom => ZOOM_RATE,
        }
    }

    fn add(self, state: &mut DemoState, delta: f64) {
        match self {
            Self::CameraX => nudge(&mut state.camera.position.x, delta),
            Self::CameraY => nudge(&mut state.camera.position.y, delta),
            Self::Offset => state.offset += delta,
            Self::Rotation => nudge(&mut state.camera.rotation, delta),
            Self::Zoom => nudge(&mut state.camera.zoom, delta),
        }
    }
}

fn nudge(field: &mut f32, delta: f64) {
    *field = (*field as f64 + delta) as f32;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AxisBinding {
    pub target: AxisTarget,
    /// Key code that decreases the field.
    pub negative: String,
    /// Key code that increases the field.
    pub positive: String,
    #[serde(default)]
    pub rate: Option<f64>,
}

impl AxisBinding {
    pub fn new(target: AxisTarget, negative: &str, positive: &str) -> Self {
        Self {
            target,
            negative: negative.to_string(),
            positive: positive.to_string(),
            rate: None,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate.unwrap_or_else(|| self.target.default_rate())
    }

    /// -1, 0 or +1 depending on which keys of the pair are held.
    pub fn direction(&self, input: &InputState) -> f64 {
        let positive = input.key_down(&self.positive) as i8;
        let negative = input.key_down(&self.negative) as i8;
        (positive - negative) as f64
    }
}

fn default_scroll_rate() -> f64 {
    SCROLL_RATE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlScheme {
    pub axes: Vec<AxisBinding>,
    #[serde(default = "default_scroll_rate")]
    pub scroll_rate: f64,
}

impl ControlScheme {
    /// Up/down drive the offset, left/right rotate, minus/equal zoom.
    pub fn basic() -> Self {
        Self {
            axes: vec![
                AxisBinding::new(AxisTarget::Offset, "ArrowDown", "ArrowUp"),
                AxisBinding::new(AxisTarget::Rotation, "ArrowLeft", "ArrowRight"),
                AxisBinding::new(AxisTarget::Zoom, "Minus", "Equal"),
            ],
            scroll_rate: SCROLL_RATE,
        }
    }

    /// Arrow keys pan the camera; the offset, rotation and zoom move to letter
    /// and punctuation pairs.
    pub fn explorer() -> Self {
        Self {
            axes: vec![
                AxisBinding::new(AxisTarget::CameraY, "ArrowDown", "ArrowUp"),
                AxisBinding::new(AxisTarget::CameraX, "ArrowLeft", "ArrowRight"),
                AxisBinding::new(AxisTarget::Offset, "KeyS", "KeyW"),
                AxisBinding::new(AxisTarget::Rotation, "KeyQ", "KeyE"),
                AxisBinding::new(AxisTarget::Zoom, "Minus", "Equal"),
            ],
            scroll_rate: SCROLL_RATE,
        }
    }

    pub fn step(&self, state: &mut DemoState, input: &InputState, dt: f32) {
        for axis in &self.axes {
            let direction = axis.direction(input);
            if direction != 0.0 {
                axis.target.add(state, direction * axis.rate() * dt as f64);
            }
        }

        let scroll_y = input.scroll().y as f64;
        if scroll_y != 0.0 {
            state.offset -= scroll_y * self.scroll_rate;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (index, axis) in self.axes.iter().enumerate() {
            if axis.negative.is_empty() || axis.positive.is_empty() {
                return Err(format!("Axis {index} ({:?}) has an empty key code", axis.target));
            }
            if axis.negative == axis.positive {
                return Err(format!(
                    "Axis {index} ({:?}) binds '{}' to both directions",
                    axis.target, axis.negative
                ));
            }
            if !axis.rate().is_finite() {
                return Err(format!("Axis {index} ({:?}) has a non-finite rate", axis.target));
            }
        }
        if !self.scroll_rate.is_finite() {
            return Err("scroll_rate must be finite".to_string());
        }
        Ok(())
    }
}
