//! Scene submission for a single frame.
//!
//! Programs call `set_camera` and `sprite` from their draw callback. Each
//! command captures the camera that was active when it was submitted, so a
//! program can switch cameras mid-frame (e.g. world sprites, then a HUD).

use glam::Vec2;

use crate::assets::TextureHandle;
use crate::camera::Camera;
use crate::color::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCommand {
    pub texture: TextureHandle,
    pub position: Vec2,
    pub rotation: Option<f32>,
    pub scale: Option<Vec2>,
    pub tint: Option<Color>,
    pub camera: Camera,
}

impl SpriteCommand {
    pub fn rotation_or_default(&self) -> f32 {
        self.rotation.unwrap_or(0.0)
    }

    pub fn scale_or_default(&self) -> Vec2 {
        self.scale.unwrap_or(Vec2::ONE)
    }

    pub fn tint_or_default(&self) -> Color {
        self.tint.unwrap_or(Color::WHITE)
    }
}

#[derive(Debug, Default)]
pub struct DrawQueue {
    camera: Option<Camera>,
    commands: Vec<SpriteCommand>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` restores the default (identity) camera.
    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn sprite(
        &mut self,
        texture: &TextureHandle,
        position: Vec2,
        rotation: Option<f32>,
        scale: Option<Vec2>,
        tint: Option<Color>,
    ) {
        self.commands.push(SpriteCommand {
            texture: texture.clone(),
            position,
            rotation,
            scale,
            tint,
            camera: self.camera.unwrap_or_default(),
        });
    }

    pub fn commands(&self) -> &[SpriteCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops last frame's commands and camera. Call before the draw callback.
    pub fn begin_frame(&mut self) {
        self.camera = None;
        self.commands.clear();
    }
}
