//! Demo variants as data.
//!
//! The three built-in presets differ only in their control scheme and in how
//! the grid and pointer sprites are styled. Custom variants load from JSON with
//! the same shape:
//!
//! ```json
//! {
//!   "name": "custom",
//!   "sprite": "bunny.png",
//!   "controls": { "axes": [{ "target": "offset", "negative": "KeyS", "positive": "KeyW" }] },
//!   "grid": { "rotate": true, "tint": { "r": 1.0, "g": 0.5, "b": 0.5 } },
//!   "pointer": { "space": "world" },
//!   "view_size": [640.0, 360.0],
//!   "volume": 0.5
//! }
//! ```

use std::fs;
use std::path::Path;

use bunny_core::Color;
use glam::Vec2;
use serde::Deserialize;

use crate::controls::ControlScheme;

pub const PRESET_NAMES: [&str; 3] = ["basic", "tinted", "explorer"];
pub const DEFAULT_SPRITE: &str = "bunny.png";
pub const DEFAULT_SOUND: &str = "drumloop.wav";
pub const DEFAULT_SCRIPT: &str = "scripts/bunnies.lua";

fn default_sprite() -> String {
    DEFAULT_SPRITE.to_string()
}

fn default_rotate() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridStyle {
    #[serde(default = "default_rotate")]
    pub rotate: bool,
    #[serde(default)]
    pub scale: Option<[f32; 2]>,
    #[serde(default)]
    pub tint: Option<Color>,
}

impl GridStyle {
    pub fn scale_vec(&self) -> Option<Vec2> {
        self.scale.map(Vec2::from)
    }
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            rotate: true,
            scale: None,
            tint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSpace {
    /// Raw mouse pixels used as world coordinates.
    #[default]
    Screen,
    /// Mouse projected through the camera, so the sprite sits under the cursor.
    World,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PointerStyle {
    #[serde(default)]
    pub space: PointerSpace,
    #[serde(default)]
    pub tint: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemoConfig {
    pub name: String,
    #[serde(default = "default_sprite")]
    pub sprite: String,
    /// Played once after load when present.
    #[serde(default)]
    pub sound: Option<String>,
    pub controls: ControlScheme,
    #[serde(default)]
    pub grid: GridStyle,
    #[serde(default)]
    pub pointer: PointerStyle,
    /// Lua control script, relative to the asset root.
    #[serde(default)]
    pub script: Option<String>,
    /// Fixed logical camera size; `None` follows the window.
    #[serde(default)]
    pub view_size: Option<[f32; 2]>,
    /// Linear master volume.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl DemoConfig {
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            sprite: default_sprite(),
            sound: None,
            controls: ControlScheme::basic(),
            grid: GridStyle::default(),
            pointer: PointerStyle::default(),
            script: Some(DEFAULT_SCRIPT.to_string()),
            view_size: None,
            volume: default_volume(),
        }
    }

    pub fn tinted() -> Self {
        Self {
            name: "tinted".to_string(),
            sprite: default_sprite(),
            sound: Some(DEFAULT_SOUND.to_string()),
            controls: ControlScheme::basic(),
            grid: GridStyle {
                rotate: true,
                scale: None,
                tint: Some(Color::rgb(1.0, 0.75, 0.8)),
            },
            pointer: PointerStyle {
                space: PointerSpace::Screen,
                tint: Some(Color::rgb(1.0, 0.85, 0.2)),
            },
            script: None,
            view_size: None,
            volume: default_volume(),
        }
    }

    pub fn explorer() -> Self {
        Self {
            name: "explorer".to_string(),
            sprite: default_sprite(),
            sound: Some(DEFAULT_SOUND.to_string()),
            controls: ControlScheme::explorer(),
            grid: GridStyle {
                rotate: true,
                scale: Some([1.5, 1.5]),
                tint: None,
            },
            pointer: PointerStyle {
                space: PointerSpace::World,
                tint: Some(Color::rgba(0.4, 1.0, 0.6, 0.8)),
            },
            script: None,
            view_size: None,
            volume: default_volume(),
        }
    }

    pub fn preset(name: &str) -> Result<Self, String> {
        match name {
            "basic" => Ok(Self::basic()),
            "tinted" => Ok(Self::tinted()),
            "explorer" => Ok(Self::explorer()),
            other => Err(format!(
                "Unknown variant '{other}' (expected one of: {})",
                PRESET_NAMES.join(", ")
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Variant name must not be empty".to_string());
        }
        if self.sprite.trim().is_empty() {
            return Err(format!("Variant '{}' has an empty sprite path", self.name));
        }
        if matches!(&self.sound, Some(sound) if sound.trim().is_empty()) {
            return Err(format!("Variant '{}' has an empty sound path", self.name));
        }
        if let Some(size) = self.view_size {
            if !size.iter().all(|s| s.is_finite() && *s > 0.0) {
                return Err(format!("Variant '{}' view_size must be positive", self.name));
            }
        }
        if !(self.volume.is_finite() && self.volume >= 0.0) {
            return Err(format!(
                "Variant '{}' volume must be finite and >= 0",
                self.name
            ));
        }
        if let Some(scale) = self.grid.scale {
            if !scale.iter().all(|s| s.is_finite()) {
                return Err(format!("Variant '{}' has a non-finite grid scale", self.name));
            }
        }
        self.controls
            .validate()
            .map_err(|e| format!("Variant '{}' controls: {e}", self.name))
    }
}

pub fn load_config_from_path(path: &Path) -> Result<DemoConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read variant file {}: {e}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse variant JSON {}: {e}", path.display()))?;
    config.validate()?;
    Ok(config)
}
