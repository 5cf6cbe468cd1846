//! kira-backed playback for the requests programs queue during `load`.
//!
//! Sound files are decoded up front so a missing or corrupt file fails
//! startup even on machines without an audio device. When the device cannot
//! be opened the system keeps running silently.
//!
//! Master volume is linear (1.0 = unity) and applied to kira's main track in
//! decibels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bunny_core::assets::resolve_asset_path;
use bunny_core::{AudioQueue, SoundHandle};
use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};

/// Linear gain to decibels; zero and below map to negative infinity.
pub fn linear_to_db(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f32::NEG_INFINITY
    }
}

pub struct AudioSystem {
    manager: Option<AudioManager<DefaultBackend>>,
    sounds: HashMap<SoundHandle, StaticSoundData>,
    root: PathBuf,
    volume: f32,
}

impl AudioSystem {
    pub fn new(root: &Path) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(manager) => Some(manager),
            Err(err) => {
                log::warn!("Audio disabled: failed to open output device: {err:?}");
                None
            }
        };
        Self {
            manager,
            sounds: HashMap::new(),
            root: root.to_path_buf(),
            volume: 1.0,
        }
    }

    /// Decodes sounds but never opens a device.
    pub fn disabled(root: &Path) -> Self {
        Self {
            manager: None,
            sounds: HashMap::new(),
            root: root.to_path_buf(),
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
        let db = linear_to_db(self.volume).max(Decibels::SILENCE.0);
        if let Some(manager) = self.manager.as_mut() {
            manager.main_track().set_volume(Decibels(db), Tween::default());
        }
        log::debug!("Master volume {:.2} ({db:.1} dB)", self.volume);
    }

    pub fn loaded_count(&self) -> usize {
        self.sounds.len()
    }

    pub fn load(&mut self, path: &str) -> Result<SoundHandle, String> {
        let handle = SoundHandle::new(path);
        if self.sounds.contains_key(&handle) {
            return Ok(handle);
        }
        let full_path = resolve_asset_path(&self.root, path);
        let data = StaticSoundData::from_file(&full_path)
            .map_err(|e| format!("Failed to load sound '{}': {e}", full_path.display()))?;
        log::info!(
            "Loaded sound '{}' ({:.2}s)",
            path,
            data.duration().as_secs_f64()
        );
        self.sounds.insert(handle.clone(), data);
        Ok(handle)
    }

    /// Plays and clears every queued request.
    pub fn play_queued(&mut self, queue: &mut AudioQueue) {
        for handle in queue.drain() {
            self.play(&handle);
        }
    }

    fn play(&mut self, handle: &SoundHandle) {
        let Some(data) = self.sounds.get(handle) else {
            log::warn!("Play requested for unloaded sound '{}'", handle.key());
            return;
        };
        let Some(manager) = self.manager.as_mut() else {
            log::debug!("Audio disabled, skipping '{}'", handle.key());
            return;
        };
        if let Err(err) = manager.play(data.clone()) {
            log::error!("Failed to play sound '{}': {err:?}", handle.key());
        }
    }
}
