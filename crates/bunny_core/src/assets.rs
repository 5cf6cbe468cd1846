//! Asset handles and the host-side loading seam.
//!
//! Handles are cheap keys (the asset path relative to the asset root). The
//! host owns the decoded data: GPU textures live in the renderer, sound data
//! in the audio backend. Programs only ever hold handles.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(Arc<str>);

impl TextureHandle {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundHandle(Arc<str>);

impl SoundHandle {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

/// Synchronous load-or-fail asset access offered to `Program::load`.
pub trait AssetLoader {
    fn texture(&mut self, path: &str) -> Result<TextureHandle, String>;
    fn sound(&mut self, path: &str) -> Result<SoundHandle, String>;
}

/// Fire-and-forget playback requests. The host drains the queue after the
/// callback returns and hands each request to its mixer.
#[derive(Debug, Default)]
pub struct AudioQueue {
    pending: Vec<SoundHandle>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self, sound: &SoundHandle) {
        self.pending.push(sound.clone());
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, SoundHandle> {
        self.pending.drain(..)
    }
}

pub fn resolve_asset_path(root: &Path, path: &str) -> PathBuf {
    root.join(path)
}

/// Loader that never touches the disk or the GPU. Every path resolves unless
/// it was registered as missing, which lets tests and headless runs exercise
/// the startup failure path.
#[derive(Debug, Default)]
pub struct HeadlessAssets {
    missing: HashSet<String>,
}

impl HeadlessAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, path: &str) -> Self {
        self.missing.insert(path.to_string());
        self
    }

    fn check(&self, kind: &str, path: &str) -> Result<(), String> {
        if self.missing.contains(path) {
            return Err(format!("Failed to load {kind} '{path}': not found"));
        }
        Ok(())
    }
}

impl AssetLoader for HeadlessAssets {
    fn texture(&mut self, path: &str) -> Result<TextureHandle, String> {
        self.check("texture", path)?;
        Ok(TextureHandle::new(path))
    }

    fn sound(&mut self, path: &str) -> Result<SoundHandle, String> {
        self.check("sound", path)?;
        Ok(SoundHandle::new(path))
    }
}
