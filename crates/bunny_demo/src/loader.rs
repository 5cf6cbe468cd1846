use std::path::Path;

use bunny_core::assets::resolve_asset_path;
use bunny_core::{AssetLoader, SoundHandle, TextureHandle};
use bunny_render::{GpuContext, SpritePipeline, Texture, TextureCache};

use crate::audio::AudioSystem;

/// Loads textures straight onto the GPU and sounds into the mixer.
pub struct GpuAssets<'a> {
    pub root: &'a Path,
    pub gpu: &'a GpuContext,
    pub pipeline: &'a SpritePipeline,
    pub textures: &'a mut TextureCache,
    pub audio: &'a mut AudioSystem,
}

impl AssetLoader for GpuAssets<'_> {
    fn texture(&mut self, path: &str) -> Result<TextureHandle, String> {
        let handle = TextureHandle::new(path);
        if self.textures.contains(&handle) {
            return Ok(handle);
        }
        let full_path = resolve_asset_path(self.root, path);
        let bytes = std::fs::read(&full_path)
            .map_err(|e| format!("Failed to read texture '{}': {e}", full_path.display()))?;
        let texture = Texture::from_bytes(&self.gpu.device, &self.gpu.queue, &bytes, path)?;
        log::info!(
            "Loaded texture '{}' ({}x{})",
            path,
            texture.width,
            texture.height
        );
        self.textures
            .insert(&self.gpu.device, self.pipeline, handle.clone(), texture);
        Ok(handle)
    }

    fn sound(&mut self, path: &str) -> Result<SoundHandle, String> {
        self.audio.load(path)
    }
}
