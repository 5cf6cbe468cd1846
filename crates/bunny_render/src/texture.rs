use std::collections::HashMap;

use bunny_core::TextureHandle;
use glam::Vec2;

use crate::sprite_pipeline::SpritePipeline;

const CHECKER_SIZE: u32 = 16;
const CHECKER_CELL: u32 = 4;

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Decodes an encoded image (PNG) into an sRGB texture.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, String> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode texture '{label}': {e}"))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self::from_rgba8(device, queue, &image, width, height, label))
    }

    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Magenta/black checkerboard shown in place of textures the renderer never loaded.
    pub fn checkerboard(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let pixels = checkerboard_pixels(CHECKER_SIZE, CHECKER_CELL);
        Self::from_rgba8(device, queue, &pixels, CHECKER_SIZE, CHECKER_SIZE, "fallback_checker")
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

fn checkerboard_pixels(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            if on {
                pixels.extend_from_slice(&[255, 0, 255, 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }
    pixels
}

pub struct GpuSpriteTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// GPU textures keyed by asset handle, plus the fallback used for unknown keys.
pub struct TextureCache {
    textures: HashMap<TextureHandle, GpuSpriteTexture>,
    fallback: GpuSpriteTexture,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, pipeline: &SpritePipeline) -> Self {
        let texture = Texture::checkerboard(device, queue);
        let bind_group = pipeline.create_texture_bind_group(device, &texture);
        Self {
            textures: HashMap::new(),
            fallback: GpuSpriteTexture {
                texture,
                bind_group,
            },
        }
    }

    pub fn contains(&self, handle: &TextureHandle) -> bool {
        self.textures.contains_key(handle)
    }

    pub fn insert(
        &mut self,
        device: &wgpu::Device,
        pipeline: &SpritePipeline,
        handle: TextureHandle,
        texture: Texture,
    ) {
        let bind_group = pipeline.create_texture_bind_group(device, &texture);
        self.textures.insert(
            handle,
            GpuSpriteTexture {
                texture,
                bind_group,
            },
        );
    }

    pub fn get_or_fallback(&self, handle: &TextureHandle) -> &GpuSpriteTexture {
        self.textures.get(handle).unwrap_or(&self.fallback)
    }

    pub fn size_of(&self, handle: &TextureHandle) -> Vec2 {
        self.get_or_fallback(handle).texture.size()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let pixels = checkerboard_pixels(8, 4);
        assert_eq!(pixels.len(), 8 * 8 * 4);
        // (0,0) magenta, (4,0) black, (4,4) magenta.
        assert_eq!(&pixels[0..4], &[255, 0, 255, 255]);
        let at = |x: usize, y: usize| &pixels[(y * 8 + x) * 4..(y * 8 + x) * 4 + 4];
        assert_eq!(at(4, 0), &[0, 0, 0, 255]);
        assert_eq!(at(4, 4), &[255, 0, 255, 255]);
    }
}
