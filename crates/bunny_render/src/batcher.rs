//! Turns a frame's `SpriteCommand`s into GPU instances.
//!
//! Each command becomes one `SpriteInstance` whose transform is the command's
//! camera view-projection times its model matrix. Consecutive commands that
//! share a texture collapse into one `DrawRun`, so a frame of same-texture
//! sprites costs a single bind and a single instanced draw.

use bunny_core::{Camera, SpriteCommand, TextureHandle};
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::sprite_pipeline::SpritePipeline;
use crate::texture::TextureCache;
use crate::vertex::{SpriteInstance, QUAD_INDICES};

const INITIAL_INSTANCE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRun {
    pub texture: TextureHandle,
    pub instance_start: u32,
    pub instance_count: u32,
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub instances: Vec<SpriteInstance>,
    pub runs: Vec<DrawRun>,
}

impl SpriteBatch {
    pub fn clear(&mut self) {
        self.instances.clear();
        self.runs.clear();
    }

    /// Appends one instance, extending the last run when the texture matches.
    pub fn push(&mut self, texture: &TextureHandle, instance: SpriteInstance) {
        let index = self.instances.len() as u32;
        self.instances.push(instance);
        if let Some(last) = self.runs.last_mut() {
            if last.texture == *texture && last.instance_start + last.instance_count == index {
                last.instance_count += 1;
                return;
            }
        }
        self.runs.push(DrawRun {
            texture: texture.clone(),
            instance_start: index,
            instance_count: 1,
        });
    }

    pub fn rebuild(
        &mut self,
        commands: &[SpriteCommand],
        viewport: Vec2,
        texture_size: impl Fn(&TextureHandle) -> Vec2,
    ) {
        self.clear();
        let mut cached: Option<(Camera, Mat4)> = None;
        for command in commands {
            let view_projection = match cached {
                Some((camera, matrix)) if camera == command.camera => matrix,
                _ => {
                    let matrix = command.camera.view_projection(viewport);
                    cached = Some((command.camera, matrix));
                    matrix
                }
            };
            let model = model_matrix(
                command.position,
                command.rotation_or_default(),
                command.scale_or_default(),
                texture_size(&command.texture),
            );
            self.push(
                &command.texture,
                SpriteInstance {
                    transform: (view_projection * model).to_cols_array_2d(),
                    color: command.tint_or_default().as_array(),
                },
            );
        }
    }
}

pub fn build_batch(
    commands: &[SpriteCommand],
    viewport: Vec2,
    texture_size: impl Fn(&TextureHandle) -> Vec2,
) -> SpriteBatch {
    let mut batch = SpriteBatch::default();
    batch.rebuild(commands, viewport, texture_size);
    batch
}

/// translation * rotation * scale, where the unit quad is scaled up to the
/// texture's pixel size before the sprite's own scale applies.
pub fn model_matrix(position: Vec2, rotation: f32, scale: Vec2, texture_size: Vec2) -> Mat4 {
    let size = texture_size * scale;
    Mat4::from_scale_rotation_translation(
        Vec3::new(size.x, size.y, 1.0),
        Quat::from_rotation_z(rotation),
        Vec3::new(position.x, position.y, 0.0),
    )
}

fn grown_capacity(current: usize, required: usize) -> usize {
    if required <= current {
        current
    } else {
        required.next_power_of_two()
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    let byte_len = (capacity * std::mem::size_of::<SpriteInstance>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Instance Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Owns the instance buffer and replays the batch into a render pass.
pub struct SpriteBatcher {
    batch: SpriteBatch,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
}

impl SpriteBatcher {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            batch: SpriteBatch::default(),
            instance_buffer: create_instance_buffer(device, INITIAL_INSTANCE_CAPACITY),
            capacity: INITIAL_INSTANCE_CAPACITY,
        }
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        commands: &[SpriteCommand],
        viewport: Vec2,
        textures: &TextureCache,
    ) {
        self.batch
            .rebuild(commands, viewport, |handle| textures.size_of(handle));

        let required = self.batch.instances.len();
        let capacity = grown_capacity(self.capacity, required);
        if capacity != self.capacity {
            log::debug!(
                "Growing sprite instance buffer: {} -> {}",
                self.capacity,
                capacity
            );
            self.instance_buffer = create_instance_buffer(device, capacity);
            self.capacity = capacity;
        }
        if required > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.batch.instances),
            );
        }
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &SpritePipeline,
        textures: &TextureCache,
    ) {
        if self.batch.runs.is_empty() {
            return;
        }
        pass.set_pipeline(&pipeline.render_pipeline);
        pass.set_vertex_buffer(0, pipeline.quad_vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(pipeline.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        let index_count = QUAD_INDICES.len() as u32;
        for run in &self.batch.runs {
            let texture = textures.get_or_fallback(&run.texture);
            pass.set_bind_group(0, &texture.bind_group, &[]);
            pass.draw_indexed(
                0..index_count,
                0,
                run.instance_start..run.instance_start + run.instance_count,
            );
        }
    }

    pub fn batch(&self) -> &SpriteBatch {
        &self.batch
    }

    pub fn instance_count(&self) -> usize {
        self.batch.instances.len()
    }

    pub fn run_count(&self) -> usize {
        self.batch.runs.len()
    }
}
