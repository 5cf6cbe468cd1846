pub mod batcher;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;
pub mod vertex;

pub use batcher::{build_batch, model_matrix, DrawRun, SpriteBatch, SpriteBatcher};
pub use gpu_context::GpuContext;
pub use sprite_pipeline::SpritePipeline;
pub use texture::{GpuSpriteTexture, Texture, TextureCache};
pub use vertex::{QuadVertex, SpriteInstance, QUAD_INDICES, QUAD_VERTICES};
