pub mod assets;
pub mod camera;
pub mod color;
pub mod draw;
pub mod input;
pub mod program;
pub mod time;

pub use assets::{AssetLoader, AudioQueue, HeadlessAssets, SoundHandle, TextureHandle};
pub use camera::Camera;
pub use color::Color;
pub use draw::{DrawQueue, SpriteCommand};
pub use input::InputState;
pub use program::{FrameCtx, LoadCtx, Phase, Program, ProgramDriver};
pub use time::TimeState;
