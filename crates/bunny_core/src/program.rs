//! Host-driven program lifecycle.
//!
//! A program never runs its own loop. The host calls `init` and `load` once,
//! then `update` followed by `draw` once per frame, then `exit` once at
//! shutdown. All program state lives in the implementing type and is handed
//! to each callback by reference; nothing is global.
//!
//! `ProgramDriver` enforces the call order so every host (the winit runtime,
//! headless replays, tests) gets the same guarantees:
//!
//! - `draw` is never called before `load` has succeeded
//! - each `draw` observes the `update` of the same frame
//! - `exit` runs at most once

use glam::Vec2;

use crate::assets::{AssetLoader, AudioQueue};
use crate::draw::DrawQueue;
use crate::input::InputState;

/// Services available while the program loads its assets.
pub struct LoadCtx<'a> {
    pub assets: &'a mut dyn AssetLoader,
    pub audio: &'a mut AudioQueue,
}

/// Read-only view of the frame being processed.
#[derive(Clone, Copy)]
pub struct FrameCtx<'a> {
    /// Seconds since the previous frame, never negative.
    pub dt: f32,
    pub input: &'a InputState,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

pub trait Program {
    fn init(&mut self) {}

    /// Acquire assets. An error here is fatal to startup.
    fn load(&mut self, ctx: &mut LoadCtx<'_>) -> Result<(), String>;

    fn update(&mut self, frame: &FrameCtx<'_>);

    fn draw(&self, frame: &FrameCtx<'_>, queue: &mut DrawQueue);

    fn exit(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before `load`; assets are undefined.
    Created,
    /// After a successful `load`; frames may run.
    Loaded,
    /// `load` returned an error; frames are refused.
    Failed,
    Exited,
}

pub struct ProgramDriver<P: Program> {
    program: P,
    phase: Phase,
}

impl<P: Program> ProgramDriver<P> {
    pub fn new(program: P) -> Self {
        Self {
            program,
            phase: Phase::Created,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut P {
        &mut self.program
    }

    /// Runs `init` then `load`. Can only succeed once.
    pub fn start(
        &mut self,
        assets: &mut dyn AssetLoader,
        audio: &mut AudioQueue,
    ) -> Result<(), String> {
        if self.phase != Phase::Created {
            return Err(format!(
                "Program cannot start from phase {:?}",
                self.phase
            ));
        }

        self.program.init();
        let mut ctx = LoadCtx { assets, audio };
        match self.program.load(&mut ctx) {
            Ok(()) => {
                self.phase = Phase::Loaded;
                log::info!("Program loaded");
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    /// Runs one `update` + `draw` pair. Returns false (and does nothing) when
    /// the program is not in the loaded phase.
    pub fn frame(&mut self, frame: &FrameCtx<'_>, queue: &mut DrawQueue) -> bool {
        if self.phase != Phase::Loaded {
            return false;
        }
        queue.begin_frame();
        self.program.update(frame);
        self.program.draw(frame, queue);
        true
    }

    pub fn shutdown(&mut self) {
        if self.phase == Phase::Exited {
            return;
        }
        self.program.exit();
        self.phase = Phase::Exited;
        log::info!("Program exited");
    }
}
