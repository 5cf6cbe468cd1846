use bunny_core::{DrawQueue, FrameCtx, LoadCtx, Program, SoundHandle, TextureHandle};
use glam::Vec2;

use crate::controls::DemoState;
use crate::grid::DiagonalGrid;
use crate::lua_bridge::{LuaBridge, LuaStatus};
use crate::variants::{DemoConfig, PointerSpace};

/// The bunny demo: a diagonal chain of sprites scrolled by an offset, viewed
/// through a keyboard-driven camera, plus one sprite following the pointer.
pub struct DemoProgram {
    config: DemoConfig,
    state: DemoState,
    texture: Option<TextureHandle>,
    sound: Option<SoundHandle>,
    script: Option<LuaBridge>,
    zoom_warned: bool,
}

impl DemoProgram {
    pub fn new(config: DemoConfig, script: Option<LuaBridge>) -> Self {
        Self {
            state: initial_state(&config),
            config,
            texture: None,
            sound: None,
            script,
            zoom_warned: false,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    pub fn sound(&self) -> Option<&SoundHandle> {
        self.sound.as_ref()
    }

    pub fn script_status(&self) -> LuaStatus {
        self.script
            .as_ref()
            .map_or(LuaStatus::Fallback, LuaBridge::status)
    }

    pub fn reset(&mut self) {
        log::info!("Demo state reset");
        self.state = initial_state(&self.config);
        self.zoom_warned = false;
    }

    pub fn reload_script(&mut self) {
        match &mut self.script {
            Some(script) => script.force_reload(),
            None => log::info!("No script configured for variant '{}'", self.config.name),
        }
    }

    /// Hot-reload hook, called by the host between frames.
    pub fn check_script_reload(&mut self) {
        if let Some(script) = &mut self.script {
            script.check_reload();
        }
    }

    fn warn_on_degenerate_zoom(&mut self) {
        let zoom = self.state.camera.zoom;
        if zoom <= 0.0 {
            if !self.zoom_warned {
                log::warn!("Camera zoom reached {zoom:.3}; the view is collapsed or mirrored");
                self.zoom_warned = true;
            }
        } else {
            self.zoom_warned = false;
        }
    }
}

fn initial_state(config: &DemoConfig) -> DemoState {
    let mut state = DemoState::new();
    state.camera.size = config.view_size.map(Vec2::from);
    state
}

impl Program for DemoProgram {
    fn init(&mut self) {
        log::info!(
            "Variant '{}' ({} control axes, script: {})",
            self.config.name,
            self.config.controls.axes.len(),
            self.script_status()
        );
    }

    fn load(&mut self, ctx: &mut LoadCtx<'_>) -> Result<(), String> {
        self.texture = Some(ctx.assets.texture(&self.config.sprite)?);
        if let Some(path) = &self.config.sound {
            let sound = ctx.assets.sound(path)?;
            ctx.audio.play(&sound);
            self.sound = Some(sound);
        }
        Ok(())
    }

    fn update(&mut self, frame: &FrameCtx<'_>) {
        let scripted = self
            .script
            .as_ref()
            .and_then(|script| script.call_update(frame.dt, frame.input, &self.state));
        match scripted {
            Some(next) => self.state = next,
            None => self
                .config
                .controls
                .step(&mut self.state, frame.input, frame.dt),
        }
        self.warn_on_degenerate_zoom();
    }

    fn draw(&self, frame: &FrameCtx<'_>, queue: &mut DrawQueue) {
        let Some(texture) = &self.texture else {
            return;
        };
        let camera = self.state.camera;
        queue.set_camera(Some(camera));

        let grid = &self.config.grid;
        let scale = grid.scale_vec();
        for placement in DiagonalGrid::new(self.state.offset) {
            let rotation = grid.rotate.then_some(placement.rotation);
            queue.sprite(texture, placement.position, rotation, scale, grid.tint);
        }

        let mouse = frame.input.mouse_pos();
        let pointer = match self.config.pointer.space {
            PointerSpace::Screen => mouse,
            PointerSpace::World => camera.project(mouse, frame.viewport),
        };
        queue.sprite(texture, pointer, None, None, self.config.pointer.tint);
    }

    fn exit(&mut self) {
        log::info!(
            "Variant '{}' exiting at offset {:.2}",
            self.config.name,
            self.state.offset
        );
    }
}
