//! Bunny demo host.
//!
//! Windowed mode runs the program inside a winit event loop:
//!
//!   1. `begin_frame()` -- measure wall-clock delta (capped)
//!   2. `update` then `draw` into the draw queue
//!   3. stream sprite instances to the GPU
//!   4. scene pass, then the egui overlay pass
//!   5. present and roll input edges over
//!
//! `--headless` skips the window and GPU entirely and plays a replay (or idle
//! frames) through the same program, printing a summary at the end.

mod audio;
mod cli;
mod controls;
mod grid;
mod loader;
mod lua_bridge;
mod program;
mod replay;
mod variants;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use bunny_core::{AudioQueue, DrawQueue, FrameCtx, HeadlessAssets, InputState, ProgramDriver, TimeState};
use bunny_devtools::{DebugOverlay, OverlayStats};
use bunny_platform::PlatformConfig;
use bunny_render::{GpuContext, SpriteBatcher, SpritePipeline, TextureCache};
use clap::Parser;
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::audio::AudioSystem;
use crate::cli::{headless_summary, Cli};
use crate::loader::GpuAssets;
use crate::lua_bridge::LuaBridge;
use crate::program::DemoProgram;
use crate::replay::{load_replay_from_path, run_replay, ReplaySequence};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.392,
    g: 0.584,
    b: 0.929,
    a: 1.0,
};

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    pipeline: SpritePipeline,
    textures: TextureCache,
    batcher: SpriteBatcher,
    audio: AudioSystem,
    debug_overlay: DebugOverlay,
    time: TimeState,
    input: InputState,
    draw_queue: DrawQueue,
    driver: ProgramDriver<DemoProgram>,
}

impl EngineState {
    fn new(window: Arc<Window>, assets_root: &Path, program: DemoProgram) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let mut textures = TextureCache::new(&gpu.device, &gpu.queue, &pipeline);
        let batcher = SpriteBatcher::new(&gpu.device);
        let mut audio = AudioSystem::new(assets_root);
        audio.set_volume(program.config().volume);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let mut driver = ProgramDriver::new(program);
        let mut audio_queue = AudioQueue::new();
        {
            let mut assets = GpuAssets {
                root: assets_root,
                gpu: &gpu,
                pipeline: &pipeline,
                textures: &mut textures,
                audio: &mut audio,
            };
            driver.start(&mut assets, &mut audio_queue)?;
        }
        audio.play_queued(&mut audio_queue);

        // Don't count startup time as the first frame's delta.
        let mut time = TimeState::new();
        time.reset();

        Ok(Self {
            window,
            gpu,
            pipeline,
            textures,
            batcher,
            audio,
            debug_overlay,
            time,
            input: InputState::new(),
            draw_queue: DrawQueue::new(),
            driver,
        })
    }

    fn overlay_stats(&self) -> OverlayStats {
        let program = self.driver.program();
        let state = program.state();
        OverlayStats {
            sprite_count: self.batcher.instance_count() as u32,
            draw_runs: self.batcher.run_count() as u32,
            offset: state.offset,
            camera: state.camera,
            script_status_label: program.script_status().label().to_string(),
            variant: program.config().name.clone(),
        }
    }

    fn redraw(&mut self) {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return;
        }

        self.time.begin_frame();
        self.driver.program_mut().check_script_reload();

        let viewport = self.gpu.viewport();
        let frame = FrameCtx {
            dt: self.time.delta_f32(),
            input: &self.input,
            viewport,
        };
        self.driver.frame(&frame, &mut self.draw_queue);
        self.batcher.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            self.draw_queue.commands(),
            viewport,
            &self.textures,
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            self.input.end_frame();
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay
                .prepare(&self.window, &self.time, Some(stats));

        if overlay_actions.reset_view {
            self.driver.program_mut().reset();
        }
        if overlay_actions.reload_script {
            self.driver.program_mut().reload_script();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            self.batcher
                .draw(&mut render_pass, &self.pipeline, &self.textures);
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.input.end_frame();
    }
}

struct App {
    config: PlatformConfig,
    assets_root: PathBuf,
    pending: Option<DemoProgram>,
    state: Option<EngineState>,
    startup_error: Option<String>,
}

impl App {
    fn new(config: PlatformConfig, assets_root: PathBuf, program: DemoProgram) -> Self {
        Self {
            config,
            assets_root,
            pending: Some(program),
            state: None,
            startup_error: None,
        }
    }

    fn fail_startup(&mut self, event_loop: &ActiveEventLoop, err: String) {
        log::error!("Startup failed: {err}");
        self.startup_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(program) = self.pending.take() else {
            return;
        };
        let window = match bunny_platform::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => return self.fail_startup(event_loop, err),
        };
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        match EngineState::new(window, &self.assets_root, program) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail_startup(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                state.driver.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => state.input.release_all(),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    if pressed && !egui_consumed {
                        match key_code {
                            KeyCode::F3 if !event.repeat => state.debug_overlay.toggle(),
                            KeyCode::F5 if !event.repeat => {
                                state.driver.program_mut().reload_script();
                            }
                            KeyCode::Escape => {
                                state.driver.shutdown();
                                event_loop.exit();
                            }
                            _ => {}
                        }
                    }
                    forward_key(&mut state.input, &key_name(key_code), pressed, egui_consumed);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state
                    .input
                    .set_mouse_position(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let pressed = button_state == ElementState::Pressed;
                forward_button(&mut state.input, &format!("{button:?}"), pressed, egui_consumed);
            }

            WindowEvent::MouseWheel { delta, .. } if !egui_consumed => {
                state.input.add_scroll(scroll_delta(delta));
            }

            WindowEvent::RedrawRequested => state.redraw(),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.driver.shutdown();
        }
    }
}

/// Key names follow winit's `KeyCode` debug form: "ArrowUp", "KeyW", "Minus".
fn key_name(code: KeyCode) -> String {
    format!("{code:?}")
}

/// Presses egui claimed are dropped; releases always land so nothing sticks.
fn forward_key(input: &mut InputState, name: &str, pressed: bool, egui_consumed: bool) {
    if !pressed {
        input.release(name);
    } else if !egui_consumed {
        input.press(name);
    }
}

fn forward_button(input: &mut InputState, name: &str, pressed: bool, egui_consumed: bool) {
    if !pressed {
        input.release_button(name);
    } else if !egui_consumed {
        input.press_button(name);
    }
}

/// Lines are used as-is; pixel deltas pass through raw.
fn scroll_delta(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
        MouseScrollDelta::PixelDelta(position) => Vec2::new(position.x as f32, position.y as f32),
    }
}

fn build_program(cli: &Cli) -> Result<DemoProgram, String> {
    let config = cli.demo_config()?;
    let script = cli.script_path(&config).map(LuaBridge::new);
    Ok(DemoProgram::new(config, script))
}

fn run_headless(cli: &Cli) -> Result<(), String> {
    let replay = match &cli.replay {
        Some(path) => load_replay_from_path(path)?,
        None => ReplaySequence::idle(cli.frames),
    };
    let mut driver = ProgramDriver::new(build_program(cli)?);
    log::info!(
        "Headless run: {} frames of '{}'",
        replay.total_frames(),
        driver.program().config().name
    );
    let report = run_replay(&mut driver, &replay, &mut HeadlessAssets::new())?;
    print!("{}", headless_summary(driver.program(), &report));
    Ok(())
}

fn run_windowed(cli: &Cli) -> Result<(), String> {
    let program = build_program(cli)?;
    let config =
        PlatformConfig::default().with_title(format!("Bunny Demo ({})", program.config().name));

    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, cli.assets.clone(), program);
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {e}"))?;

    match app.startup_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::info!("Bunny demo starting...");

    let result = if cli.headless {
        run_headless(&cli)
    } else {
        run_windowed(&cli)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn key_names_match_control_bindings() {
        assert_eq!(key_name(KeyCode::ArrowUp), "ArrowUp");
        assert_eq!(key_name(KeyCode::KeyW), "KeyW");
        assert_eq!(key_name(KeyCode::Minus), "Minus");
        assert_eq!(key_name(KeyCode::Equal), "Equal");
    }

    #[test]
    fn wheel_deltas_become_scroll_vectors() {
        assert_eq!(
            scroll_delta(MouseScrollDelta::LineDelta(0.0, 1.0)),
            Vec2::new(0.0, 1.0)
        );
        assert_eq!(
            scroll_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(2.0, -3.0))),
            Vec2::new(2.0, -3.0)
        );
    }

    #[test]
    fn overlay_claimed_release_still_releases() {
        let mut input = InputState::new();
        forward_key(&mut input, "ArrowUp", true, false);
        assert!(input.key_down("ArrowUp"));

        forward_key(&mut input, "ArrowUp", false, true);
        assert!(!input.key_down("ArrowUp"));
        assert!(input.key_released("ArrowUp"));
    }

    #[test]
    fn overlay_claimed_press_is_ignored() {
        let mut input = InputState::new();
        forward_key(&mut input, "KeyW", true, true);
        assert!(!input.key_down("KeyW"));

        forward_button(&mut input, "Left", true, true);
        assert!(!input.mouse_down("Left"));
        forward_button(&mut input, "Left", true, false);
        forward_button(&mut input, "Left", false, true);
        assert!(!input.mouse_down("Left"));
        assert!(input.mouse_released("Left"));
    }

    #[test]
    fn build_program_rejects_unknown_variant() {
        let cli = Cli::parse_from(["bunny_demo", "--variant", "nope"]);
        assert!(build_program(&cli).is_err());
    }
}
