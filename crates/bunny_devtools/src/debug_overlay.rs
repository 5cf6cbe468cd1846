//! Debug overlay rendered via egui on top of the sprite scene.
//!
//! egui needs a split render because `egui_wgpu::Renderer::render()` wants a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run the UI, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers
//!   3. `paint()`   -- render into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! UI logic only runs while `visible` (F3), but window events always reach
//! egui so it can claim clicks on its own widgets.

use bunny_core::{Camera, TimeState};
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub sprite_count: u32,
    pub draw_runs: u32,
    /// Grid scroll offset
    pub offset: f64,
    pub camera: Camera,
    /// Script runtime status (e.g. "Lua: loaded")
    pub script_status_label: String,
    /// Active demo variant name
    pub variant: String,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub reset_view: bool,
    pub reload_script: bool,
}

/// Text rows shown by the overlay, in display order.
pub fn stats_lines(time: &TimeState, stats: Option<&OverlayStats>) -> Vec<String> {
    let mut lines = vec![
        format!("FPS: {:.1}", time.smoothed_fps),
        format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms),
        format!("Frame: {}", time.frame_count),
    ];
    if let Some(stats) = stats {
        lines.push(format!("Variant: {}", stats.variant));
        lines.push(format!("Sprites: {}", stats.sprite_count));
        lines.push(format!("Draw runs: {}", stats.draw_runs));
        lines.push(format!("Offset: {:.1}", stats.offset));
        lines.push(format!(
            "Camera: ({:.1}, {:.1}) rot {:.2} zoom {:.2}",
            stats.camera.position.x,
            stats.camera.position.y,
            stats.camera.rotation,
            stats.camera.zoom
        ));
        lines.push(stats.script_status_label.clone());
    }
    lines
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: Option<OverlayStats>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if self.visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| {
                        for (i, line) in stats_lines(time, stats.as_ref()).iter().enumerate() {
                            if i == 3 {
                                ui.separator();
                            }
                            ui.label(line);
                        }
                        if stats.is_some() {
                            ui.separator();
                            ui.horizontal(|ui| {
                                if ui.button("Reset view").clicked() {
                                    actions.reset_view = true;
                                }
                                if ui.button("Reload script").clicked() {
                                    actions.reload_script = true;
                                }
                            });
                        }
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
