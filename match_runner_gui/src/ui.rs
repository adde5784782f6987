use egui::Context;
use egui_wgpu::{Renderer as EguiRenderer, ScreenDescriptor};
use egui_winit::State as EguiState;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::window::WindowEvent;

/// egui plumbing for the single-panel viewer. One [`ViewerUi::draw_frame`]
/// call per redraw collects input, runs the app UI, and tessellates the
/// result; [`ViewerUi::paint`] replays it inside the surface's encoder.
pub struct ViewerUi {
    egui_ctx: Context,
    egui_state: EguiState,
    egui_renderer: EguiRenderer,
}

pub struct ViewerDrawData {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: ScreenDescriptor,
}

impl ViewerUi {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let egui_ctx = Context::default();
        let egui_state = EguiState::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        Self {
            egui_renderer: EguiRenderer::new(device, format, None, 1),
            egui_ctx,
            egui_state,
        }
    }

    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Runs one whole-window egui frame. The window is decorated and the
    /// viewer never repositions it, so the raw input from `egui_winit` is
    /// used as-is.
    pub fn draw_frame(
        &mut self,
        window: &Window,
        frame_size: PhysicalSize<u32>,
        run_ui: impl FnOnce(&Context),
    ) -> ViewerDrawData {
        let raw_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(raw_input);
        run_ui(&self.egui_ctx);
        let full_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        ViewerDrawData {
            paint_jobs: self
                .egui_ctx
                .tessellate(full_output.shapes, pixels_per_point),
            textures_delta: full_output.textures_delta,
            screen_descriptor: ScreenDescriptor {
                size_in_pixels: [frame_size.width, frame_size.height],
                pixels_per_point,
            },
        }
    }

    /// Texture deltas must be applied before the pass and freed after it,
    /// even on frames with nothing to paint.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        draw_data: &ViewerDrawData,
    ) {
        let ViewerDrawData {
            paint_jobs,
            textures_delta,
            screen_descriptor,
        } = draw_data;
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, paint_jobs, screen_descriptor);
        if !paint_jobs.is_empty() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("matchview.egui.pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer
                .render(&mut pass, paint_jobs, screen_descriptor);
        }
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
