// ============================================================================
// app.rs — Aviary
// Windowed host: winit event loop, wgpu presentation, and a frame scheduler
// paced by redraw requests.
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::error::{HarnessError, Result};
use crate::pipeline::{clear_color, Presenter};
use crate::raster::{RasterContext, RasterHost, RasterSurface};
use crate::scheduler::{FrameOutcome, FrameScheduler};
use crate::shapes::{RenderStyle, ShapeRenderer};
use crate::simulation::SimulationHandle;
use crate::surface::FramePacer;
use crate::viewport::Viewport;
use crate::world::FlockSimulation;

const FPS_LOG_INTERVAL: u64 = 600;

// ======================== Application ========================

pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    setup_error: Option<HarnessError>,
}

struct AppState {
    // GPU
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    presenter: Presenter,
    background: wgpu::Color,

    window: Arc<Window>,
    scheduler: FrameScheduler<FlockSimulation, RasterContext>,

    // Timing
    last_redraw: Instant,
    fps: f32,
}

/// Re-arms the loop by asking the window for another redraw.
struct RedrawPacer<'a>(&'a Window);

impl FramePacer for RedrawPacer<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            setup_error: None,
        }
    }

    /// The fatal setup error that ended the event loop, if any.
    pub fn take_setup_error(&mut self) -> Option<HarnessError> {
        self.setup_error.take()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.setup_error.is_some() {
            return;
        }

        match init_state(&self.config, event_loop) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Setup failed: {}", err);
                self.setup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                state.scheduler.stop();
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        state.scheduler.stop();
                        event_loop.exit();
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case("t") => train(state),
                    _ => {}
                }
            }

            // Presentation only; the backing store keeps its setup-time size
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    state.surface_config.width = new_size.width;
                    state.surface_config.height = new_size.height;
                    state.surface.configure(&state.device, &state.surface_config);
                }
            }

            WindowEvent::RedrawRequested => redraw(state),

            _ => {}
        }
    }
}

// ======================== Setup ========================

fn init_state(config: &AppConfig, event_loop: &ActiveEventLoop) -> Result<AppState> {
    let window_attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width,
            config.window.height,
        ))
        .with_resizable(false);

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .map_err(|e| HarnessError::Window(format!("Failed to create window: {e}")))?,
    );

    // Drawing surface: the window's logical size at its current density
    let mut host = RasterHost::new(
        config.window.surface_id.clone(),
        RasterSurface::new(config.window.width, config.window.height),
    )
    .with_device_pixel_ratio(window.scale_factor());
    let viewport = Viewport::initialize(&mut host, &config.window.surface_id)?;
    let (backing_w, backing_h) = viewport.backing_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let surface = instance
        .create_surface(window.clone())
        .map_err(|e| HarnessError::Gpu(format!("Failed to create surface: {e}")))?;

    let (device, queue, surface_config) = pollster::block_on(init_gpu(&instance, &surface, &window))?;
    surface.configure(&device, &surface_config);

    let presenter = Presenter::new(&device, surface_config.format, backing_w, backing_h);
    let background = clear_color(config.window.background, surface_config.format);

    let simulation = FlockSimulation::new(&config.simulation);
    let renderer = ShapeRenderer::new(RenderStyle::from(&config.render));
    let mut scheduler = FrameScheduler::new(simulation, viewport, renderer);
    scheduler.start(&mut RedrawPacer(&window));

    log::info!(
        "Aviary initialized: window {}x{} (scale {:.2}), press T to train, Esc to quit",
        config.window.width,
        config.window.height,
        window.scale_factor()
    );

    Ok(AppState {
        device,
        queue,
        surface,
        surface_config,
        presenter,
        background,
        window,
        scheduler,
        last_redraw: Instant::now(),
        fps: 0.0,
    })
}

async fn init_gpu(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    window: &Window,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::SurfaceConfiguration)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| HarnessError::Gpu("No suitable GPU adapter found".to_string()))?;

    log::info!("GPU: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("aviary_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| HarnessError::Gpu(format!("Failed to create device: {e}")))?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or_else(|| HarnessError::Gpu("Surface reports no formats".to_string()))?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    // Frames are paced by the display refresh
    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    Ok((device, queue, surface_config))
}

// ======================== Actions ========================

fn train(state: &mut AppState) {
    match state.scheduler.simulation_mut().train() {
        Ok(stats) => log::info!("Training: {:?}", stats),
        Err(err) => log::error!("Training failed: {}", err),
    }
}

// ======================== Frame Rendering ========================

fn redraw(state: &mut AppState) {
    // FPS (exponential moving average)
    let now = Instant::now();
    let dt = now.duration_since(state.last_redraw).as_secs_f32().max(0.0001);
    state.last_redraw = now;
    state.fps = state.fps * 0.95 + (1.0 / dt) * 0.05;

    // Only completed frames reach the texture; a failed frame leaves the
    // last good one on screen.
    match state.scheduler.frame(&mut RedrawPacer(&state.window)) {
        Ok(FrameOutcome::Rearmed | FrameOutcome::Stopped) => {
            state
                .presenter
                .upload(&state.queue, state.scheduler.viewport().context().pixels());
        }
        Ok(FrameOutcome::Idle) => {}
        Err(err) => log::error!("Frame failed, animation halted: {}", err),
    }

    let frames = state.scheduler.frames();
    if frames > 0 && frames % FPS_LOG_INTERVAL == 0 {
        log::debug!("Frame {} | fps {:.0}", frames, state.fps);
    }

    let output = match state.surface.get_current_texture() {
        Ok(t) => t,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::warn!("Surface lost; reconfiguring");
            state.surface.configure(&state.device, &state.surface_config);
            state.window.request_redraw();
            return;
        }
        Err(e) => {
            log::error!("Surface error: {:?}", e);
            return;
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("present_encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(state.background),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        state.presenter.render(&mut pass);
    }

    state.queue.submit(std::iter::once(encoder.finish()));
    output.present();
}
