use std::sync::Arc;
use anyhow::anyhow;
use glam::Vec2;
use rand::Rng;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;
use crate::config::SimConfig;
use crate::input_manager::InputManager;
use crate::particles::gpu_simulation::GpuSimulation;
use crate::renderer::camera::Camera;
use crate::renderer::renderer::Renderer;
use crate::renderer::wgpu_context::WgpuContext;
use crate::simulation::color::{hsv_to_rgb, lerp};
use crate::simulation::frame_driver::{FrameDriver, SimulationBackend};
use crate::utils::render_timer::RenderTimer;

/// Used when the window reports no size yet (e.g. an unsized canvas).
const FALLBACK_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
const STATS_INTERVAL: u64 = 600;

// This will store the state of the simulation window
pub struct State {
    wgpu_context: WgpuContext,
    render_timer: RenderTimer,
    input_manager: InputManager,
    renderer: Renderer,
    camera: Camera,
    simulation: FrameDriver<GpuSimulation>,
    spawn_radius: f32,
    spawn_rejected: bool,
}

impl State {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let wgpu_context = WgpuContext::new(window).await?;

        let window_size = wgpu_context.window_size();
        let viewport = if window_size.x > 0.0 && window_size.y > 0.0 { window_size } else { FALLBACK_VIEWPORT };
        let config = SimConfig::for_viewport(viewport);
        config.validate()?;
        let grid = config.grid_params()?;
        log::info!(
            "Simulation config: {} slots, {} sub-steps, grid {}x{} cells of {} px",
            config.capacity,
            config.sub_steps,
            grid.width(),
            grid.height(),
            grid.cell_size()
        );

        let backend = GpuSimulation::new(&wgpu_context, config.capacity, grid, config.sub_steps)?;
        let mut simulation = FrameDriver::new(backend, &config)?;
        let seeded = simulation.seed(&mut rand::rng(), config.initial_particles, config.particle_radius);
        log::info!("Seeded {seeded} particles");

        let renderer = Renderer::new(&wgpu_context).ok_or_else(|| anyhow!("the window has no surface to render to"))?;

        Ok(Self {
            wgpu_context,
            render_timer: RenderTimer::new(),
            input_manager: InputManager::new(),
            renderer,
            camera: Camera::default(),
            simulation,
            spawn_radius: config.particle_radius,
            spawn_rejected: false,
        })
    }

    pub fn render_loop(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop) {
        match event {
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                self.update();
                match self.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = self.wgpu_context.window_size();
                        self.resize(size.x as u32, size.y as u32);
                    }
                    Err(e) => {
                        log::error!("Unable to render: {:?}", e);
                    }
                }
            }
            _ => self.input_manager.manage_input(event, event_loop),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.wgpu_context.resize(width, height);
    }

    pub fn get_window(&self) -> Option<&Arc<Window>> {
        self.wgpu_context.surface_manager().map(|surface_manager| surface_manager.get_window())
    }

    fn update(&mut self) {
        let dt = self.render_timer.get_delta().as_secs_f32();
        let input = self.input_manager.take_snapshot();
        self.camera.update(&input);

        let window_size = self.wgpu_context.window_size();
        let pointer = input
            .pointer_position
            .map(|screen| self.camera.screen_to_world(screen, window_size));

        match (input.primary, pointer) {
            (true, Some(position)) => self.spawn_at(position),
            (false, _) => self.spawn_rejected = false,
            _ => {}
        }

        let interaction_point = if input.secondary { pointer } else { None };
        if let Err(error) = self.simulation.advance(dt, interaction_point) {
            log::error!("Simulation step failed: {error}");
        }

        if self.simulation.frame_count() % STATS_INTERVAL == 0 {
            log::debug!(
                "{} live particles, {:.1} fps",
                self.simulation.live_count(),
                self.render_timer.average_fps()
            );
        }
    }

    fn spawn_at(&mut self, position: Vec2) {
        let color = hsv_to_rgb(0.0, lerp(0.2, 0.7, rand::rng().random::<f32>()), 1.0);
        if let Err(error) = self.simulation.spawn(position, color, self.spawn_radius) {
            // Warn once per press; the button is usually held.
            if !self.spawn_rejected {
                log::warn!("Spawn rejected: {error}");
                self.spawn_rejected = true;
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let view_projection = self.camera.view_projection(self.wgpu_context.window_size());
        let backend = self.simulation.backend();
        self.renderer.render(
            &self.wgpu_context,
            backend.current_particle_buffer(),
            backend.capacity() as u32,
            &view_projection,
        )
    }
}
