use anyhow::{Context, Result};
use glam::{vec2, Vec2};
use pollster::FutureExt as _;

use crate::{
    material::{ParticleMaterial, SpriteImage},
    particle::Particle,
};

pub mod bridge;
pub mod particle;

use self::{
    bridge::{FrameSink, FrameUniforms},
    particle::{ParticleRenderer, ParticleRendererBuilder},
};

pub struct Renderer {
    surface: wgpu::Surface,
    surface_configuration: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    _material: ParticleMaterial,
    particle_renderer: ParticleRenderer,
}

impl Renderer {
    pub fn new(
        window: &winit::window::Window,
        capacity: usize,
        sprite: &SpriteImage,
    ) -> Result<Renderer> {
        let instance = wgpu::Instance::new(wgpu::Backends::PRIMARY);
        let surface = unsafe { instance.create_surface(window) };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .block_on()
            .context("No adapter found")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .block_on()
            .context("No device found")?;

        let surface_configuration = {
            let surface_format = surface
                .get_preferred_format(&adapter)
                .context("Surface is incompatible with the adapter")?;

            let winit::dpi::PhysicalSize { width, height } = window.inner_size();

            wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: surface_format,
                width: width.max(1),
                height: height.max(1),
                present_mode: wgpu::PresentMode::Fifo,
            }
        };
        surface.configure(&device, &surface_configuration);

        let material = ParticleMaterial::new(&device, &queue, sprite)
            .context("Failed to create particle material")?;

        let particle_renderer = ParticleRendererBuilder::new(&material, capacity)
            .color_target_format(surface_configuration.format)
            .build(&device);

        Ok(Renderer {
            surface,
            surface_configuration,
            device,
            queue,
            _material: material,
            particle_renderer,
        })
    }

    /// Current render target size in pixels.
    pub fn viewport(&self) -> Vec2 {
        vec2(
            self.surface_configuration.width as f32,
            self.surface_configuration.height as f32,
        )
    }

    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        self.reconfigure();
    }

    pub fn reconfigure(&self) {
        self.surface
            .configure(&self.device, &self.surface_configuration)
    }
}

impl FrameSink for Renderer {
    type Error = wgpu::SurfaceError;

    fn submit_frame(
        &mut self,
        particles: &[Particle],
        uniforms: &FrameUniforms,
    ) -> Result<(), Self::Error> {
        let frame_buffer = self.surface.get_current_texture()?;
        let frame_buffer_view = frame_buffer.texture.create_view(&Default::default());

        self.particle_renderer
            .write(&self.queue, particles, uniforms);

        let mut encoder = self.device.create_command_encoder(&Default::default());

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Pass"),
                color_attachments: &[wgpu::RenderPassColorAttachment {
                    view: &frame_buffer_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                }],
                depth_stencil_attachment: None,
            });
            self.particle_renderer.draw(&mut render_pass);
        }

        self.queue.submit(Some(encoder.finish()));

        frame_buffer.present();

        Ok(())
    }
}
