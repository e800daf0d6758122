use std::time::Instant;

use anyhow::Result;
use ember_fountain::{
    camera::Camera,
    controls::Control,
    material::SpriteImage,
    pool::{ParticlePool, UpdateStats},
    renderer::{bridge, Renderer},
    settings::Settings,
};
use glam::Vec3;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta, VirtualKeyCode},
    window::Window,
};

const MOVE_SPEED: f32 = 1.;
const LOOK_SENSITIVITY: f32 = 0.002;

/// Frame count and simulation totals over the current one second window.
#[derive(Debug, Default)]
struct FrameCounter {
    frames: u32,
    elapsed: f32,
    stats: UpdateStats,
}

pub struct App {
    window: Window,
    camera: Camera,
    pool: ParticlePool,
    renderer: Renderer,
    cursor_locked: bool,
    exit_requested: bool,
    movement: Vec3,
    last_update: Instant,
    counter: FrameCounter,
}

impl App {
    pub fn new(window: Window, settings: Settings) -> Result<Self> {
        info!("{:#?}", &settings);

        let sprite = SpriteImage::soft_disc(settings.sprite_size);
        let renderer = Renderer::new(&window, settings.capacity, &sprite)?;

        info!("Seeded RNG with {}", settings.seed);
        let pool = ParticlePool::with_capacity(
            settings.capacity,
            settings.emission,
            Pcg64Mcg::seed_from_u64(settings.seed),
        );

        let camera = {
            let inner_size = window.inner_size();
            Camera {
                aspect_ratio: inner_size.width.max(1) as f32 / inner_size.height.max(1) as f32,
                ..Default::default()
            }
        };

        info!("Controls:");
        for line in Control::HELP.lines() {
            info!("{}", line);
        }

        Ok(Self {
            window,
            camera,
            pool,
            renderer,
            cursor_locked: false,
            exit_requested: false,
            movement: Vec3::ZERO,
            last_update: Instant::now(),
            counter: FrameCounter::default(),
        })
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn on_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.camera.aspect_ratio = size.width as f32 / size.height as f32;
        self.renderer.resize_surface(size);
    }

    pub fn on_mouse_up(&mut self) {
        self.set_cursor_locked(true);
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        if let Err(e) = self.window.set_cursor_grab(locked) {
            warn!("Failed to change cursor grab: {}", e);
        }
        self.window.set_cursor_visible(!locked);
        self.cursor_locked = locked;
    }

    pub fn on_key(&mut self, keycode: VirtualKeyCode, state: ElementState) {
        let held = if state == ElementState::Pressed { 1. } else { 0. };
        match keycode {
            VirtualKeyCode::W => self.movement.z = held,
            VirtualKeyCode::S => self.movement.z = -held,
            VirtualKeyCode::D => self.movement.x = held,
            VirtualKeyCode::A => self.movement.x = -held,
            VirtualKeyCode::Space => self.movement.y = held,
            VirtualKeyCode::LShift => self.movement.y = -held,
            _ if state == ElementState::Released => self.on_key_up(keycode),
            _ => (),
        }
    }

    fn on_key_up(&mut self, keycode: VirtualKeyCode) {
        if keycode == VirtualKeyCode::Escape {
            if self.cursor_locked {
                self.set_cursor_locked(false);
            } else {
                self.exit_requested = true;
            }
            return;
        }

        if let Some(control) = Control::from_keycode(keycode) {
            info!("{}", control.apply(&mut self.pool.emission));
        }
    }

    pub fn on_mouse_move(&mut self, (x, y): (f64, f64)) {
        if !self.cursor_locked {
            return;
        };
        self.camera
            .look(x as f32 * -LOOK_SENSITIVITY, y as f32 * -LOOK_SENSITIVITY);
    }

    pub fn on_mouse_scroll(&mut self, delta: MouseScrollDelta) {
        if !self.cursor_locked {
            return;
        };
        let y = match delta {
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y as f32,
            MouseScrollDelta::LineDelta(_, y) => y * 60.0,
        };
        self.camera.zoom(y * -0.002);
    }

    pub fn render(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32();
        self.last_update = now;

        self.camera.translate_local(self.movement * MOVE_SPEED * dt);
        let stats = self.pool.update(dt);
        self.count_frame(dt, stats);

        let viewport = self.renderer.viewport();
        let view_projection = self.camera.view_projection();
        match bridge::submit(&mut self.renderer, &self.pool, view_projection, viewport) {
            Ok(()) => (),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::Timeout) => warn!("Surface timed out, skipping frame"),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Out of memory while acquiring surface texture");
                self.exit_requested = true;
            }
        }
    }

    fn count_frame(&mut self, dt: f32, stats: UpdateStats) {
        let counter = &mut self.counter;
        counter.frames += 1;
        counter.elapsed += dt;
        counter.stats += stats;

        if counter.elapsed > 1. {
            self.window.set_title(&format!("FPS: {}", counter.frames));
            debug!(
                "{} frames, {} alive (steady state {:.0}), {} spawned, {} expired, emitter at {}",
                counter.frames,
                counter.stats.alive,
                self.pool.emission.steady_state_count(),
                counter.stats.spawned,
                counter.stats.expired,
                self.pool.emission.emitter_position,
            );
            *counter = FrameCounter::default();
        }
    }
}
