use glam::{vec2, vec3, vec4, Vec2, Vec3, Vec4};
use rand::Rng;

/// A half-open sampling window `[min, min + extent)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SampleRange {
    pub min: f32,
    pub extent: f32,
}

impl SampleRange {
    pub const ZERO: Self = Self::new(0., 0.);

    pub const fn new(min: f32, extent: f32) -> Self {
        Self { min, extent }
    }

    pub fn max(&self) -> f32 {
        self.min + self.extent
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.min + rng.gen::<f32>() * self.extent
    }
}

/// Parameters governing how new particles are spawned and moved.
///
/// Fields may be written at any time; changes apply from the next update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EmissionConfig {
    /// Seconds between spawns. Lower means faster.
    pub spawn_interval: f32,
    /// Seconds a particle stays alive after spawning.
    pub lifetime: f32,
    /// `speed = min + U(0, 1) * extent`
    pub start_speed: SampleRange,
    pub rotation: SampleRange,
    pub angular_velocity: SampleRange,
    /// Applied to every alive particle.
    pub acceleration: Vec3,
    /// Quad extents in pixels. Only read by the renderer.
    pub particle_size: Vec2,
    pub color: Vec4,
    pub emitter_position: Vec3,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 0.05,
            lifetime: 1.,
            start_speed: SampleRange::new(0., 100.),
            rotation: SampleRange::ZERO,
            angular_velocity: SampleRange::ZERO,
            acceleration: Vec3::ZERO,
            particle_size: vec2(100., 100.),
            color: Vec4::ONE,
            emitter_position: Vec3::ZERO,
        }
    }
}

impl EmissionConfig {
    /// Slow orange embers drifting out of a point just in front of the camera.
    pub fn fountain() -> Self {
        Self {
            spawn_interval: 0.01,
            lifetime: 2.,
            start_speed: SampleRange::new(0.1, 0.1),
            rotation: SampleRange::new(0., 6.28),
            angular_velocity: SampleRange::new(-1., 2.),
            acceleration: Vec3::ZERO,
            particle_size: vec2(100., 100.),
            color: vec4(0.9, 0.3, 0.1, 1.),
            emitter_position: vec3(0., 0., -0.5),
        }
    }

    /// Spawns per second implied by `spawn_interval`.
    pub fn spawn_rate(&self) -> f32 {
        self.spawn_interval.recip()
    }

    /// Upper bound on simultaneously alive particles in steady state.
    pub fn steady_state_count(&self) -> f32 {
        self.lifetime / self.spawn_interval
    }
}
