pub mod camera;
pub mod controls;
pub mod emission;
pub mod error;
pub mod material;
pub mod particle;
pub mod pool;
pub mod renderer;
pub mod settings;

pub use emission::{EmissionConfig, SampleRange};
pub use particle::Particle;
pub use pool::{ParticlePool, UpdateStats};
pub use renderer::bridge::{submit, FrameSink, FrameUniforms};
