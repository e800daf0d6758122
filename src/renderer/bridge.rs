use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use rand::Rng;

use crate::{particle::Particle, pool::ParticlePool};

/// Shader parameters set before each particle draw.
///
/// Mirrors the `Uniforms` block in `particle.wgsl`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    pub view_projection: Mat4,
    /// Render target size in pixels.
    pub viewport: Vec2,
    /// Quad extents in pixels.
    pub particle_size: Vec2,
}

impl FrameUniforms {
    pub const SIZE: wgpu::BufferAddress = size_of::<Self>() as _;
}

/// Anything that can draw one frame of particles.
///
/// Implementors receive every slot of the pool, in the same order each
/// frame, and are expected to replace whatever they uploaded previously.
pub trait FrameSink {
    type Error;

    fn submit_frame(
        &mut self,
        particles: &[Particle],
        uniforms: &FrameUniforms,
    ) -> Result<(), Self::Error>;
}

/// Hands the pool's current buffer to `sink` together with the host's camera
/// and viewport.
pub fn submit<R, S>(
    sink: &mut S,
    pool: &ParticlePool<R>,
    view_projection: Mat4,
    viewport: Vec2,
) -> Result<(), S::Error>
where
    R: Rng,
    S: FrameSink + ?Sized,
{
    let uniforms = FrameUniforms {
        view_projection,
        viewport,
        particle_size: pool.emission.particle_size,
    };
    sink.submit_frame(pool.particles(), &uniforms)
}
