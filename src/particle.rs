use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// A single pool slot.
///
/// The layout is uploaded to the GPU as-is, one record per instance, so field
/// order and size must stay in sync with `particle.wgsl` and
/// [`Particle::ATTRIBUTES`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Particle {
    /// World space, `w` is always 1.
    pub position: Vec4,
    /// World units per second, `w` is always 0.
    pub velocity: Vec4,
    pub color: Vec4,
    /// Radians.
    pub rotation: f32,
    /// Radians per second.
    pub angular_velocity: f32,
    /// Remaining lifetime in seconds. Alive while positive.
    pub age: f32,
    _pad0: f32,
}

impl Particle {
    pub const SIZE: wgpu::BufferAddress = size_of::<Self>() as _;

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32,
        4 => Float32,
        5 => Float32
    ];

    pub fn new(
        position: Vec3,
        velocity: Vec3,
        color: Vec4,
        rotation: f32,
        angular_velocity: f32,
        age: f32,
    ) -> Self {
        Self {
            position: position.extend(1.),
            velocity: velocity.extend(0.),
            color,
            rotation,
            angular_velocity,
            age,
            _pad0: 0.,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.age > 0.
    }

    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
