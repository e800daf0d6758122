use pollster::FutureExt as _;
use wgpu::util::DeviceExt;

use crate::error::ResourceError;

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::unavailable(
                "sprite",
                format!("empty image {}x{}", width, height),
            ));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ResourceError::unavailable(
                "sprite",
                format!("expected {} bytes, got {}", expected, rgba.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// White disc whose alpha falls off quadratically towards the edge.
    pub fn soft_disc(size: u32) -> Self {
        let size = size.max(1);
        let half = size as f32 * 0.5;
        let rgba = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let dx = (x as f32 + 0.5 - half) / half;
                let dy = (y as f32 + 0.5 - half) / half;
                let falloff = (1. - (dx * dx + dy * dy).sqrt()).max(0.);
                let alpha = (falloff * falloff * 255.).round() as u8;
                [255, 255, 255, alpha]
            })
            .collect();
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.rgba[(y * self.width + x) as usize * 4 + 3]
    }
}

/// GPU handles the particle pass samples from and runs.
pub struct ParticleMaterial {
    _texture: wgpu::Texture,
    texture_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    shader: wgpu::ShaderModule,
}

impl ParticleMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        sprite: &SpriteImage,
    ) -> Result<Self, ResourceError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Particle Sprite Texture"),
                size: wgpu::Extent3d {
                    width: sprite.width(),
                    height: sprite.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            },
            sprite.rgba(),
        );
        let texture_view = texture.create_view(&Default::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Particle Sprite Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(&wgpu::include_wgsl!("shaders/particle.wgsl"));

        if let Some(error) = device.pop_error_scope().block_on() {
            return Err(ResourceError::unavailable("particle material", error));
        }

        Ok(Self {
            _texture: texture,
            texture_view,
            sampler,
            shader,
        })
    }

    pub fn texture_view(&self) -> &wgpu::TextureView {
        &self.texture_view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn shader(&self) -> &wgpu::ShaderModule {
        &self.shader
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, 4, 0 ; "zero width")]
    #[test_case(4, 0, 0 ; "zero height")]
    #[test_case(2, 2, 15 ; "short buffer")]
    #[test_case(2, 2, 17 ; "long buffer")]
    fn rejects_malformed_images(width: u32, height: u32, len: usize) {
        let error = SpriteImage::new(width, height, vec![0; len]).unwrap_err();
        let ResourceError::Unavailable { resource, .. } = error;
        assert_eq!(resource, "sprite");
    }

    #[test]
    fn accepts_matching_buffer() {
        let image = SpriteImage::new(2, 3, vec![7; 24]).unwrap();
        assert_eq!((image.width(), image.height()), (2, 3));
        assert_eq!(image.alpha_at(1, 2), 7);
    }

    #[test]
    fn soft_disc_fades_from_center_to_corners() {
        let sprite = SpriteImage::soft_disc(64);
        assert_eq!(sprite.rgba().len(), 64 * 64 * 4);
        assert!(sprite.alpha_at(32, 32) > 240);
        assert_eq!(sprite.alpha_at(0, 0), 0);
        assert_eq!(sprite.alpha_at(63, 63), 0);
        assert!(sprite.alpha_at(32, 16) < sprite.alpha_at(32, 30));
        assert!(sprite
            .rgba()
            .chunks_exact(4)
            .all(|px| px[..3] == [255, 255, 255]));
    }

    #[test]
    fn soft_disc_is_symmetric() {
        let sprite = SpriteImage::soft_disc(16);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(sprite.alpha_at(x, y), sprite.alpha_at(15 - x, y));
                assert_eq!(sprite.alpha_at(x, y), sprite.alpha_at(x, 15 - y));
            }
        }
    }

    #[test]
    fn error_message_names_resource() {
        let error = ResourceError::unavailable("particle material", "bad shader");
        assert_eq!(error.to_string(), "particle material unavailable: bad shader");
    }
}
