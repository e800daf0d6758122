use winit::event::VirtualKeyCode;

use crate::emission::EmissionConfig;

/// Runtime tweaks to the live emission parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    RaiseAcceleration,
    LowerAcceleration,
    GrowParticles,
    ShrinkParticles,
    RaiseMinSpeed,
    LowerMinSpeed,
    WidenSpeedRange,
    NarrowSpeedRange,
    SpawnFaster,
    SpawnSlower,
}

impl Control {
    pub const HELP: &'static str = "\
R and F control gravity.
T and G control particle size.
Y and H control base particle velocity.
U and J control particle velocity variance.
I and K control particle spawn rate.
Left click grabs the mouse, WASD moves, scroll zooms.
Escape releases the mouse, press again to exit.";

    pub fn from_keycode(keycode: VirtualKeyCode) -> Option<Self> {
        use VirtualKeyCode::*;

        let control = match keycode {
            R => Self::RaiseAcceleration,
            F => Self::LowerAcceleration,
            T => Self::GrowParticles,
            G => Self::ShrinkParticles,
            Y => Self::RaiseMinSpeed,
            H => Self::LowerMinSpeed,
            U => Self::WidenSpeedRange,
            J => Self::NarrowSpeedRange,
            I => Self::SpawnFaster,
            K => Self::SpawnSlower,
            _ => return None,
        };
        Some(control)
    }

    /// Applies the tweak and describes the new value.
    pub fn apply(self, emission: &mut EmissionConfig) -> String {
        match self {
            Self::RaiseAcceleration | Self::LowerAcceleration => {
                let step = if self == Self::RaiseAcceleration { 0.25 } else { -0.25 };
                emission.acceleration.y += step;
                format!("Acceleration: {}", emission.acceleration)
            }
            Self::GrowParticles | Self::ShrinkParticles => {
                let step = if self == Self::GrowParticles { 50. } else { -50. };
                emission.particle_size += step;
                format!("Particle size: {}", emission.particle_size)
            }
            Self::RaiseMinSpeed | Self::LowerMinSpeed => {
                let step = if self == Self::RaiseMinSpeed { 0.1 } else { -0.1 };
                emission.start_speed.min += step;
                format!("Start speed min: {}", emission.start_speed.min)
            }
            Self::WidenSpeedRange | Self::NarrowSpeedRange => {
                let step = if self == Self::WidenSpeedRange { 0.1 } else { -0.1 };
                emission.start_speed.extent += step;
                format!("Start speed range: {}", emission.start_speed.extent)
            }
            Self::SpawnFaster => {
                emission.spawn_interval *= 0.5;
                format!(
                    "Spawn interval: {}s ({:.0} per second)",
                    emission.spawn_interval,
                    emission.spawn_rate()
                )
            }
            Self::SpawnSlower => {
                emission.spawn_interval *= 2.;
                format!(
                    "Spawn interval: {}s ({:.0} per second)",
                    emission.spawn_interval,
                    emission.spawn_rate()
                )
            }
        }
    }
}
