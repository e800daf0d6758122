use std::f32::consts::TAU;

use bytemuck::Zeroable;
use glam::{vec3, Vec3};
use log::warn;
use rand::Rng;
use rand_pcg::Pcg64Mcg;

use crate::{emission::EmissionConfig, particle::Particle};

/// Counts gathered during a single [`ParticlePool::update`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub alive: usize,
    pub spawned: usize,
    pub expired: usize,
}

/// Sums spawns and expiries; `alive` keeps the most recent value.
impl std::ops::AddAssign for UpdateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.alive = rhs.alive;
        self.spawned += rhs.spawned;
        self.expired += rhs.expired;
    }
}

/// Fixed-capacity particle storage with time-based emission.
///
/// Slots are never added or removed. A slot is alive while its age is
/// positive; dead slots keep their stale contents until a spawn overwrites
/// them.
pub struct ParticlePool<R = Pcg64Mcg> {
    pub emission: EmissionConfig,
    particles: Box<[Particle]>,
    spawn_accumulator: f32,
    rng: R,
}

impl<R: Rng> ParticlePool<R> {
    pub const DEFAULT_CAPACITY: usize = 8192;

    pub fn new(emission: EmissionConfig, rng: R) -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY, emission, rng)
    }

    pub fn with_capacity(capacity: usize, emission: EmissionConfig, rng: R) -> Self {
        Self {
            emission,
            particles: vec![Particle::zeroed(); capacity].into_boxed_slice(),
            spawn_accumulator: 0.,
            rng,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Every slot, dead ones included, in stable order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Spawn credit carried over from previous updates, in seconds.
    pub fn spawn_accumulator(&self) -> f32 {
        self.spawn_accumulator
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Alive particles are integrated. Each dead slot may take one spawn if
    /// enough time has accumulated; a particle that dies during this call is
    /// not respawned until the next one. Negative or non-finite `dt` is
    /// treated as zero, and a zero `dt` leaves the pool untouched.
    pub fn update(&mut self, dt: f32) -> UpdateStats {
        let dt = if dt.is_finite() && dt >= 0. {
            dt
        } else {
            warn!("Ignoring invalid delta time: {}", dt);
            0.
        };

        if dt == 0. {
            return UpdateStats {
                alive: self.alive_count(),
                ..Default::default()
            };
        }

        self.spawn_accumulator += dt;

        let Self {
            emission,
            particles,
            spawn_accumulator,
            rng,
        } = self;
        let acceleration = emission.acceleration.extend(0.);

        let mut stats = UpdateStats::default();
        for particle in particles.iter_mut() {
            if particle.is_alive() {
                particle.age -= dt;
                particle.position += particle.velocity * dt;
                particle.velocity += acceleration * dt;
                particle.rotation += particle.angular_velocity * dt;

                if particle.is_alive() {
                    stats.alive += 1;
                } else {
                    stats.expired += 1;
                }
            } else if *spawn_accumulator >= emission.spawn_interval {
                *spawn_accumulator -= emission.spawn_interval;
                *particle = spawn(emission, rng);
                stats.spawned += 1;
                // A non-positive lifetime spawns straight into a dead slot.
                if particle.is_alive() {
                    stats.alive += 1;
                }
            }
        }

        stats
    }
}

fn spawn<R: Rng + ?Sized>(emission: &EmissionConfig, rng: &mut R) -> Particle {
    let speed = emission.start_speed.sample(rng);
    let velocity = random_unit_vector(rng) * speed;

    Particle::new(
        emission.emitter_position,
        velocity,
        emission.color,
        emission.rotation.sample(rng),
        emission.angular_velocity.sample(rng),
        emission.lifetime,
    )
}

/// Uniformly distributed over the unit sphere.
fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..1.0);
    let phi: f32 = rng.gen_range(0.0..TAU);
    let r = (1. - z * z).max(0.).sqrt();
    vec3(r * phi.cos(), r * phi.sin(), z)
}

#[cfg(test)]
mod tests {
    use glam::{vec4, Vec4};
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::emission::SampleRange;

    const EPSILON: f32 = 1e-5;

    fn seeded_pool(capacity: usize, emission: EmissionConfig) -> ParticlePool {
        ParticlePool::with_capacity(capacity, emission, Pcg64Mcg::seed_from_u64(42))
    }

    fn scenario_config() -> EmissionConfig {
        EmissionConfig {
            spawn_interval: 1.,
            lifetime: 2.,
            acceleration: vec3(0., -1., 0.),
            emitter_position: vec3(1., 2., 3.),
            ..Default::default()
        }
    }

    #[test]
    fn starts_all_dead() {
        let pool = seeded_pool(16, EmissionConfig::default());
        assert_eq!(pool.capacity(), 16);
        assert_eq!(pool.alive_count(), 0);
        assert!(pool.particles().iter().all(|p| p.age <= 0.));
        assert_eq!(pool.spawn_accumulator(), 0.);
    }

    #[test]
    fn default_capacity() {
        let pool = ParticlePool::new(EmissionConfig::default(), Pcg64Mcg::seed_from_u64(0));
        assert_eq!(pool.particles().len(), 8192);
    }

    #[test]
    fn spawn_then_integrate_then_spawn_again() {
        let mut pool = seeded_pool(4, scenario_config());

        let stats = pool.update(1.);
        assert_eq!(stats.spawned, 1);
        assert_eq!(pool.alive_count(), 1);
        let (index, spawned) = pool
            .particles()
            .iter()
            .enumerate()
            .find(|(_, p)| p.is_alive())
            .map(|(i, p)| (i, *p))
            .unwrap();
        assert_eq!(spawned.age, 2.);
        assert_eq!(spawned.position, vec4(1., 2., 3., 1.));
        assert!(pool.spawn_accumulator().abs() < EPSILON);

        let stats = pool.update(0.5);
        assert_eq!(stats.spawned, 0);
        let particle = pool.particles()[index];
        assert!((particle.age - 1.5).abs() < EPSILON);
        assert!((particle.velocity.y - (spawned.velocity.y - 0.5)).abs() < EPSILON);
        assert!((pool.spawn_accumulator() - 0.5).abs() < EPSILON);
        assert_eq!(pool.alive_count(), 1);

        let stats = pool.update(0.6);
        assert_eq!(stats.spawned, 1);
        assert_eq!(pool.alive_count(), 2);
        assert!((pool.spawn_accumulator() - 0.1).abs() < EPSILON);
    }

    #[test]
    fn alive_particles_integrate_kinematics() {
        let mut pool = seeded_pool(1, scenario_config());
        pool.update(1.);
        let before = pool.particles()[0];

        pool.update(0.25);
        let after = pool.particles()[0];

        let expected_position = before.position + before.velocity * 0.25;
        assert!((after.position - expected_position).abs().max_element() < EPSILON);
        assert_eq!(after.position.w, 1.);
        assert_eq!(after.velocity.w, 0.);
        assert!((after.rotation - (before.rotation + before.angular_velocity * 0.25)).abs() < EPSILON);
        assert_eq!(after.color, before.color);
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let mut pool = seeded_pool(8, scenario_config());
        pool.update(1.5);
        let particles = pool.particles().to_vec();
        let accumulator = pool.spawn_accumulator();

        let stats = pool.update(0.);

        assert_eq!(stats.spawned, 0);
        assert_eq!(stats.expired, 0);
        assert_eq!(pool.particles(), particles.as_slice());
        assert_eq!(pool.spawn_accumulator(), accumulator);
    }

    #[test]
    fn zero_delta_does_not_spend_banked_credit() {
        let mut pool = seeded_pool(1, scenario_config());
        pool.update(1.);
        // The only slot is alive, so credit piles up unused.
        pool.update(1.5);
        assert!((pool.spawn_accumulator() - 1.5).abs() < EPSILON);

        pool.update(0.);
        assert!((pool.spawn_accumulator() - 1.5).abs() < EPSILON);
    }

    #[test]
    fn invalid_delta_is_treated_as_zero() {
        let mut pool = seeded_pool(4, scenario_config());
        for dt in [-1., f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let stats = pool.update(dt);
            assert_eq!(stats, UpdateStats::default());
            assert_eq!(pool.spawn_accumulator(), 0.);
        }
    }

    #[test]
    fn expired_particle_is_not_respawned_in_the_same_call() {
        let mut pool = seeded_pool(1, scenario_config());
        pool.update(1.);
        assert_eq!(pool.alive_count(), 1);

        let before = pool.particles()[0];

        // Kills the particle with plenty of credit banked.
        let stats = pool.update(5.);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.spawned, 0);
        let expired = pool.particles()[0];
        assert!(expired.age <= 0.);
        assert_eq!(expired.color, before.color);

        // Dead slots keep their stale contents until a spawn overwrites them.
        pool.update(0.);
        assert_eq!(pool.particles()[0], expired);
        pool.emission.spawn_interval = 100.;
        pool.emission.emitter_position = vec3(9., 9., 9.);
        pool.emission.color = Vec4::ZERO;
        let stats = pool.update(0.5);
        assert_eq!(stats.spawned, 0);
        assert_eq!(pool.particles()[0].position, expired.position);
        assert_eq!(pool.particles()[0].velocity, expired.velocity);
        assert_eq!(pool.particles()[0].color, expired.color);
        assert_eq!(pool.particles()[0].age, expired.age);
        pool.emission = scenario_config();

        let stats = pool.update(0.1);
        assert_eq!(stats.spawned, 1);
        assert_eq!(pool.particles()[0].age, 2.);
    }

    #[test]
    fn one_spawn_per_dead_slot_per_call() {
        let mut pool = seeded_pool(3, scenario_config());
        let stats = pool.update(10.);
        assert_eq!(stats.spawned, 3);
        assert!((pool.spawn_accumulator() - 7.).abs() < EPSILON);
    }

    #[test]
    fn credit_accumulates_while_pool_is_full() {
        let mut pool = seeded_pool(
            2,
            EmissionConfig {
                lifetime: 100.,
                ..scenario_config()
            },
        );
        pool.update(2.);
        assert_eq!(pool.alive_count(), 2);

        for _ in 0..10 {
            assert_eq!(pool.update(1.).spawned, 0);
        }
        assert!((pool.spawn_accumulator() - 10.).abs() < EPSILON);
    }

    #[test]
    fn non_positive_interval_saturates() {
        let mut pool = seeded_pool(
            5,
            EmissionConfig {
                spawn_interval: -0.5,
                lifetime: 0.1,
                ..scenario_config()
            },
        );
        assert_eq!(pool.update(0.01).spawned, 5);
        assert_eq!(pool.alive_count(), 5);

        pool.update(1.);
        assert_eq!(pool.alive_count(), 0);
        assert_eq!(pool.update(0.01).spawned, 5);
    }

    #[test]
    fn non_positive_lifetime_spawns_are_not_counted_alive() {
        for lifetime in [0., -1.] {
            let mut pool = seeded_pool(
                4,
                EmissionConfig {
                    spawn_interval: 0.1,
                    lifetime,
                    ..Default::default()
                },
            );
            let stats = pool.update(1.);
            assert_eq!(stats.spawned, 4);
            assert_eq!(stats.alive, 0);
            assert_eq!(stats.alive, pool.alive_count());
        }
    }

    #[test]
    fn spawn_rate_is_conserved_under_irregular_frames() {
        let interval = 0.01;
        let mut pool = seeded_pool(
            4096,
            EmissionConfig {
                spawn_interval: interval,
                lifetime: 1000.,
                ..Default::default()
            },
        );

        let frames = [0.016, 0.001, 0.1, 0.033, 0.0005, 0.25, 0.007];
        let mut total_time = 0f32;
        let mut spawned = 0;
        for dt in frames.iter().cycle().take(200) {
            total_time += *dt;
            spawned += pool.update(*dt).spawned;
        }

        let expected = total_time / interval;
        assert!(pool.alive_count() < pool.capacity());
        assert!(
            (spawned as f32 - expected).abs() <= 1.,
            "spawned {spawned}, expected {expected}"
        );
    }

    #[test]
    fn spawned_particles_use_emission_parameters() {
        let emission = EmissionConfig {
            spawn_interval: 0.,
            lifetime: 3.,
            start_speed: SampleRange::new(2., 1.),
            rotation: SampleRange::new(0., 6.28),
            angular_velocity: SampleRange::new(-1., 2.),
            color: vec4(0.9, 0.3, 0.1, 1.),
            emitter_position: vec3(0., 0., -0.5),
            ..Default::default()
        };
        let mut pool = seeded_pool(2048, emission);
        pool.update(1e-6);

        let mut direction_sum = Vec3::ZERO;
        for particle in pool.particles() {
            let velocity = particle.velocity.truncate();
            let speed = velocity.length();
            assert!((2. - 1e-4..=3. + 1e-4).contains(&speed), "speed {speed}");
            assert!((0.0..=6.28).contains(&particle.rotation));
            assert!((-1.0..=1.).contains(&particle.angular_velocity));
            assert_eq!(particle.color, emission.color);
            assert_eq!(particle.age, 3.);
            assert_eq!(particle.position, vec4(0., 0., -0.5, 1.));
            direction_sum += velocity / speed;
        }

        let mean_direction = direction_sum / pool.capacity() as f32;
        assert!(mean_direction.length() < 0.1, "{mean_direction:?}");
    }

    #[test]
    fn directions_cover_every_octant() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let mut octants = [0usize; 8];
        for _ in 0..8000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.).abs() < 1e-4);
            let index = (v.x > 0.) as usize | ((v.y > 0.) as usize) << 1 | ((v.z > 0.) as usize) << 2;
            octants[index] += 1;
        }
        for count in octants {
            assert!((800..1200).contains(&count), "{octants:?}");
        }
    }

    #[test]
    fn config_changes_apply_to_next_spawn() {
        let mut pool = seeded_pool(2, scenario_config());
        pool.update(1.);
        pool.emission.color = Vec4::new(0., 1., 0., 1.);
        pool.emission.lifetime = 5.;
        pool.update(1.);

        let colors: Vec<Vec4> = pool.particles().iter().map(|p| p.color).collect();
        assert!(colors.contains(&Vec4::ONE));
        assert!(colors.contains(&Vec4::new(0., 1., 0., 1.)));
        assert!(pool.particles().iter().any(|p| p.age == 5.));
    }

    #[test]
    fn stats_accumulate() {
        let mut total = UpdateStats::default();
        total += UpdateStats {
            alive: 3,
            spawned: 2,
            expired: 1,
        };
        total += UpdateStats {
            alive: 1,
            spawned: 0,
            expired: 2,
        };
        assert_eq!(
            total,
            UpdateStats {
                alive: 1,
                spawned: 2,
                expired: 3,
            }
        );
    }

    proptest! {
        #[test]
        fn age_never_increases_without_respawn(dts in prop::collection::vec(0.001f32..0.5, 1..64)) {
            let mut pool = seeded_pool(
                1,
                EmissionConfig {
                    spawn_interval: 1.,
                    lifetime: 2.,
                    ..Default::default()
                },
            );
            pool.update(1.);

            let mut previous = pool.particles()[0].age;
            for dt in dts {
                let stats = pool.update(dt);
                let age = pool.particles()[0].age;
                if stats.spawned == 1 {
                    prop_assert_eq!(age, 2.);
                } else if previous > 0. {
                    prop_assert!(age < previous);
                } else {
                    prop_assert!(age <= previous);
                }
                previous = age;
            }
        }

        #[test]
        fn alive_count_never_exceeds_capacity(
            capacity in 1usize..32,
            interval in -0.1f32..0.2,
            lifetime in -0.5f32..1.,
            dts in prop::collection::vec(0.0f32..0.3, 1..32),
        ) {
            let mut pool = seeded_pool(
                capacity,
                EmissionConfig {
                    spawn_interval: interval,
                    lifetime,
                    ..Default::default()
                },
            );
            for dt in dts {
                let stats = pool.update(dt);
                prop_assert!(stats.alive <= capacity);
                prop_assert_eq!(stats.alive, pool.alive_count());
                prop_assert_eq!(pool.particles().len(), capacity);
            }
        }
    }
}
