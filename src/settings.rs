use std::{str::FromStr, time::SystemTime};

use log::warn;

use crate::{emission::EmissionConfig, pool::ParticlePool};

pub const SEED_VAR: &str = "EMBER_SEED";
pub const CAPACITY_VAR: &str = "EMBER_CAPACITY";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    pub frames_per_second: f64,
    pub capacity: usize,
    pub seed: u64,
    pub sprite_size: u32,
    pub emission: EmissionConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            frames_per_second: 60.,
            capacity: ParticlePool::<rand_pcg::Pcg64Mcg>::DEFAULT_CAPACITY,
            seed: unix_millis(),
            sprite_size: 64,
            emission: EmissionConfig::fountain(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known keys.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(seed) = parse_var(&lookup, SEED_VAR) {
            settings.seed = seed;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, CAPACITY_VAR) {
            if capacity == 0 {
                warn!("Ignoring {}=0", CAPACITY_VAR);
            } else {
                settings.capacity = capacity;
            }
        }
        settings
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, value, e);
            None
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.capacity, 8192);
        assert_eq!(settings.emission, EmissionConfig::fountain());
        assert_eq!((settings.window_width, settings.window_height), (800, 600));
    }

    #[test]
    fn overrides_seed_and_capacity() {
        let settings =
            Settings::from_lookup(lookup(&[(SEED_VAR, "1234"), (CAPACITY_VAR, " 256 ")]));
        assert_eq!(settings.seed, 1234);
        assert_eq!(settings.capacity, 256);
    }

    #[test]
    fn ignores_invalid_overrides() {
        let settings =
            Settings::from_lookup(lookup(&[(SEED_VAR, "abc"), (CAPACITY_VAR, "-3")]));
        assert_eq!(settings.capacity, 8192);

        let settings = Settings::from_lookup(lookup(&[(CAPACITY_VAR, "0")]));
        assert_eq!(settings.capacity, 8192);
    }
}
