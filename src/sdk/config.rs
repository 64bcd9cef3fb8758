use crate::sdk::proximity::cluster::{DEFAULT_CLUSTER_RADIUS_KM, MIN_CLUSTER_INPUT};
use crate::sdk::proximity::error::{validate_radius, ProximityError, Result};
use std::{env, str::FromStr};

pub const CLUSTER_RADIUS_VAR: &str = "PAWWATCH_CLUSTER_RADIUS_KM";
pub const SEARCH_RADIUS_VAR: &str = "PAWWATCH_SEARCH_RADIUS_KM";
pub const MIN_CLUSTER_INPUT_VAR: &str = "PAWWATCH_MIN_CLUSTER_INPUT";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Entities strictly closer than this are merged into one marker.
    pub cluster_radius_km: f64,
    /// Search radius used when the caller does not give one.
    pub default_search_radius_km: f64,
    pub min_cluster_input: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cluster_radius_km: DEFAULT_CLUSTER_RADIUS_KM,
            default_search_radius_km: 10.0,
            min_cluster_input: MIN_CLUSTER_INPUT,
        }
    }
}

impl EngineConfig {
    /// Reads overrides from the environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`EngineConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cluster_radius_km = parse_var(&lookup, CLUSTER_RADIUS_VAR)?
            .map(validate_radius)
            .transpose()?
            .unwrap_or(defaults.cluster_radius_km);
        let default_search_radius_km = parse_var(&lookup, SEARCH_RADIUS_VAR)?
            .map(validate_radius)
            .transpose()?
            .unwrap_or(defaults.default_search_radius_km);
        let min_cluster_input =
            parse_var(&lookup, MIN_CLUSTER_INPUT_VAR)?.unwrap_or(defaults.min_cluster_input);

        let config = Self {
            cluster_radius_km,
            default_search_radius_km,
            min_cluster_input,
        };
        log::debug!("Engine configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ProximityError::Config {
            var: var.to_string(),
            message: format!("{:?}: {}", raw, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cluster_radius_km, 0.5);
        assert_eq!(config.min_cluster_input, 3);
    }

    #[test]
    fn reads_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (CLUSTER_RADIUS_VAR, "0.75"),
            (SEARCH_RADIUS_VAR, " 25 "),
            (MIN_CLUSTER_INPUT_VAR, "4"),
        ]))
        .unwrap();
        assert_eq!(config.cluster_radius_km, 0.75);
        assert_eq!(config.default_search_radius_km, 25.0);
        assert_eq!(config.min_cluster_input, 4);
    }

    #[test]
    fn rejects_malformed_and_negative_values() {
        let err = EngineConfig::from_lookup(lookup_from(&[(CLUSTER_RADIUS_VAR, "half a km")])).unwrap_err();
        assert!(matches!(err, ProximityError::Config { ref var, .. } if var == CLUSTER_RADIUS_VAR));

        let err = EngineConfig::from_lookup(lookup_from(&[(SEARCH_RADIUS_VAR, "-3")])).unwrap_err();
        assert_eq!(err, ProximityError::InvalidRadius(-3.0));
    }
}
