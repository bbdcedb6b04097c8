// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Simulation configuration
//!
//! # Environment Configuration
//!
//! [`SimulationConfig::from_env`] starts from the defaults and applies any
//! of the following overrides:
//!
//! ```bash
//! export NBODY_EFFECTS_G=1.0
//! export NBODY_EFFECTS_DT=1e-4
//! export NBODY_EFFECTS_SOFTENING=0.0
//! ```

use crate::error::{Result, SimError};

/// Gravitational constant in units of AU, solar masses and yr/2pi
pub const G_DEFAULT: f64 = 1.0;

/// Speed of light in AU / (yr/2pi), consistent with [`G_DEFAULT`]
pub const C_DEFAULT: f64 = 10064.915;

/// Default integrator timestep
pub const DT_DEFAULT: f64 = 1e-3;

/// Environment variable overriding the gravitational constant
pub const ENV_G: &str = "NBODY_EFFECTS_G";
/// Environment variable overriding the timestep
pub const ENV_DT: &str = "NBODY_EFFECTS_DT";
/// Environment variable overriding the softening length
pub const ENV_SOFTENING: &str = "NBODY_EFFECTS_SOFTENING";

/// Parameters fixed when a simulation is created
///
/// # Example
///
/// ```
/// use nbody_effects::config::SimulationConfig;
///
/// let config = SimulationConfig::default().with_dt(1e-4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Gravitational constant
    pub g: f64,
    /// Integrator timestep
    pub dt: f64,
    /// Plummer softening length for Newtonian gravity (0 = none)
    pub softening: f64,
}

impl SimulationConfig {
    /// Configuration with the given gravitational constant and default timestep
    pub fn new(g: f64) -> Self {
        SimulationConfig {
            g,
            ..Self::default()
        }
    }

    /// Replace the timestep
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Replace the softening length
    pub fn with_softening(mut self, softening: f64) -> Self {
        self.softening = softening;
        self
    }

    /// Defaults overridden by `NBODY_EFFECTS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(g) = read_env(ENV_G, "g")? {
            config.g = g;
        }
        if let Some(dt) = read_env(ENV_DT, "dt")? {
            config.dt = dt;
        }
        if let Some(softening) = read_env(ENV_SOFTENING, "softening")? {
            config.softening = softening;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is in its valid domain
    pub fn validate(&self) -> Result<()> {
        if !(self.g >= 0.0 && self.g.is_finite()) {
            return Err(SimError::invalid(
                "g",
                format!("must be non-negative and finite, got {}", self.g),
            ));
        }
        validate_timestep(self.dt)?;
        if !(self.softening >= 0.0 && self.softening.is_finite()) {
            return Err(SimError::invalid(
                "softening",
                format!("must be non-negative and finite, got {}", self.softening),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            g: G_DEFAULT,
            dt: DT_DEFAULT,
            softening: 0.0,
        }
    }
}

/// Reject non-positive or non-finite timesteps
pub(crate) fn validate_timestep(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(
            "dt",
            format!("timestep must be positive and finite, got {}", dt),
        ))
    }
}

fn read_env(var: &str, name: &'static str) -> Result<Option<f64>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| SimError::invalid(name, format!("{}='{}': {}", var, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.g, G_DEFAULT);
        assert_eq!(config.dt, DT_DEFAULT);
        assert_eq!(config.softening, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SimulationConfig::new(2.0).with_dt(0.5).with_softening(0.1);
        assert_eq!(config.g, 2.0);
        assert_eq!(config.dt, 0.5);
        assert_eq!(config.softening, 0.1);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(SimulationConfig::new(-1.0).validate().is_err());
        assert!(SimulationConfig::new(f64::NAN).validate().is_err());
        assert!(SimulationConfig::default().with_dt(0.0).validate().is_err());
        assert!(SimulationConfig::default().with_dt(f64::INFINITY).validate().is_err());
        assert!(SimulationConfig::default()
            .with_softening(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_speed_of_light_default() {
        // ~63240 AU/yr
        let c_au_per_year = C_DEFAULT * 2.0 * std::f64::consts::PI;
        assert!((c_au_per_year - 63_240.0).abs() < 10.0);
    }
}
