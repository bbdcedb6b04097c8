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
//! Conserved-quantity diagnostics
//!
//! Nothing here runs automatically. Call [`compute_energy`] directly, or
//! pass an [`EnergyMonitor`] to [`Simulation::integrate`] as the heartbeat:
//!
//! ```
//! use nbody_effects::diagnostics::EnergyMonitor;
//! use nbody_effects::sim::Vec3;
//! use nbody_effects::Simulation;
//!
//! let mut sim = Simulation::new(1.0).unwrap();
//! sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
//! sim.add_particle(1e-6, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
//!
//! let mut monitor = EnergyMonitor::new();
//! monitor.observe(&sim).unwrap();
//! sim.integrate(0.1, |s| monitor.observe(s)).unwrap();
//! assert!(monitor.max_drift() < 1e-5);
//! ```

use log::{debug, trace};

use crate::error::{Result, SimError};
use crate::sim::{Particle, Simulation};

/// Total kinetic energy **T = Σ ½ m v²**
pub fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles
        .iter()
        .map(|p| 0.5 * p.mass() * p.velocity().norm_squared())
        .sum()
}

/// Newtonian pairwise potential energy of the simulation
pub fn potential_energy(sim: &Simulation) -> Result<f64> {
    sim.gravity().potential_energy(sim.particles())
}

/// Total energy: kinetic, Newtonian potential and every effect's correction
///
/// # Errors
///
/// [`SimError::SingularConfiguration`] when two particles that interact
/// share a position, or any error reported by an effect's energy hook.
pub fn compute_energy(sim: &Simulation) -> Result<f64> {
    let mut energy = kinetic_energy(sim.particles()) + potential_energy(sim)?;
    for effect in sim.effects().iter() {
        energy += effect.energy(sim.g(), sim.store())?;
    }
    Ok(energy)
}

/// Heartbeat that tracks relative energy drift `|E - E0| / |E0|`
///
/// The first observation fixes `E0`. With an interval set, later
/// observations are only taken on steps where
/// [`Simulation::output_check`] fires.
#[derive(Debug, Clone, Default)]
pub struct EnergyMonitor {
    interval: Option<f64>,
    initial: Option<f64>,
    last_drift: f64,
    max_drift: f64,
    samples: usize,
}

impl EnergyMonitor {
    /// Monitor sampling on every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Monitor sampling once per `interval` of simulated time
    pub fn with_interval(interval: f64) -> Result<Self> {
        if !(interval > 0.0 && interval.is_finite()) {
            return Err(SimError::invalid(
                "interval",
                format!("must be positive and finite, got {}", interval),
            ));
        }
        Ok(EnergyMonitor {
            interval: Some(interval),
            ..Self::default()
        })
    }

    /// Record the energy of `sim` if a sample is due
    pub fn observe(&mut self, sim: &Simulation) -> Result<()> {
        if let (Some(interval), Some(_)) = (self.interval, self.initial) {
            if !sim.output_check(interval) {
                return Ok(());
            }
        }

        let energy = compute_energy(sim)?;
        self.samples += 1;

        let Some(e0) = self.initial else {
            debug!("Reference energy E0 = {:e} at t = {}", energy, sim.time());
            self.initial = Some(energy);
            return Ok(());
        };

        let drift = if e0 != 0.0 {
            ((energy - e0) / e0).abs()
        } else {
            (energy - e0).abs()
        };
        self.last_drift = drift;
        self.max_drift = self.max_drift.max(drift);
        trace!("t = {}: E = {:e}, drift = {:e}", sim.time(), energy, drift);
        Ok(())
    }

    /// Reference energy, once observed
    pub fn initial_energy(&self) -> Option<f64> {
        self.initial
    }

    /// Drift at the most recent sample
    pub fn last_drift(&self) -> f64 {
        self.last_drift
    }

    /// Largest drift seen so far
    pub fn max_drift(&self) -> f64 {
        self.max_drift
    }

    /// Number of samples taken, including the reference
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Forget the reference energy and all statistics
    pub fn reset(&mut self) {
        *self = EnergyMonitor {
            interval: self.interval,
            ..Self::default()
        };
    }
}
