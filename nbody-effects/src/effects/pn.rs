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
//! First-order post-Newtonian correction around a single source mass
//!
//! Adds the leading general-relativistic correction to the acceleration of
//! every particle orbiting a designated source particle. Only the source is
//! treated as generating the relativistic field: its own acceleration is
//! never modified.
//!
//! # Physics Background
//!
//! For a test particle at relative position **r** and relative velocity
//! **v** around a mass M, in harmonic coordinates and with `mu = G M`:
//!
//! **a_1PN = mu / (c² r³) · [ (4 mu / r − v²) r + 4 (r · v) v ]**
//!
//! The correction scales as `1/c²` and vanishes as `c → ∞`. On a bound
//! orbit it produces an apsidal precession per revolution of
//!
//! **Δω = 6π mu / (c² a (1 − e²))**
//!
//! The matching conserved energy per unit test mass is
//!
//! **E = v²/2 − mu/r + (1/c²) · ( 3v⁴/8 + 3 mu v² / (2r) + mu² / (2r²) )**
//!
//! # References
//!
//! - Anderson, J. D., et al. (1975). "Tests of general relativity using
//!   astrometric and radio metric observations of the planets"
//! - Benitez, F., & Gallardo, T. (2008). "The relativistic factor in the
//!   orbital dynamics of point masses", Celest. Mech. Dyn. Astr. 101, 289
//! - Will, C. M. (2014). "The Confrontation between General Relativity and
//!   Experiment", Living Rev. Relativity 17, 4

use crate::effects::api::{Effect, EffectContext};
use crate::error::{Result, SimError};
use crate::sim::{Particle, ParticleRef, ParticleStore, Vec3};
use std::any::Any;

/// 1PN acceleration correction relative to one source particle
///
/// # Example
///
/// ```
/// use nbody_effects::config::C_DEFAULT;
/// use nbody_effects::effects::PnCorrection;
/// use nbody_effects::sim::Vec3;
/// use nbody_effects::Simulation;
/// use std::sync::Arc;
///
/// let mut sim = Simulation::new(1.0).unwrap();
/// let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
/// sim.add_particle(1e-6, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
///
/// let gr = PnCorrection::new(sun, C_DEFAULT).unwrap();
/// let handle = sim.add_effect(Arc::new(gr)).unwrap();
/// assert!(sim.effects().contains(handle));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnCorrection {
    source: ParticleRef,
    c: f64,
}

impl PnCorrection {
    /// Create the effect for `source` with speed of light `c`
    ///
    /// `c` must be positive and finite, in the unit system of the
    /// simulation.
    pub fn new(source: ParticleRef, c: f64) -> Result<Self> {
        if !(c > 0.0 && c.is_finite()) {
            return Err(SimError::invalid(
                "c",
                format!("speed of light must be positive and finite, got {}", c),
            ));
        }
        Ok(PnCorrection { source, c })
    }

    /// The source particle
    pub fn source(&self) -> ParticleRef {
        self.source
    }

    /// Speed of light
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Correction to the acceleration of `particle` due to `source`
    ///
    /// `indices` only labels a [`SimError::SingularConfiguration`].
    pub fn correction(
        &self,
        g: f64,
        source: &Particle,
        particle: &Particle,
        indices: (usize, usize),
    ) -> Result<Vec3> {
        let (r, v, r_mag) = relative_state(source, particle, indices)?;
        let mu = g * source.mass();
        let c2 = self.c * self.c;
        let v2 = v.norm_squared();

        let prefactor = mu / (c2 * r_mag * r_mag * r_mag);
        let radial = prefactor * (4.0 * mu / r_mag - v2);
        let along_v = prefactor * 4.0 * r.dot(&v);

        Ok(radial * r + along_v * v)
    }

    /// 1PN energy term of `particle` relative to `source`
    ///
    /// This excludes the Newtonian kinetic and potential energy, which
    /// [`crate::diagnostics`] computes for the whole system.
    pub fn energy_correction(
        &self,
        g: f64,
        source: &Particle,
        particle: &Particle,
        indices: (usize, usize),
    ) -> Result<f64> {
        let (_, v, r_mag) = relative_state(source, particle, indices)?;
        let mu = g * source.mass();
        let c2 = self.c * self.c;
        let v2 = v.norm_squared();

        let per_unit_mass = 0.375 * v2 * v2
            + 1.5 * mu * v2 / r_mag
            + 0.5 * mu * mu / (r_mag * r_mag);

        Ok(particle.mass() * per_unit_mass / c2)
    }
}

/// Relative position, velocity and separation; rejects coincident bodies
fn relative_state(
    source: &Particle,
    particle: &Particle,
    (source_index, index): (usize, usize),
) -> Result<(Vec3, Vec3, f64)> {
    let r = particle.position() - source.position();
    let v = particle.velocity() - source.velocity();
    let r_mag = r.norm();

    if r_mag == 0.0 {
        return Err(SimError::SingularConfiguration {
            first: source_index,
            second: index,
        });
    }

    Ok((r, v, r_mag))
}

impl Effect for PnCorrection {
    fn name(&self) -> &str {
        "pn_correction"
    }

    fn initialize(&self, particles: &ParticleStore) -> Result<()> {
        particles.index_of(self.source).map(|_| ())
    }

    fn apply(&self, context: &mut EffectContext) -> Result<()> {
        let source_index = context.index_of(self.source)?;
        let g = context.g();
        let source = context.particles()[source_index];

        for index in 0..context.particles().len() {
            if index == source_index {
                continue;
            }
            let particle = context.particles()[index];
            let delta = self.correction(g, &source, &particle, (source_index, index))?;
            context.add_acceleration(index, delta);
        }

        Ok(())
    }

    fn energy(&self, g: f64, particles: &ParticleStore) -> Result<f64> {
        let source_index = particles.index_of(self.source)?;
        let all = particles.as_slice();
        let source = &all[source_index];

        let mut total = 0.0;
        for (index, particle) in all.iter().enumerate() {
            if index == source_index {
                continue;
            }
            total += self.energy_correction(g, source, particle, (source_index, index))?;
        }
        Ok(total)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
