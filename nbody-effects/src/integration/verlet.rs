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
//! Velocity Verlet integrator implementation
//!
//! The velocity Verlet algorithm is a symplectic integrator that provides
//! excellent energy conservation for Hamiltonian systems and is well suited
//! to orbital mechanics.
//!
//! # Algorithm
//!
//! ```text
//! x(t + dt) = x(t) + v(t)*dt + 0.5*a(t)*dt²
//! v*        = v(t) + a(t)*dt
//! a(t + dt) = a(x(t + dt), v*)
//! v(t + dt) = v(t) + 0.5*(a(t) + a(t + dt))*dt
//! ```
//!
//! Velocity-dependent accelerations (such as the post-Newtonian correction)
//! are evaluated with the predicted velocity `v*`, which keeps the scheme
//! second order with a single force evaluation per step.
//!
//! # Properties
//!
//! - **Time-reversible** for position-only forces
//! - **Energy conservation**: Bounded energy error over long periods
//! - **Second-order accurate**: Local error O(dt³), global error O(dt²)
//!
//! # References
//!
//! - Hairer, E., Lubich, C., & Wanner, G. (2006). Geometric Numerical Integration:
//!   Structure-Preserving Algorithms for Ordinary Differential Equations (2nd ed.).
//!   Springer. Section II.3.
//! - Swope, W. C., Andersen, H. C., Berens, P. H., & Wilson, K. R. (1982).
//!   The Journal of Chemical Physics, 76(1), 637-649.

use super::{ForceEvaluation, Integrator};
use crate::error::Result;
use crate::sim::{ParticleStore, Vec3};

/// Velocity Verlet integrator
///
/// # Example
///
/// ```
/// use nbody_effects::integration::{Integrator, VelocityVerletIntegrator};
///
/// let integrator = VelocityVerletIntegrator::new();
/// assert_eq!(integrator.name(), "Velocity Verlet");
/// ```
#[derive(Debug, Default)]
pub struct VelocityVerletIntegrator {
    // Reusable buffer of (x(t), v(t), a(t)) to avoid allocation on each step
    previous: Vec<(Vec3, Vec3, Vec3)>,
}

impl VelocityVerletIntegrator {
    /// Create a new velocity Verlet integrator
    pub fn new() -> Self {
        VelocityVerletIntegrator {
            previous: Vec::new(),
        }
    }

    fn rollback(&self, particles: &mut ParticleStore) {
        for (particle, &(position, velocity, acceleration)) in
            particles.as_mut_slice().iter_mut().zip(&self.previous)
        {
            particle.set_position(position);
            particle.set_velocity(velocity);
            particle.reset_acceleration();
            particle.add_acceleration(acceleration);
        }
    }
}

impl Integrator for VelocityVerletIntegrator {
    fn name(&self) -> &str {
        "Velocity Verlet"
    }

    fn step(
        &mut self,
        particles: &mut ParticleStore,
        dt: f64,
        forces: &mut ForceEvaluation<'_>,
    ) -> Result<()> {
        let half_dt_sq = 0.5 * dt * dt;

        // Step 1: drift positions and predict velocities
        self.previous.clear();
        for particle in particles.as_mut_slice() {
            let position = particle.position();
            let velocity = particle.velocity();
            let acceleration = particle.acceleration();
            self.previous.push((position, velocity, acceleration));

            particle.set_position(position + velocity * dt + acceleration * half_dt_sq);
            particle.set_velocity(velocity + acceleration * dt);
        }

        // Step 2: accelerations at the new positions; a failed evaluation
        // leaves the store at x(t), v(t), a(t)
        if let Err(err) = forces(particles) {
            self.rollback(particles);
            return Err(err);
        }

        // Step 3: correct velocities with the averaged acceleration
        for (particle, &(_, velocity, old_acceleration)) in
            particles.as_mut_slice().iter_mut().zip(&self.previous)
        {
            let average = 0.5 * (old_acceleration + particle.acceleration());
            particle.set_velocity(velocity + average * dt);
        }

        Ok(())
    }
}
