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
//! Newtonian gravity between all particle pairs
//!
//! # Physics Background
//!
//! Every particle is accelerated towards every other massive particle:
//!
//! **a_i = Σ_j G m_j (r_j − r_i) / (|r_j − r_i|² + ε²)^(3/2)**
//!
//! where ε is an optional Plummer softening length. With ε = 0, coincident
//! particles are a [`SimError::SingularConfiguration`].
//!
//! # References
//!
//! - Aarseth, S. J. (2003). "Gravitational N-Body Simulations"
//! - Dehnen, W. (2001). "Towards optimal softening in three-dimensional N-body codes"
//!
//! # Parallel Computation
//!
//! Off by default: the integration loop, the effect registry and every
//! effect run on the calling thread. Enabling the opt-in `parallel` feature
//! computes the Newtonian accelerations of large systems on the Rayon pool,
//! one particle per task. Each particle still sums its partners in index
//! order, so results are bit-identical to the sequential path, and effects
//! still run sequentially after the gravity pass.

use crate::error::{Result, SimError};
use crate::sim::{Particle, ParticleStore, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Particle count below which the sequential path is always used
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Pairwise Newtonian gravity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    g: f64,
    softening: f64,
    parallel_threshold: usize,
}

impl NewtonianGravity {
    /// Create the force with gravitational constant `g` and softening length
    pub fn new(g: f64, softening: f64) -> Result<Self> {
        if !(g >= 0.0 && g.is_finite()) {
            return Err(SimError::invalid(
                "g",
                format!("must be non-negative and finite, got {}", g),
            ));
        }
        if !(softening >= 0.0 && softening.is_finite()) {
            return Err(SimError::invalid(
                "softening",
                format!("must be non-negative and finite, got {}", softening),
            ));
        }
        Ok(NewtonianGravity {
            g,
            softening,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Gravitational constant
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Softening length
    pub fn softening(&self) -> f64 {
        self.softening
    }

    /// Set the particle count from which work is spread over threads
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Add Newtonian accelerations to every particle in the store
    pub fn accumulate(&self, store: &mut ParticleStore) -> Result<()> {
        let accelerations = self.compute(store.as_slice())?;
        for (index, acceleration) in accelerations.into_iter().enumerate() {
            store.add_acceleration(index, acceleration);
        }
        Ok(())
    }

    /// Newtonian acceleration of every particle, in store order
    pub fn compute(&self, particles: &[Particle]) -> Result<Vec<Vec3>> {
        #[cfg(feature = "parallel")]
        {
            if particles.len() >= self.parallel_threshold {
                return (0..particles.len())
                    .into_par_iter()
                    .map(|index| self.acceleration_on(index, particles))
                    .collect();
            }
        }

        (0..particles.len())
            .map(|index| self.acceleration_on(index, particles))
            .collect()
    }

    /// Acceleration of particle `index` from all other particles
    pub fn acceleration_on(&self, index: usize, particles: &[Particle]) -> Result<Vec3> {
        let target = &particles[index];
        let eps2 = self.softening * self.softening;
        let mut total = Vec3::zero();

        for (other_index, other) in particles.iter().enumerate() {
            if other_index == index || other.mass() == 0.0 {
                continue;
            }

            let dr = other.position() - target.position();
            let softened_r2 = dr.norm_squared() + eps2;
            if softened_r2 == 0.0 {
                return Err(SimError::SingularConfiguration {
                    first: index.min(other_index),
                    second: index.max(other_index),
                });
            }

            let r = softened_r2.sqrt();
            total += (self.g * other.mass() / (softened_r2 * r)) * dr;
        }

        Ok(total)
    }

    /// Newtonian potential energy of the whole system
    ///
    /// **U = −Σ_{i<j} G m_i m_j / sqrt(|r_ij|² + ε²)**
    pub fn potential_energy(&self, particles: &[Particle]) -> Result<f64> {
        let eps2 = self.softening * self.softening;
        let mut total = 0.0;

        for (i, a) in particles.iter().enumerate() {
            for (offset, b) in particles[i + 1..].iter().enumerate() {
                let j = i + 1 + offset;
                let softened_r2 = (b.position() - a.position()).norm_squared() + eps2;
                if softened_r2 == 0.0 {
                    if a.mass() == 0.0 || b.mass() == 0.0 {
                        continue;
                    }
                    return Err(SimError::SingularConfiguration { first: i, second: j });
                }
                total -= self.g * a.mass() * b.mass() / softened_r2.sqrt();
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Mass;

    fn particle(mass: f64, x: f64) -> Particle {
        Particle::new(Mass::new(mass).unwrap(), Vec3::new(x, 0.0, 0.0), Vec3::zero())
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(NewtonianGravity::new(-1.0, 0.0).is_err());
        assert!(NewtonianGravity::new(1.0, -1.0).is_err());
        assert!(NewtonianGravity::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_pairwise_acceleration() {
        let gravity = NewtonianGravity::new(1.0, 0.0).unwrap();
        let particles = [particle(1.0, 0.0), particle(0.5, 2.0)];
        let acc = gravity.compute(&particles).unwrap();

        // a_0 = G m_1 / r² towards +x, a_1 = G m_0 / r² towards -x
        assert!((acc[0].x - 0.125).abs() < 1e-15);
        assert!((acc[1].x + 0.25).abs() < 1e-15);
        assert_eq!(acc[0].y, 0.0);
    }

    #[test]
    fn test_momentum_balance() {
        let gravity = NewtonianGravity::new(1.0, 0.0).unwrap();
        let particles = [particle(1.0, 0.0), particle(0.3, 1.5), particle(2.0, -4.0)];
        let acc = gravity.compute(&particles).unwrap();

        let mut net = Vec3::zero();
        for (p, a) in particles.iter().zip(&acc) {
            net += p.mass() * *a;
        }
        assert!(net.norm() < 1e-15);
    }

    #[test]
    fn test_test_particle_exerts_no_force() {
        let gravity = NewtonianGravity::new(1.0, 0.0).unwrap();
        let particles = [particle(1.0, 0.0), particle(0.0, 1.0)];
        let acc = gravity.compute(&particles).unwrap();
        assert_eq!(acc[0], Vec3::zero());
        assert!((acc[1].x + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_coincident_particles_singular() {
        let gravity = NewtonianGravity::new(1.0, 0.0).unwrap();
        let particles = [particle(1.0, 0.0), particle(1.0, 0.0)];
        assert_eq!(
            gravity.compute(&particles).unwrap_err(),
            SimError::SingularConfiguration { first: 0, second: 1 }
        );
    }

    #[test]
    fn test_softening_prevents_singularity() {
        let gravity = NewtonianGravity::new(1.0, 0.1).unwrap();
        let particles = [particle(1.0, 0.0), particle(1.0, 0.0)];
        let acc = gravity.compute(&particles).unwrap();
        assert_eq!(acc[0], Vec3::zero());
        assert!(gravity.potential_energy(&particles).unwrap().is_finite());
    }

    #[test]
    fn test_potential_energy() {
        let gravity = NewtonianGravity::new(2.0, 0.0).unwrap();
        let particles = [particle(1.0, 0.0), particle(3.0, 2.0)];
        assert!((gravity.potential_energy(&particles).unwrap() + 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let particles: Vec<Particle> = (0..40)
            .map(|i| {
                let angle = i as f64 * 0.7;
                Particle::new(
                    Mass::new(1.0 + i as f64 * 0.01).unwrap(),
                    Vec3::new(angle.cos() * (1.0 + i as f64), angle.sin(), 0.1 * i as f64),
                    Vec3::zero(),
                )
            })
            .collect();

        let sequential = NewtonianGravity::new(1.0, 0.0).unwrap();
        let mut parallel = sequential;
        parallel.set_parallel_threshold(1);

        assert_eq!(
            sequential.compute(&particles).unwrap(),
            parallel.compute(&particles).unwrap()
        );
    }
}
