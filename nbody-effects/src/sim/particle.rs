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
//! Point-mass particles and their validity-checked references
//!
//! Particles carry mass, position, velocity and the acceleration accumulated
//! during the current force evaluation. Code outside the crate can read all
//! four but may only change acceleration by addition.

use crate::error::{Result, SimError};
use crate::sim::Vec3;
use std::fmt;

/// Mass of a particle
///
/// Zero is allowed and denotes a test particle: it feels gravity but
/// exerts none.
///
/// # Examples
///
/// ```
/// use nbody_effects::sim::Mass;
///
/// let mass = Mass::new(1.0e-6).unwrap();
/// assert_eq!(mass.value(), 1.0e-6);
/// assert!(Mass::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mass {
    value: f64,
}

impl Mass {
    /// Create a mass, rejecting negative or non-finite values
    pub fn new(value: f64) -> Result<Self> {
        if value >= 0.0 && value.is_finite() {
            Ok(Mass { value })
        } else {
            Err(SimError::invalid(
                "mass",
                format!("must be non-negative and finite, got {}", value),
            ))
        }
    }

    /// Get the mass value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether this is a massless test particle
    pub fn is_test_particle(&self) -> bool {
        self.value == 0.0
    }
}

/// Raw particle identifier, unique within one particle store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(u64);

impl ParticleId {
    pub(crate) fn new(id: u64) -> Self {
        ParticleId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Non-owning reference to a particle in a specific simulation
///
/// A reference stays valid until the particle is removed. Resolving a
/// removed reference, or one issued by a different simulation, fails with
/// [`SimError::StaleParticle`] instead of touching another body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleRef {
    store: u64,
    id: ParticleId,
}

impl ParticleRef {
    pub(crate) fn new(store: u64, id: ParticleId) -> Self {
        ParticleRef { store, id }
    }

    /// Identifier of the store that issued this reference
    pub fn store(&self) -> u64 {
        self.store
    }

    /// Particle identifier
    pub fn id(&self) -> ParticleId {
        self.id
    }
}

impl fmt::Display for ParticleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Particle({}, store: {})", self.id.0, self.store)
    }
}

/// A point mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    mass: Mass,
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
}

impl Particle {
    /// Create a particle at rest in acceleration
    pub fn new(mass: Mass, position: Vec3, velocity: Vec3) -> Self {
        Particle {
            mass,
            position,
            velocity,
            acceleration: Vec3::zero(),
        }
    }

    /// Mass of the particle
    pub fn mass(&self) -> f64 {
        self.mass.value()
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Acceleration accumulated during the current force evaluation
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Add a contribution to the accumulated acceleration
    pub fn add_acceleration(&mut self, delta: Vec3) {
        self.acceleration += delta;
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub(crate) fn reset_acceleration(&mut self) {
        self.acceleration = Vec3::zero();
    }

    /// Check that position, velocity and acceleration are all finite
    pub fn is_valid(&self) -> bool {
        self.position.is_valid() && self.velocity.is_valid() && self.acceleration.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_validation() {
        assert!(Mass::new(0.0).is_ok());
        assert!(Mass::new(0.0).unwrap().is_test_particle());
        assert!(Mass::new(-1.0).is_err());
        assert!(Mass::new(f64::NAN).is_err());
        assert!(Mass::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_acceleration_is_additive() {
        let mass = Mass::new(1.0).unwrap();
        let mut p = Particle::new(mass, Vec3::zero(), Vec3::zero());
        p.add_acceleration(Vec3::new(1.0, 0.0, 0.0));
        p.add_acceleration(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(p.acceleration(), Vec3::new(1.0, 2.0, 0.0));

        p.reset_acceleration();
        assert_eq!(p.acceleration(), Vec3::zero());
    }

    #[test]
    fn test_particle_ref_equality() {
        let a = ParticleRef::new(1, ParticleId::new(0));
        let b = ParticleRef::new(1, ParticleId::new(0));
        let c = ParticleRef::new(2, ParticleId::new(0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
