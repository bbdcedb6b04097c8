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
//! Effect API trait and context
//!
//! # Contracts
//!
//! Effects must:
//! - Only add to particle accelerations, never overwrite them
//! - Visit particles in store order and skip none they apply to
//! - Be a pure function of the particle state (deterministic)
//! - Report failures as errors instead of writing NaN/Inf

use crate::error::Result;
use crate::sim::{Particle, ParticleRef, ParticleStore, Vec3};
use std::any::Any;

/// Version of the effect API
///
/// Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const EFFECT_API_VERSION: &str = "0.1.0";

/// Scoped access to the simulation during one force evaluation
///
/// Exposes read access to every particle and additive write access to
/// accelerations. Positions, velocities and masses cannot be changed from
/// inside an effect.
pub struct EffectContext<'a> {
    g: f64,
    time: f64,
    particles: &'a mut ParticleStore,
}

impl<'a> EffectContext<'a> {
    /// Create a context over a particle store
    pub fn new(g: f64, time: f64, particles: &'a mut ParticleStore) -> Self {
        EffectContext { g, time, particles }
    }

    /// Gravitational constant of the simulation
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Simulation time of this force evaluation
    pub fn time(&self) -> f64 {
        self.time
    }

    /// All particles in insertion order
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// Resolve a particle reference to its index
    pub fn index_of(&self, particle: ParticleRef) -> Result<usize> {
        self.particles.index_of(particle)
    }

    /// Read-only view of the underlying store
    pub fn store(&self) -> &ParticleStore {
        self.particles
    }

    /// Add `delta` to the accumulated acceleration of particle `index`
    pub fn add_acceleration(&mut self, index: usize, delta: Vec3) {
        self.particles.add_acceleration(index, delta);
    }
}

/// A pluggable contribution to particle accelerations
///
/// Effects are shared through `Arc` so that the registry can recognise the
/// identical instance being registered twice. `apply` takes `&self`; an
/// effect carries configuration, not per-step state.
///
/// # Example
///
/// ```rust
/// use nbody_effects::effects::{Effect, EffectContext};
/// use nbody_effects::sim::Vec3;
/// use nbody_effects::Result;
/// use std::any::Any;
///
/// struct UniformField {
///     field: Vec3,
/// }
///
/// impl Effect for UniformField {
///     fn name(&self) -> &str { "uniform_field" }
///
///     fn apply(&self, context: &mut EffectContext) -> Result<()> {
///         for index in 0..context.particles().len() {
///             context.add_acceleration(index, self.field);
///         }
///         Ok(())
///     }
///
///     fn as_any(&self) -> &dyn Any { self }
/// }
/// ```
pub trait Effect: Send + Sync {
    /// Descriptive name used in logs and errors
    fn name(&self) -> &str;

    /// Effect API version this effect was built against
    ///
    /// Used for compatibility checking. Should return EFFECT_API_VERSION.
    fn api_version(&self) -> &str {
        EFFECT_API_VERSION
    }

    /// Validate the effect against a simulation before it is registered
    ///
    /// Called once by [`crate::Simulation::add_effect`]. Effects referring to
    /// particles should check here that those particles exist.
    fn initialize(&self, _particles: &ParticleStore) -> Result<()> {
        Ok(())
    }

    /// Add this effect's accelerations for the current force evaluation
    fn apply(&self, context: &mut EffectContext) -> Result<()>;

    /// Energy correction associated with this effect
    ///
    /// Summed into [`crate::diagnostics::compute_energy`]. Effects without a
    /// conserved energy term keep the default of zero.
    fn energy(&self, _g: f64, _particles: &ParticleStore) -> Result<f64> {
        Ok(0.0)
    }

    /// Allow downcasting to concrete effect types
    fn as_any(&self) -> &dyn Any;
}
