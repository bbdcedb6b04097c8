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
//! Numerical integration methods for the particle store
//!
//! An integrator advances positions and velocities by one step. It never
//! computes forces itself: it calls back into the simulation, which resets
//! accelerations, adds Newtonian gravity and applies the effect registry.
//!
//! # Contract
//!
//! - On entry, particle accelerations match the current state
//! - On exit, they match the new state
//! - The force callback is invoked exactly once per step

use crate::error::Result;
use crate::sim::ParticleStore;

mod verlet;

pub use verlet::VelocityVerletIntegrator;

/// Force evaluation supplied by the simulation
///
/// Overwrites every particle's acceleration with the total for the current
/// particle state.
pub type ForceEvaluation<'a> = dyn FnMut(&mut ParticleStore) -> Result<()> + 'a;

/// Trait for numerical integration methods
pub trait Integrator: Send + Sync {
    /// Get the name of this integrator
    fn name(&self) -> &str;

    /// Advance the store by `dt`
    ///
    /// Errors from `forces` are returned unchanged, with positions and
    /// velocities restored to their values before the step.
    fn step(
        &mut self,
        particles: &mut ParticleStore,
        dt: f64,
        forces: &mut ForceEvaluation<'_>,
    ) -> Result<()>;
}
