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
//! Pluggable accelerations beyond Newtonian gravity
//!
//! An effect adds its contribution to particle accelerations on every force
//! evaluation, after Newtonian gravity has been computed and before the
//! integrator advances positions and velocities. Effects never need changes
//! to the integrator.
//!
//! # Registering Effects
//!
//! ```rust
//! use nbody_effects::effects::PnCorrection;
//! use nbody_effects::sim::Vec3;
//! use nbody_effects::Simulation;
//! use std::sync::Arc;
//!
//! let mut sim = Simulation::new(1.0).unwrap();
//! let star = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
//! sim.add_particle(0.0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
//!
//! let handle = sim.add_effect(Arc::new(PnCorrection::new(star, 1.0e4).unwrap())).unwrap();
//! sim.integrate(0.01, |_| Ok(())).unwrap();
//! sim.remove_effect(handle).unwrap();
//! ```
//!
//! # Ordering
//!
//! Effects are applied in registration order on every evaluation. Stacked
//! effects are not assumed to commute.
//!
//! # Error Handling
//!
//! The first failing effect aborts the evaluation and its error is returned
//! unchanged. Accelerations are then partially updated and the step must be
//! treated as lost.

pub mod api;
pub mod pn;
pub mod registry;

pub use api::{Effect, EffectContext, EFFECT_API_VERSION};
pub use pn::PnCorrection;
pub use registry::{EffectHandle, EffectRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _version: &str = EFFECT_API_VERSION;
        let registry = EffectRegistry::default();
        assert!(registry.is_empty());
    }
}
