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
//! # N-Body Effects
//!
//! A gravitational N-body simulation with a registry of additional physics
//! effects applied on top of Newtonian gravity.
//!
//! ## Features
//!
//! - **Effect Registry**: Ordered, additive effects applied on every force evaluation
//! - **Post-Newtonian Correction**: 1PN test-particle term around a chosen source
//! - **Energy Diagnostics**: Opt-in total energy including effect corrections
//! - **Parallelization**: Optional Rayon integration for large particle counts
//!
//! ## Example
//!
//! ```rust
//! use nbody_effects::config::C_DEFAULT;
//! use nbody_effects::diagnostics::compute_energy;
//! use nbody_effects::effects::PnCorrection;
//! use nbody_effects::sim::Vec3;
//! use nbody_effects::Simulation;
//! use std::sync::Arc;
//!
//! let mut sim = Simulation::new(1.0)?;
//! let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero())?;
//! sim.add_particle(1e-6, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0))?;
//!
//! sim.add_effect(Arc::new(PnCorrection::new(sun, C_DEFAULT)?))?;
//! sim.integrate(1.0, |_| Ok(()))?;
//!
//! let energy = compute_energy(&sim)?;
//! assert!(energy < 0.0);
//! # Ok::<(), nbody_effects::SimError>(())
//! ```

#![warn(missing_docs)]

/// Simulation parameters and physical constants
pub mod config;

/// Energy diagnostics
pub mod diagnostics;

/// Effect registry and built-in effects
pub mod effects;

/// Error types
pub mod error;

/// Newtonian gravity
pub mod gravity;

/// Numerical integration methods
pub mod integration;

/// Particles and the simulation driver
pub mod sim;

pub use error::{Result, SimError};
pub use sim::Simulation;
