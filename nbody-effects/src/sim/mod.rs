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
//! Particle state and the simulation that owns it
//!
//! Particles live in a dense [`ParticleStore`] in insertion order. Callers
//! and effects hold [`ParticleRef`] values, which are checked against the
//! store on every lookup: a reference to a removed particle, or to a
//! particle of another simulation, resolves to [`crate::SimError::StaleParticle`].

pub mod orbit;
pub mod particle;
pub mod simulation;
pub mod store;
pub mod vector;

pub use orbit::{wrap_angle, Orbit};
pub use particle::{Mass, Particle, ParticleId, ParticleRef};
pub use simulation::Simulation;
pub use store::ParticleStore;
pub use vector::Vec3;
