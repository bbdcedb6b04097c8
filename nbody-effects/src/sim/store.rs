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
//! Particle storage
//!
//! Particles live in a dense vector in insertion order. A parallel vector
//! of ids (strictly increasing, since ids are never reused and removal keeps
//! survivors in order) resolves a [`ParticleRef`] to its current index with
//! a binary search.

use crate::error::{Result, SimError};
use crate::sim::{Particle, ParticleId, ParticleRef, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Ordered, exclusively owned collection of particles
#[derive(Debug)]
pub struct ParticleStore {
    store_id: u64,
    next_particle_id: u64,
    ids: Vec<ParticleId>,
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// Create an empty store
    pub fn new() -> Self {
        ParticleStore {
            store_id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            next_particle_id: 0,
            ids: Vec::new(),
            particles: Vec::new(),
        }
    }

    /// Append a particle and return a reference to it
    pub fn push(&mut self, particle: Particle) -> ParticleRef {
        let id = ParticleId::new(self.next_particle_id);
        self.next_particle_id += 1;
        self.ids.push(id);
        self.particles.push(particle);
        ParticleRef::new(self.store_id, id)
    }

    /// Remove a particle, keeping the remaining particles in order
    pub fn remove(&mut self, particle: ParticleRef) -> Result<Particle> {
        let index = self.index_of(particle)?;
        self.ids.remove(index);
        Ok(self.particles.remove(index))
    }

    /// Resolve a reference to the particle's current index
    pub fn index_of(&self, particle: ParticleRef) -> Result<usize> {
        if particle.store() != self.store_id {
            return Err(SimError::StaleParticle(format!(
                "{} was issued by another simulation",
                particle
            )));
        }
        self.ids
            .binary_search(&particle.id())
            .map_err(|_| SimError::StaleParticle(format!("{} has been removed", particle)))
    }

    /// Look up a particle by reference
    pub fn get(&self, particle: ParticleRef) -> Result<&Particle> {
        let index = self.index_of(particle)?;
        Ok(&self.particles[index])
    }

    /// Reference to the particle currently at `index`
    pub fn ref_at(&self, index: usize) -> Option<ParticleRef> {
        self.ids
            .get(index)
            .map(|&id| ParticleRef::new(self.store_id, id))
    }

    /// Whether the reference still resolves
    pub fn contains(&self, particle: ParticleRef) -> bool {
        self.index_of(particle).is_ok()
    }

    /// All particles in insertion order
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Iterate over particles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Add to the accumulated acceleration of the particle at `index`
    ///
    /// This is the only mutation available to effects.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn add_acceleration(&mut self, index: usize, delta: Vec3) {
        self.particles[index].add_acceleration(delta);
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the store holds no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub(crate) fn reset_accelerations(&mut self) {
        for particle in &mut self.particles {
            particle.reset_acceleration();
        }
    }
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}
