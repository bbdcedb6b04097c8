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
//! Simulation driver tying particles, gravity, effects and the integrator together
//!
//! Every force evaluation runs the same pipeline:
//!
//! 1. Reset all accelerations
//! 2. Add pairwise Newtonian gravity
//! 3. Apply the effect registry, in registration order
//!
//! The integrator then advances positions and velocities from the
//! accumulated accelerations.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{Mass, Orbit, Particle, ParticleRef, ParticleStore, Vec3};
use crate::config::{validate_timestep, SimulationConfig};
use crate::effects::{Effect, EffectContext, EffectHandle, EffectRegistry};
use crate::error::{Result, SimError};
use crate::gravity::NewtonianGravity;
use crate::integration::{Integrator, VelocityVerletIntegrator};

/// An N-body simulation with pluggable effects
///
/// # Example
///
/// ```
/// use nbody_effects::sim::Vec3;
/// use nbody_effects::Simulation;
///
/// let mut sim = Simulation::new(1.0).unwrap();
/// sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
/// sim.add_particle(1e-3, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)).unwrap();
///
/// let mut beats = 0;
/// sim.integrate(0.1, |_| {
///     beats += 1;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(sim.time(), 0.1);
/// assert!(beats > 0);
/// ```
pub struct Simulation {
    config: SimulationConfig,
    time: f64,
    particles: ParticleStore,
    effects: EffectRegistry,
    gravity: NewtonianGravity,
    integrator: Box<dyn Integrator>,
    last_dt: f64,
    accelerations_current: bool,
}

impl Simulation {
    /// Create an empty simulation with gravitational constant `g`
    pub fn new(g: f64) -> Result<Self> {
        Self::with_config(SimulationConfig::new(g))
    }

    /// Create an empty simulation from a full configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let gravity = NewtonianGravity::new(config.g, config.softening)?;
        Ok(Simulation {
            config,
            time: 0.0,
            particles: ParticleStore::new(),
            effects: EffectRegistry::new(),
            gravity,
            integrator: Box::new(VelocityVerletIntegrator::new()),
            last_dt: 0.0,
            accelerations_current: false,
        })
    }

    /// Gravitational constant
    pub fn g(&self) -> f64 {
        self.config.g
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Integrator timestep
    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// Replace the integrator timestep
    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        validate_timestep(dt)?;
        self.config.dt = dt;
        Ok(())
    }

    /// Configuration this simulation was built with
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Newtonian force model
    pub fn gravity(&self) -> &NewtonianGravity {
        &self.gravity
    }

    /// Replace the integration scheme
    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        debug!("Switching integrator to {}", integrator.name());
        self.integrator = integrator;
    }

    /// Name of the active integrator
    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// Append a particle and return a reference to it
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidParameter`] for a negative mass or non-finite
    /// position or velocity.
    pub fn add_particle(
        &mut self,
        mass: f64,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<ParticleRef> {
        let particle = Particle::new(Mass::new(mass)?, position, velocity);
        if !particle.is_valid() {
            return Err(SimError::invalid(
                "particle",
                "position and velocity must be finite",
            ));
        }

        let particle_ref = self.particles.push(particle);
        self.accelerations_current = false;
        debug!(
            "Added particle {} (m = {}) at index {}",
            particle_ref,
            mass,
            self.particles.len() - 1
        );
        Ok(particle_ref)
    }

    /// Append a particle of mass `m` on `orbit` around `primary`
    pub fn add_orbiting(
        &mut self,
        primary: ParticleRef,
        m: f64,
        orbit: &Orbit,
    ) -> Result<ParticleRef> {
        let primary = *self.particles.get(primary)?;
        let (position, velocity) = orbit.to_state(self.config.g, &primary, m)?;
        self.add_particle(m, position, velocity)
    }

    /// Remove a particle; survivors keep their relative order
    ///
    /// Effects still referring to the removed particle fail with
    /// [`SimError::StaleParticle`] on the next force evaluation.
    pub fn remove_particle(&mut self, particle: ParticleRef) -> Result<Particle> {
        let removed = self.particles.remove(particle)?;
        self.accelerations_current = false;
        debug!("Removed particle {}", particle);
        Ok(removed)
    }

    /// Look up a particle by reference
    pub fn particle(&self, particle: ParticleRef) -> Result<&Particle> {
        self.particles.get(particle)
    }

    /// All particles in insertion order
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// The underlying particle store
    pub fn store(&self) -> &ParticleStore {
        &self.particles
    }

    /// Register an effect with this simulation
    ///
    /// The effect is initialized against the current particles, then
    /// appended to the registry. It is applied on every force evaluation
    /// until removed.
    pub fn add_effect(&mut self, effect: Arc<dyn Effect>) -> Result<EffectHandle> {
        effect.initialize(&self.particles)?;
        let handle = self.effects.register(effect)?;
        self.accelerations_current = false;
        Ok(handle)
    }

    /// Remove a previously registered effect
    pub fn remove_effect(&mut self, handle: EffectHandle) -> Result<Arc<dyn Effect>> {
        let effect = self.effects.unregister(handle)?;
        self.accelerations_current = false;
        Ok(effect)
    }

    /// Registered effects
    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// Direct access to the effect registry
    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        self.accelerations_current = false;
        &mut self.effects
    }

    /// Recompute every particle's acceleration for the current state
    pub fn compute_accelerations(&mut self) -> Result<()> {
        let result = evaluate_forces(
            &self.gravity,
            &self.effects,
            self.config.g,
            self.time,
            &mut self.particles,
        );
        self.accelerations_current = result.is_ok();
        result
    }

    /// Advance by one timestep
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.dt;
        self.advance(dt)
    }

    /// Integrate until `t_max`, calling `heartbeat` after every step
    ///
    /// The last step is shortened so that the simulation stops exactly at
    /// `t_max`. An error from a force evaluation or from the heartbeat
    /// stops the integration and is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidParameter`] if `t_max` is not finite or lies
    /// before the current time.
    pub fn integrate<F>(&mut self, t_max: f64, mut heartbeat: F) -> Result<()>
    where
        F: FnMut(&Simulation) -> Result<()>,
    {
        if !t_max.is_finite() || t_max < self.time {
            return Err(SimError::invalid(
                "t_max",
                format!("must be finite and not before t = {}, got {}", self.time, t_max),
            ));
        }

        info!(
            "Integrating {} particles with {} effects from t = {} to t = {} (dt = {})",
            self.particles.len(),
            self.effects.len(),
            self.time,
            t_max,
            self.config.dt
        );

        let mut steps: u64 = 0;
        while self.time < t_max {
            let remaining = t_max - self.time;
            let last = remaining <= self.config.dt;
            let dt = if last { remaining } else { self.config.dt };
            if !last && self.time + dt == self.time {
                return Err(SimError::invalid(
                    "dt",
                    format!("{} is below the resolution of t = {}", dt, self.time),
                ));
            }

            if let Err(e) = self.advance(dt) {
                warn!("Integration stopped at t = {} after {} steps: {}", self.time, steps, e);
                return Err(e);
            }
            if last {
                self.time = t_max;
            }
            steps += 1;

            heartbeat(self)?;
        }

        info!("Integration finished at t = {} after {} steps", self.time, steps);
        Ok(())
    }

    /// Whether the last step crossed a multiple of `interval`
    ///
    /// Useful inside a heartbeat to act at a fixed cadence.
    pub fn output_check(&self, interval: f64) -> bool {
        if !(interval > 0.0) || self.last_dt <= 0.0 {
            return false;
        }
        let previous = self.time - self.last_dt;
        (previous / interval).floor() != (self.time / interval).floor()
    }

    /// Shift positions and velocities into the centre-of-mass frame
    pub fn move_to_com(&mut self) {
        let mut total_mass = 0.0;
        let mut position = Vec3::zero();
        let mut velocity = Vec3::zero();
        for particle in self.particles.iter() {
            total_mass += particle.mass();
            position += particle.mass() * particle.position();
            velocity += particle.mass() * particle.velocity();
        }

        if total_mass == 0.0 {
            warn!("move_to_com called on a system without mass");
            return;
        }

        let position = position * (1.0 / total_mass);
        let velocity = velocity * (1.0 / total_mass);
        for particle in self.particles.as_mut_slice() {
            particle.set_position(particle.position() - position);
            particle.set_velocity(particle.velocity() - velocity);
        }
        self.accelerations_current = false;
    }

    fn advance(&mut self, dt: f64) -> Result<()> {
        if !self.accelerations_current {
            self.compute_accelerations()?;
        }

        let t_next = self.time + dt;
        let g = self.config.g;
        let Simulation {
            particles,
            effects,
            gravity,
            integrator,
            ..
        } = self;
        let mut forces =
            |store: &mut ParticleStore| evaluate_forces(gravity, effects, g, t_next, store);

        // A failed step rolls the particles back to t
        if let Err(e) = integrator.step(particles, dt, &mut forces) {
            self.accelerations_current = false;
            return Err(e);
        }

        self.time = t_next;
        self.last_dt = dt;
        self.accelerations_current = true;
        Ok(())
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("time", &self.time)
            .field("particles", &self.particles.len())
            .field("effects", &self.effects)
            .field("integrator", &self.integrator.name())
            .finish()
    }
}

fn evaluate_forces(
    gravity: &NewtonianGravity,
    effects: &EffectRegistry,
    g: f64,
    time: f64,
    particles: &mut ParticleStore,
) -> Result<()> {
    particles.reset_accelerations();
    gravity.accumulate(particles)?;
    let mut context = EffectContext::new(g, time, particles);
    effects.apply(&mut context)
}
