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
//! Integration tests verifying energy conservation with effects registered

use nbody_effects::config::{SimulationConfig, C_DEFAULT};
use nbody_effects::diagnostics::{kinetic_energy, potential_energy, EnergyMonitor};
use nbody_effects::effects::PnCorrection;
use nbody_effects::sim::{Orbit, Vec3};
use nbody_effects::Simulation;
use std::sync::Arc;

const STEPS_PER_ORBIT: f64 = 2000.0;

/// Sun plus a light planet on an e = 0.2 orbit, in the centre-of-mass frame
fn eccentric_system(c: Option<f64>) -> (Simulation, f64) {
    let orbit = Orbit::new(1.0, 0.2, 0.0, 0.0).unwrap();
    let period = orbit.period(1.0 + 1e-6);
    let config = SimulationConfig::new(1.0).with_dt(period / STEPS_PER_ORBIT);

    let mut sim = Simulation::with_config(config).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
    sim.add_orbiting(sun, 1e-6, &orbit).unwrap();
    sim.move_to_com();
    if let Some(c) = c {
        sim.add_effect(Arc::new(PnCorrection::new(sun, c).unwrap()))
            .unwrap();
    }
    (sim, period)
}

#[test]
fn test_newtonian_energy_conservation() {
    let (mut sim, period) = eccentric_system(None);
    let mut monitor = EnergyMonitor::new();
    monitor.observe(&sim).unwrap();

    sim.integrate(period, |s| monitor.observe(s)).unwrap();

    assert!(monitor.samples() as f64 > STEPS_PER_ORBIT);
    assert!(monitor.max_drift() < 1e-4, "drift {}", monitor.max_drift());
}

#[test]
fn test_pn_energy_conservation() {
    let (mut sim, period) = eccentric_system(Some(100.0));
    let mut monitor = EnergyMonitor::new();
    monitor.observe(&sim).unwrap();

    sim.integrate(period, |s| monitor.observe(s)).unwrap();

    assert!(
        monitor.max_drift() < 1e-4,
        "energy drift {} exceeds bound",
        monitor.max_drift()
    );
}

#[test]
fn test_pn_energy_conservation_at_default_speed_of_light() {
    let (mut sim, period) = eccentric_system(Some(C_DEFAULT));
    let mut monitor = EnergyMonitor::with_interval(period / 50.0).unwrap();
    monitor.observe(&sim).unwrap();

    sim.integrate(period, |s| monitor.observe(s)).unwrap();

    assert!(monitor.samples() >= 50);
    assert!(monitor.max_drift() < 1e-4, "drift {}", monitor.max_drift());
}

#[test]
fn test_newtonian_energy_alone_is_not_conserved_with_pn() {
    let (mut sim, period) = eccentric_system(Some(100.0));
    let newtonian = |s: &Simulation| kinetic_energy(s.particles()) + potential_energy(s).unwrap();
    let e0 = newtonian(&sim);

    let mut max_drift: f64 = 0.0;
    sim.integrate(period, |s| {
        max_drift = max_drift.max(((newtonian(s) - e0) / e0).abs());
        Ok(())
    })
    .unwrap();

    // Only the total including the 1PN term is conserved
    assert!(max_drift > 1e-4, "newtonian drift {}", max_drift);
}
