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
//! Integration tests for the post-Newtonian correction effect

use nbody_effects::effects::{Effect, PnCorrection};
use nbody_effects::sim::{Orbit, Vec3};
use nbody_effects::{SimError, Simulation};
use std::sync::Arc;

/// Magnitude of the extra acceleration on an eccentric-orbit planet
fn correction_magnitude(c: f64) -> f64 {
    let mut sim = Simulation::new(1.0).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
    let orbit = Orbit::new(1.0, 0.2, 0.3, 1.1).unwrap();
    let planet = sim.add_orbiting(sun, 1e-6, &orbit).unwrap();

    let gr = PnCorrection::new(sun, c).unwrap();
    gr.correction(
        sim.g(),
        sim.particle(sun).unwrap(),
        sim.particle(planet).unwrap(),
        (0, 1),
    )
    .unwrap()
    .norm()
}

#[test]
fn test_correction_vanishes_as_c_grows() {
    let magnitudes: Vec<f64> = [1.0e3, 1.0e6, 1.0e9]
        .iter()
        .map(|&c| correction_magnitude(c))
        .collect();

    assert!(magnitudes[0] > magnitudes[1], "{:?}", magnitudes);
    assert!(magnitudes[1] > magnitudes[2], "{:?}", magnitudes);
    assert!(magnitudes[2] < 1e-15, "{:?}", magnitudes);
    assert!(magnitudes[0] > 1e-7);
}

#[test]
fn test_correction_scales_as_inverse_c_squared() {
    let ratio = correction_magnitude(1.0e2) / correction_magnitude(1.0e3);
    assert!((ratio - 100.0).abs() < 1e-6 * 100.0, "ratio {}", ratio);
}

#[test]
fn test_invalid_speed_of_light() {
    let mut sim = Simulation::new(1.0).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();

    for c in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(
                PnCorrection::new(sun, c),
                Err(SimError::InvalidParameter { name: "c", .. })
            ),
            "c = {} accepted",
            c
        );
    }
}

#[test]
fn test_circular_orbit_correction_is_radial() {
    // Circular orbit: r·v = 0, so the correction is purely radial
    let mut sim = Simulation::new(1.0).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
    let planet = sim
        .add_particle(0.0, Vec3::new(0.0, 2.0, 0.0), Vec3::new(-(0.5f64).sqrt(), 0.0, 0.0))
        .unwrap();
    let gr = PnCorrection::new(sun, 10.0).unwrap();

    let delta = gr
        .correction(
            sim.g(),
            sim.particle(sun).unwrap(),
            sim.particle(planet).unwrap(),
            (0, 1),
        )
        .unwrap();

    // mu / (c² r³) * (4 mu / r - v²) * r with r = 2, v² = 1/2
    let expected = 1.5 * 2.0 / (100.0 * 8.0);
    assert!(delta.x.abs() < 1e-18);
    assert!((delta.y - expected).abs() < 1e-15, "{:?}", delta);
}

#[test]
fn test_source_trajectory_unaffected() {
    let build = |with_effect: bool| {
        let mut sim = Simulation::new(1.0).unwrap();
        let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
        sim.add_particle(0.0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
            .unwrap();
        if with_effect {
            sim.add_effect(Arc::new(PnCorrection::new(sun, 5.0).unwrap()))
                .unwrap();
        }
        sim.integrate(1.0, |_| Ok(())).unwrap();
        sim
    };

    let plain = build(false);
    let relativistic = build(true);

    // Massless planet: the sun never moves, effect or not
    assert_eq!(plain.particles()[0], relativistic.particles()[0]);
    assert_ne!(
        plain.particles()[1].position(),
        relativistic.particles()[1].position()
    );
}

#[test]
fn test_source_need_not_be_first() {
    let mut sim = Simulation::new(1.0).unwrap();
    let planet = sim
        .add_particle(0.0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
        .unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();

    sim.compute_accelerations().unwrap();
    let newtonian = sim.particle(planet).unwrap().acceleration();
    sim.add_effect(Arc::new(PnCorrection::new(sun, 10.0).unwrap()))
        .unwrap();
    sim.compute_accelerations().unwrap();

    // 4 mu / r - v² = 3 → 3 / 100 outwards
    let delta = sim.particle(planet).unwrap().acceleration() - newtonian;
    assert!((delta.x - 0.03).abs() < 1e-15);
    assert_eq!(sim.particle(sun).unwrap().acceleration(), Vec3::zero());
}

#[test]
fn test_effect_downcasting() {
    let mut sim = Simulation::new(1.0).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
    let handle = sim
        .add_effect(Arc::new(PnCorrection::new(sun, 42.0).unwrap()))
        .unwrap();

    let effect: &dyn Effect = sim.effects().get(handle).unwrap();
    let gr = effect.as_any().downcast_ref::<PnCorrection>().unwrap();
    assert_eq!(gr.c(), 42.0);
    assert_eq!(gr.source(), sun);
}

#[test]
fn test_energy_hook_matches_formula() {
    let mut sim = Simulation::new(1.0).unwrap();
    let sun = sim.add_particle(1.0, Vec3::zero(), Vec3::zero()).unwrap();
    sim.add_particle(2.0, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.5, 0.0, 0.0))
        .unwrap();
    let gr = PnCorrection::new(sun, 4.0).unwrap();

    // m/c² (3/8 v⁴ + 3/2 mu v² / r + 1/2 mu² / r²), r = 1, v² = 1/4
    let expected = 2.0 / 16.0 * (0.375 / 16.0 + 1.5 * 0.25 + 0.5);
    let energy = gr.energy(sim.g(), sim.store()).unwrap();
    assert!((energy - expected).abs() < 1e-15);
}
