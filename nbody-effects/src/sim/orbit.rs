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
//! Planar Keplerian orbital elements
//!
//! Converts between the elements of a bound orbit in the xy-plane and the
//! Cartesian state of a body relative to its primary.
//!
//! With `mu = G (M + m)`, semi-latus rectum `p = a (1 - e²)` and true
//! longitude `theta = omega + f`:
//!
//! ```text
//! r     = p / (1 + e cos f)
//! v_r   = sqrt(mu / p) e sin f
//! v_t   = sqrt(mu / p) (1 + e cos f)
//! ```
//!
//! The inverse uses the vis-viva energy for `a` and the Laplace-Runge-Lenz
//! vector `e = ((v² - mu/r) r - (r·v) v) / mu` for `e` and `omega`.
//!
//! # References
//!
//! - Murray, C. D., & Dermott, S. F. (1999). "Solar System Dynamics", ch. 2

use crate::error::{Result, SimError};
use crate::sim::{Particle, Vec3};
use std::f64::consts::PI;

/// Elements of a bound planar orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Semi-major axis
    pub a: f64,
    /// Eccentricity, `0 <= e < 1`
    pub e: f64,
    /// Longitude of pericenter (radians)
    pub omega: f64,
    /// True anomaly (radians)
    pub f: f64,
}

impl Orbit {
    /// Create orbital elements, rejecting unbound or degenerate orbits
    pub fn new(a: f64, e: f64, omega: f64, f: f64) -> Result<Self> {
        if !(a > 0.0 && a.is_finite()) {
            return Err(SimError::invalid(
                "a",
                format!("semi-major axis must be positive, got {}", a),
            ));
        }
        if !(0.0..1.0).contains(&e) {
            return Err(SimError::invalid(
                "e",
                format!("eccentricity must be in [0, 1), got {}", e),
            ));
        }
        if !omega.is_finite() || !f.is_finite() {
            return Err(SimError::invalid("omega/f", "angles must be finite"));
        }
        Ok(Orbit { a, e, omega, f })
    }

    /// Cartesian position and velocity of a body of mass `m` on this orbit
    /// around `primary`
    pub fn to_state(&self, g: f64, primary: &Particle, m: f64) -> Result<(Vec3, Vec3)> {
        let mu = g * (primary.mass() + m);
        if !(mu > 0.0) {
            return Err(SimError::invalid("mu", "G (M + m) must be positive"));
        }

        let p = self.a * (1.0 - self.e * self.e);
        let (sin_f, cos_f) = self.f.sin_cos();
        let (sin_t, cos_t) = (self.omega + self.f).sin_cos();

        let r = p / (1.0 + self.e * cos_f);
        let scale = (mu / p).sqrt();
        let v_r = scale * self.e * sin_f;
        let v_t = scale * (1.0 + self.e * cos_f);

        let position = Vec3::new(r * cos_t, r * sin_t, 0.0);
        let velocity = Vec3::new(v_r * cos_t - v_t * sin_t, v_r * sin_t + v_t * cos_t, 0.0);

        Ok((
            primary.position() + position,
            primary.velocity() + velocity,
        ))
    }

    /// Recover the elements of `body` relative to `primary`
    ///
    /// Only the projection onto the xy-plane is meaningful for `omega`
    /// and `f`.
    pub fn from_state(g: f64, primary: &Particle, body: &Particle) -> Result<Self> {
        let mu = g * (primary.mass() + body.mass());
        if !(mu > 0.0) {
            return Err(SimError::invalid("mu", "G (M + m) must be positive"));
        }

        let r = body.position() - primary.position();
        let v = body.velocity() - primary.velocity();
        let r_mag = r.norm();
        if r_mag == 0.0 {
            return Err(SimError::SingularConfiguration { first: 0, second: 1 });
        }

        let v2 = v.norm_squared();
        let energy = 0.5 * v2 - mu / r_mag;
        if energy >= 0.0 {
            return Err(SimError::invalid("orbit", "body is not bound to the primary"));
        }
        let a = -mu / (2.0 * energy);

        let e_vec = ((v2 - mu / r_mag) * r - r.dot(&v) * v) * (1.0 / mu);
        let e = e_vec.norm();
        let omega = e_vec.y.atan2(e_vec.x);
        let theta = r.y.atan2(r.x);
        let f = wrap_angle(theta - omega);

        Ok(Orbit { a, e, omega, f })
    }

    /// Orbital period for the given gravitational parameter `mu = G (M + m)`
    pub fn period(&self, mu: f64) -> f64 {
        2.0 * PI * (self.a.powi(3) / mu).sqrt()
    }
}

/// Wrap an angle into `(-pi, pi]`
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}
