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
//! Environment-driven configuration
//!
//! Kept in its own test binary with a single test: the process environment
//! is shared by every test thread of a binary.

use nbody_effects::config::{SimulationConfig, ENV_DT, ENV_G, ENV_SOFTENING, G_DEFAULT};
use nbody_effects::SimError;

#[test]
fn test_from_env() {
    std::env::remove_var(ENV_G);
    std::env::remove_var(ENV_SOFTENING);

    std::env::set_var(ENV_DT, "0.25");
    let config = SimulationConfig::from_env().unwrap();
    assert_eq!(config.dt, 0.25);
    assert_eq!(config.g, G_DEFAULT);

    std::env::set_var(ENV_DT, "fast");
    assert!(matches!(
        SimulationConfig::from_env(),
        Err(SimError::InvalidParameter { name: "dt", .. })
    ));
    std::env::remove_var(ENV_DT);
}
