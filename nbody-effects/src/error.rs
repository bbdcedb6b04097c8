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
//! Error types shared by the simulation, the effect registry and effects

use thiserror::Error;

/// Errors raised by simulation setup, effect management and force evaluation
///
/// Every error surfaces synchronously from the call that detects it. A
/// failure during a force evaluation leaves accelerations partially updated;
/// callers should treat the current step as lost.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The identical effect instance is already registered
    #[error("effect '{name}' is already registered with this simulation")]
    DuplicateEffect {
        /// Name reported by the rejected effect
        name: String,
    },

    /// The handle was never issued by this registry, or was already removed
    #[error("effect handle {0} does not belong to this registry")]
    UnknownHandle(u64),

    /// A parameter is outside its valid domain (speed of light, mass, G, dt)
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Human-readable constraint that was violated
        reason: String,
    },

    /// Two bodies that must be separated share the same position
    #[error("singular configuration: particles {first} and {second} are coincident")]
    SingularConfiguration {
        /// Index of the first particle
        first: usize,
        /// Index of the second particle
        second: usize,
    },

    /// A particle reference was removed or belongs to another simulation
    #[error("stale particle reference {0}")]
    StaleParticle(String),

    /// The effect was built against an incompatible effect API version
    #[error("effect '{name}' API version {found} is incompatible with engine API version {expected}")]
    IncompatibleEffect {
        /// Effect name
        name: String,
        /// Version declared by the effect
        found: String,
        /// Version implemented by this crate
        expected: &'static str,
    },
}

impl SimError {
    /// Shorthand for building an [`SimError::InvalidParameter`]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimError>;
