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
//! Effect registry
//!
//! This module provides the registry for active effects, including:
//! - Registration with duplicate-instance detection
//! - Removal through opaque handles
//! - Version compatibility checking
//! - Ordered, fail-fast application during force evaluation

use crate::effects::api::{Effect, EffectContext, EFFECT_API_VERSION};
use crate::error::{Result, SimError};
use log::{debug, trace};
use semver::Version;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle returned by [`EffectRegistry::register`]
///
/// Handles are only meaningful to the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    registry: u64,
    slot: u64,
}

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Effect({}, registry: {})", self.slot, self.registry)
    }
}

struct Entry {
    slot: u64,
    effect: Arc<dyn Effect>,
}

/// Ordered set of active effects for one simulation
///
/// Effects run in registration order on every force evaluation until they
/// are removed. The registry is owned by its [`crate::Simulation`], so it
/// can never be applied after the simulation is gone; dropping it releases
/// every effect.
pub struct EffectRegistry {
    id: u64,
    next_slot: u64,
    entries: Vec<Entry>,
}

impl EffectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        EffectRegistry {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            next_slot: 0,
            entries: Vec::new(),
        }
    }

    /// Register an effect
    ///
    /// # Returns
    ///
    /// A handle for [`unregister`](Self::unregister), or an error if:
    /// - This exact instance is already registered ([`SimError::DuplicateEffect`])
    /// - The effect API version is incompatible ([`SimError::IncompatibleEffect`])
    ///
    /// Two distinct instances of the same effect type may be registered
    /// side by side.
    pub fn register(&mut self, effect: Arc<dyn Effect>) -> Result<EffectHandle> {
        let name = effect.name().to_string();

        if self.entries.iter().any(|entry| same_instance(&entry.effect, &effect)) {
            return Err(SimError::DuplicateEffect { name });
        }

        let api_version = effect.api_version();
        if !is_version_compatible(api_version, EFFECT_API_VERSION) {
            return Err(SimError::IncompatibleEffect {
                name,
                found: api_version.to_string(),
                expected: EFFECT_API_VERSION,
            });
        }

        let handle = EffectHandle {
            registry: self.id,
            slot: self.next_slot,
        };
        self.next_slot += 1;
        self.entries.push(Entry {
            slot: handle.slot,
            effect,
        });

        debug!("registered effect '{}' as {}", name, handle);
        Ok(handle)
    }

    /// Remove a previously registered effect and hand it back
    pub fn unregister(&mut self, handle: EffectHandle) -> Result<Arc<dyn Effect>> {
        let position = self.position(handle)?;
        let entry = self.entries.remove(position);
        debug!("unregistered effect '{}' ({})", entry.effect.name(), handle);
        Ok(entry.effect)
    }

    /// Apply every registered effect in registration order
    ///
    /// Stops at the first failing effect and returns its error unchanged;
    /// later effects are not run for this evaluation.
    pub fn apply(&self, context: &mut EffectContext) -> Result<()> {
        for entry in &self.entries {
            trace!("applying effect '{}' at t={}", entry.effect.name(), context.time());
            entry.effect.apply(context)?;
        }
        Ok(())
    }

    /// Look up a registered effect
    pub fn get(&self, handle: EffectHandle) -> Option<&dyn Effect> {
        self.position(handle)
            .ok()
            .map(|position| self.entries[position].effect.as_ref())
    }

    /// Iterate over registered effects in application order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.entries.iter().map(|entry| entry.effect.as_ref())
    }

    /// Whether the handle refers to a registered effect
    pub fn contains(&self, handle: EffectHandle) -> bool {
        self.position(handle).is_ok()
    }

    /// Number of registered effects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no effects are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, handle: EffectHandle) -> Result<usize> {
        if handle.registry != self.id {
            return Err(SimError::UnknownHandle(handle.slot));
        }
        self.entries
            .iter()
            .position(|entry| entry.slot == handle.slot)
            .ok_or(SimError::UnknownHandle(handle.slot))
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("id", &self.id)
            .field(
                "effects",
                &self.entries.iter().map(|e| e.effect.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Identity of the shared allocation, ignoring vtable metadata
fn same_instance(a: &Arc<dyn Effect>, b: &Arc<dyn Effect>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Check if an effect API version is compatible with the engine
///
/// Uses semantic versioning rules:
/// - Major version must match
/// - For major version 0.x.y, minor versions must match (breaking changes)
/// - For major version >= 1, minor version can be less than or equal
/// - Patch version is ignored
fn is_version_compatible(effect_version: &str, engine_version: &str) -> bool {
    let (effect_ver, engine_ver) = match (
        Version::parse(effect_version),
        Version::parse(engine_version),
    ) {
        (Ok(effect), Ok(engine)) => (effect, engine),
        _ => return false,
    };

    if effect_ver.major != engine_ver.major {
        return false;
    }

    if effect_ver.major != 0 {
        effect_ver.minor <= engine_ver.minor
    } else {
        effect_ver.minor == engine_ver.minor
    }
}
