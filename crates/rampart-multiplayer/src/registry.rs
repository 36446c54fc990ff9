//! Identity registry: `(kind, id)` → live entity handle.
//!
//! An explicitly constructed object, not a process-wide static, so tests
//! and multiple sessions can hold independent registries. Mutation is
//! exclusive to the control thread.

use std::collections::HashMap;

use bevy_ecs::entity::Entity;
use rampart_protocol::{Identity, IdentityKind};
use tracing::{debug, warn};

/// Per-kind lookup tables from network id to local entity handle.
pub struct IdentityRegistry {
    repository: HashMap<IdentityKind, HashMap<i32, Entity>>,
}

impl IdentityRegistry {
    /// Creates a registry with an empty table per live kind.
    pub fn new() -> Self {
        let mut repository = HashMap::new();
        for kind in IdentityKind::LIVE {
            repository.insert(kind, HashMap::new());
        }
        Self { repository }
    }

    /// Registers `entity` under `(kind, id)`, overwriting any previous
    /// mapping for that pair.
    pub fn register(&mut self, kind: IdentityKind, id: i32, entity: Entity) {
        let Some(table) = self.repository.get_mut(&kind) else {
            warn!("ignoring registration of {kind:?}:{id}");
            return;
        };
        table.insert(id, entity);
        debug!("added {kind:?}:{id} to identity registry");
    }

    /// Removes the mapping for `(kind, id)`, if any.
    pub fn unregister(&mut self, kind: IdentityKind, id: i32) {
        if let Some(table) = self.repository.get_mut(&kind) {
            table.remove(&id);
        }
    }

    /// Resolves `(kind, id)` to the registered entity. `Invalid` and
    /// unregistered ids resolve to `None`; resolution never errors.
    pub fn resolve(&self, kind: IdentityKind, id: i32) -> Option<Entity> {
        self.repository.get(&kind)?.get(&id).copied()
    }

    /// Resolves an [`Identity`] payload reference.
    pub fn resolve_identity(&self, identity: Identity) -> Option<Entity> {
        self.resolve(identity.kind, identity.id)
    }

    /// Removes every entry of one kind. Other kinds are unaffected; used on
    /// level/scene teardown.
    pub fn clear(&mut self, kind: IdentityKind) {
        if let Some(table) = self.repository.get_mut(&kind) {
            table.clear();
        }
    }

    /// Number of registered entities of `kind`.
    pub fn len(&self, kind: IdentityKind) -> usize {
        self.repository.get(&kind).map_or(0, |table| table.len())
    }

    /// Returns `true` if no entity of `kind` is registered.
    pub fn is_empty(&self, kind: IdentityKind) -> bool {
        self.len(kind) == 0
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
