//! Definition entities and their list-valued attributes.
//!
//! Lists only grow while loading; an encoder reads back exactly what the data
//! files added, in the order they added it.

use std::collections::BTreeMap;

use crate::token::model::{DeferredListGrant, GrantSpec};

/// Read view over one tracked list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Changes<'a, T> {
    pub added: &'a [T],
}

impl<T> Changes<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedList<T> {
    added: Vec<T>,
}

impl<T> Default for TrackedList<T> {
    fn default() -> Self {
        Self { added: Vec::new() }
    }
}

impl<T> TrackedList<T> {
    pub fn add(&mut self, value: T) {
        self.added.push(value);
    }

    pub fn changes(&self) -> Changes<'_, T> {
        Changes { added: &self.added }
    }
}

/// A definition entity (class, race, feat, ...) that grants shield proficiencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    key: String,
    grants: BTreeMap<String, TrackedList<GrantSpec>>,
    choose_actors: TrackedList<DeferredListGrant>,
}

impl Entity {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn add_grant(&mut self, slot: &str, spec: GrantSpec) {
        self.grants.entry(slot.to_string()).or_default().add(spec);
    }

    pub fn grant_changes(&self, slot: &str) -> Changes<'_, GrantSpec> {
        match self.grants.get(slot) {
            Some(list) => list.changes(),
            None => Changes { added: &[] },
        }
    }

    pub fn add_choose_actor(&mut self, actor: DeferredListGrant) {
        self.choose_actors.add(actor);
    }

    pub fn choose_actor_changes(&self) -> Changes<'_, DeferredListGrant> {
        self.choose_actors.changes()
    }
}
