//! Runtime character: the proficiencies each owning entity has granted it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::catalog::CapabilityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ProficiencyAssociation {
    Single(CapabilityId),
}

impl ProficiencyAssociation {
    pub fn capability(&self) -> CapabilityId {
        match self {
            Self::Single(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Character {
    name: String,
    associations: BTreeMap<String, Vec<ProficiencyAssociation>>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            associations: BTreeMap::new(),
        }
    }

    pub fn add_assoc(&mut self, owner: &str, association: ProficiencyAssociation) {
        self.associations
            .entry(owner.to_string())
            .or_default()
            .push(association);
    }

    /// Remove one matching association. Owners left with none are dropped, so
    /// add-then-remove restores the previous state exactly.
    pub fn remove_assoc(&mut self, owner: &str, association: ProficiencyAssociation) -> bool {
        let Some(list) = self.associations.get_mut(owner) else {
            return false;
        };
        let Some(index) = list.iter().position(|a| *a == association) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.associations.remove(owner);
        }
        true
    }

    pub fn associations(&self, owner: &str) -> &[ProficiencyAssociation] {
        self.associations
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every capability the character holds, from any owner.
    pub fn capability_ids(&self) -> BTreeSet<CapabilityId> {
        self.associations
            .values()
            .flatten()
            .map(ProficiencyAssociation::capability)
            .collect()
    }
}
