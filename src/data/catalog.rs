//! Capability catalog: the shield proficiencies a grant can name, plus the
//! equipment whose types back `SHIELDTYPE=` references.
//!
//! Loaded once from YAML and passed by reference wherever names are resolved.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{read_yaml, DataError};

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.yaml";

/// Index of a constructed capability in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CapabilityId(usize);

/// Root structure of a catalog YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub proficiencies: Vec<ProficiencyRecord>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProficiencyRecord {
    pub name: String,
}

/// Equipment entry. `types` are matched case-insensitively by type-group references;
/// `proficiency` names the capability the item requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub proficiency: Option<String>,
}

impl EquipmentRecord {
    pub fn has_all_types(&self, wanted: &[String]) -> bool {
        wanted
            .iter()
            .all(|w| self.types.iter().any(|t| t.eq_ignore_ascii_case(w)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub id: CapabilityId,
    pub name: String,
}

/// Lookup key for capability names: trimmed, lowercase.
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Constructed capabilities by id and by normalized name.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
    by_key: HashMap<String, CapabilityId>,
    equipment: Vec<EquipmentRecord>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed catalog. Repeated proficiency names keep the first entry.
    pub fn from_catalog(file: CatalogFile) -> Self {
        let mut registry = Self::new();
        for record in file.proficiencies {
            registry.construct(&record.name);
        }
        registry.equipment = file.equipment;
        registry
    }

    /// Construct a capability, or return the existing id for the same name.
    pub fn construct(&mut self, name: &str) -> CapabilityId {
        let key = normalize_key(name);
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }
        let id = CapabilityId(self.capabilities.len());
        self.capabilities.push(Capability {
            id,
            name: name.trim().to_string(),
        });
        self.by_key.insert(key, id);
        id
    }

    pub fn add_equipment(&mut self, record: EquipmentRecord) {
        self.equipment.push(record);
    }

    /// Silent lookup: unknown names are `None`, never an error.
    pub fn lookup(&self, name: &str) -> Option<&Capability> {
        self.by_key
            .get(&normalize_key(name))
            .and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: CapabilityId) -> Option<&Capability> {
        self.capabilities.get(id.0)
    }

    pub fn name_of(&self, id: CapabilityId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = CapabilityId> + '_ {
        self.capabilities.iter().map(|c| c.id)
    }

    pub fn equipment(&self) -> &[EquipmentRecord] {
        &self.equipment
    }

    /// Capabilities required by equipment carrying every one of `types`.
    pub fn capabilities_for_types(&self, types: &[String]) -> Vec<CapabilityId> {
        self.equipment
            .iter()
            .filter(|item| item.has_all_types(types))
            .filter_map(|item| item.proficiency.as_deref())
            .filter_map(|name| self.lookup(name).map(|c| c.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

/// Load a catalog YAML file into a registry.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<CapabilityRegistry, DataError> {
    let file: CatalogFile = read_yaml(path.as_ref())?;
    tracing::debug!(
        proficiencies = file.proficiencies.len(),
        equipment = file.equipment.len(),
        "catalog loaded"
    );
    Ok(CapabilityRegistry::from_catalog(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
proficiencies:
  - name: Buckler
  - name: Heavy Shield
  - name: buckler
equipment:
  - name: Heavy Steel Shield
    types: [Shield, Heavy, Metal]
    proficiency: Heavy Shield
  - name: Spiked Buckler
    types: [Shield, Light]
    proficiency: Exotic Buckler
"#;

    fn registry() -> CapabilityRegistry {
        let file: CatalogFile = serde_yaml::from_str(CATALOG).expect("catalog parses");
        CapabilityRegistry::from_catalog(file)
    }

    #[test]
    fn repeated_names_collapse_to_first_entry() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("BUCKLER").map(|c| c.name.as_str()), Some("Buckler"));
    }

    #[test]
    fn lookup_is_silent_for_unknown_names() {
        assert!(registry().lookup("Tower").is_none());
    }

    #[test]
    fn type_match_skips_unknown_proficiencies() {
        let registry = registry();
        let heavy = registry.lookup("Heavy Shield").map(|c| c.id);
        let ids = registry.capabilities_for_types(&["SHIELD".to_string(), "heavy".to_string()]);
        assert_eq!(ids.into_iter().next(), heavy);

        let light = registry.capabilities_for_types(&["Shield".to_string(), "Light".to_string()]);
        assert!(light.is_empty(), "Exotic Buckler is not in the catalog");
    }
}
