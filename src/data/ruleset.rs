//! Rule-set files: definition entities with their raw `AUTO:SHIELDPROF` values.
//!
//! ```yaml
//! entities:
//!   - key: Fighter
//!     auto_shieldprof:
//!       - "Buckler|Tower"
//!       - "%LIST[CLASS=Fighter]"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::{Entity, LoadContext};
use crate::data::validate::ValidationSeverity;
use crate::data::{read_yaml, DataError};
use crate::token::SHIELD_PROF;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetFile {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    pub key: String,
    #[serde(default)]
    pub auto_shieldprof: Vec<String>,
}

pub fn load_rule_set(path: impl AsRef<Path>) -> Result<RuleSetFile, DataError> {
    read_yaml(path.as_ref())
}

/// Entities after every value has been decoded.
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    pub entities: Vec<Entity>,
}

impl CompiledRuleSet {
    /// Entity by key, case-insensitive.
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.key().eq_ignore_ascii_case(key))
    }
}

/// Decode every value of every entity.
///
/// A value that fails to decode becomes an error diagnostic in `ctx.report`
/// (context `<key>.auto_shieldprof[<index>]`) and compilation moves on.
/// Entities with a duplicate key are reported and skipped.
pub fn compile_rule_set(ctx: &mut LoadContext, file: &RuleSetFile) -> CompiledRuleSet {
    let mut seen_keys = HashSet::new();
    let mut entities = Vec::with_capacity(file.entities.len());

    for (index, record) in file.entities.iter().enumerate() {
        if record.key.trim().is_empty() {
            ctx.report.push(
                ValidationSeverity::Error,
                format!("entities[{index}].key"),
                "missing non-empty 'key'",
            );
            continue;
        }
        if !seen_keys.insert(record.key.to_lowercase()) {
            ctx.report.push(
                ValidationSeverity::Error,
                format!("entities[{index}].key"),
                format!("duplicate key '{}'", record.key),
            );
            continue;
        }

        let mut entity = Entity::new(record.key.clone());
        for (value_index, value) in record.auto_shieldprof.iter().enumerate() {
            if let Err(err) = SHIELD_PROF.decode(ctx, &mut entity, value) {
                ctx.report.push(
                    ValidationSeverity::Error,
                    format!("{}.auto_shieldprof[{value_index}]", record.key),
                    err.to_string(),
                );
            }
        }
        entities.push(entity);
    }

    CompiledRuleSet { entities }
}
