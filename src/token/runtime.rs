//! Runtime side of the token: turning grants into character associations.
//!
//! Unknown capability names are silently ignored here. Reporting them is the
//! loader's job (see [crate::context::ReferenceTable::finalize]).

use std::collections::BTreeSet;

use crate::character::{Character, ProficiencyAssociation};
use crate::context::{ConditionCheck, Entity, ReferenceTable};
use crate::data::catalog::{CapabilityId, CapabilityRegistry};
use crate::token::kind::TokenKind;
use crate::token::model::{DeferredListGrant, GrantOutcome};

/// Give `character` the capability called `name`, owned by `owner`.
pub fn attach(character: &mut Character, owner: &str, registry: &CapabilityRegistry, name: &str) {
    let Some(capability) = registry.lookup(name) else {
        tracing::debug!(owner, name, "attach skipped: unknown capability");
        return;
    };
    character.add_assoc(owner, ProficiencyAssociation::Single(capability.id));
}

/// Undo one [attach] of the same name.
pub fn detach(character: &mut Character, owner: &str, registry: &CapabilityRegistry, name: &str) {
    let Some(capability) = registry.lookup(name) else {
        return;
    };
    character.remove_assoc(owner, ProficiencyAssociation::Single(capability.id));
}

impl DeferredListGrant {
    /// Grant a capability picked through the choice mechanism. Conditional
    /// registrations only apply when `check` passes for `character`.
    pub fn apply(
        &self,
        character: &mut Character,
        owner: &str,
        registry: &CapabilityRegistry,
        check: &dyn ConditionCheck,
        name: &str,
    ) {
        if let GrantOutcome::Conditional(condition) = self.outcome() {
            if !check.passes(condition, character) {
                return;
            }
        }
        attach(character, owner, registry, name);
    }

    /// Take back a picked capability. Unconditional: a choice that was made
    /// can always be unmade.
    pub fn remove(
        &self,
        character: &mut Character,
        owner: &str,
        registry: &CapabilityRegistry,
        name: &str,
    ) {
        detach(character, owner, registry, name);
    }
}

/// Run every `%LIST` registration `kind` left on `entity` for each chosen name.
pub fn apply_choices(
    entity: &Entity,
    kind: &TokenKind,
    character: &mut Character,
    registry: &CapabilityRegistry,
    check: &dyn ConditionCheck,
    names: &[String],
) {
    for actor in entity
        .choose_actor_changes()
        .added
        .iter()
        .filter(|actor| actor.source() == kind.name)
    {
        for name in names {
            actor.apply(character, entity.key(), registry, check, name);
        }
    }
}

/// Capabilities the entity's static grants give `character`.
///
/// `refs` must be finalized; unresolved references contribute nothing.
pub fn granted_capabilities(
    entity: &Entity,
    kind: &TokenKind,
    refs: &ReferenceTable,
    check: &dyn ConditionCheck,
    character: &Character,
) -> BTreeSet<CapabilityId> {
    let mut granted = BTreeSet::new();
    for spec in entity.grant_changes(kind.name).added {
        if let Some(condition) = spec.condition() {
            if !check.passes(condition, character) {
                continue;
            }
        }
        for r in spec.refs() {
            if let Some(ids) = refs.resolved(r) {
                granted.extend(ids.iter().copied());
            }
        }
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AlwaysPass, Condition, LoadContext};
    use crate::token::SHIELD_PROF;

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry.construct("Buckler");
        registry.construct("Tower");
        registry
    }

    #[test]
    fn unknown_name_is_a_silent_no_op() {
        let registry = registry();
        let mut character = Character::new("Valeros");
        attach(&mut character, "Fighter", &registry, "Kite");
        assert_eq!(character, Character::new("Valeros"));
        detach(&mut character, "Fighter", &registry, "Kite");
        assert_eq!(character, Character::new("Valeros"));
    }

    #[test]
    fn attach_then_detach_restores_prior_state() {
        let registry = registry();
        let mut character = Character::new("Valeros");
        attach(&mut character, "Fighter", &registry, "Tower");
        let before = character.clone();

        attach(&mut character, "Fighter", &registry, "buckler");
        assert_eq!(character.associations("Fighter").len(), 2);
        detach(&mut character, "Fighter", &registry, "Buckler");
        assert_eq!(character, before);
    }

    #[test]
    fn conditional_actor_respects_the_check() {
        let registry = registry();
        let actor = DeferredListGrant::new(
            "SHIELDPROF",
            GrantOutcome::Conditional(Condition::new("CLASS=Fighter")),
        );
        let never = |_: &Condition, _: &Character| false;

        let mut character = Character::new("Valeros");
        actor.apply(&mut character, "Fighter", &registry, &never, "Buckler");
        assert!(character.associations("Fighter").is_empty());

        actor.apply(&mut character, "Fighter", &registry, &AlwaysPass, "Buckler");
        assert_eq!(character.associations("Fighter").len(), 1);

        actor.remove(&mut character, "Fighter", &registry, "Buckler");
        assert_eq!(character, Character::new("Valeros"));
    }

    #[test]
    fn static_grants_skip_failed_conditions() {
        let registry = registry();
        let mut ctx = LoadContext::new();
        let mut entity = Entity::new("Fighter");
        SHIELD_PROF
            .decode(&mut ctx, &mut entity, "Buckler")
            .expect("decodes");
        SHIELD_PROF
            .decode(&mut ctx, &mut entity, "Tower[LEVEL=5]")
            .expect("decodes");
        ctx.refs.finalize(&registry);

        let character = Character::new("Valeros");
        let level_five = |c: &Condition, _: &Character| c.text() != "LEVEL=5";
        let granted =
            granted_capabilities(&entity, &SHIELD_PROF, &ctx.refs, &level_five, &character);
        let names: Vec<&str> = granted
            .iter()
            .filter_map(|id| registry.name_of(*id))
            .collect();
        assert_eq!(names, ["Buckler"]);

        let granted =
            granted_capabilities(&entity, &SHIELD_PROF, &ctx.refs, &AlwaysPass, &character);
        assert_eq!(granted.len(), 2);
    }

    #[test]
    fn choices_run_through_matching_actors_only() {
        let registry = registry();
        let mut entity = Entity::new("Fighter");
        entity.add_choose_actor(DeferredListGrant::new("SHIELDPROF", GrantOutcome::Unconditional));
        entity.add_choose_actor(DeferredListGrant::new("ARMORPROF", GrantOutcome::Unconditional));

        let mut character = Character::new("Valeros");
        apply_choices(
            &entity,
            &SHIELD_PROF,
            &mut character,
            &registry,
            &AlwaysPass,
            &["Tower".to_string()],
        );
        assert_eq!(character.associations("Fighter").len(), 1);
    }
}
