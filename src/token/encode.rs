//! Encoder: everything a token attached to an entity, back to canonical values.
//!
//! Runs as four plain stages: collect, canonicalize, sort, validate. The
//! output is sorted and deduplicated, so the same stored state always writes
//! the same values.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::context::{Condition, Entity, LoadContext, RefTarget, ReferenceTable};
use crate::token::error::EncodeError;
use crate::token::kind::TokenKind;
use crate::token::model::{DeferredListGrant, GrantPayload, GrantSpec};
use crate::token::syntax::{ALL_KEYWORD, CLOSE_BRACKET, LIST_KEYWORD, OPEN_BRACKET, PIPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FragmentClass {
    UnconditionalAll,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    text: String,
    class: FragmentClass,
}

#[derive(Debug)]
struct Collected<'e> {
    deferred: Vec<&'e DeferredListGrant>,
    grants: Vec<&'e GrantSpec>,
}

#[derive(Debug, Default)]
struct Sorted {
    values: BTreeSet<String>,
    found_any: bool,
    found_other: bool,
}

fn collect<'e>(kind: &TokenKind, entity: &'e Entity) -> Collected<'e> {
    Collected {
        deferred: entity
            .choose_actor_changes()
            .added
            .iter()
            .filter(|actor| actor.source() == kind.name)
            .collect(),
        grants: entity.grant_changes(kind.name).added.iter().collect(),
    }
}

fn canonicalize(
    kind: &TokenKind,
    ctx: &LoadContext,
    collected: &Collected<'_>,
) -> Result<Vec<Fragment>, EncodeError> {
    let mut fragments = Vec::with_capacity(collected.deferred.len() + collected.grants.len());

    for actor in &collected.deferred {
        let text = with_condition(kind, ctx, LIST_KEYWORD.to_string(), actor.condition())?;
        fragments.push(Fragment {
            text,
            class: FragmentClass::Other,
        });
    }

    for spec in &collected.grants {
        let payload = render_payload(kind, &ctx.refs, spec.payload());
        let text = with_condition(kind, ctx, payload, spec.condition())?;
        let class = if text == ALL_KEYWORD {
            FragmentClass::UnconditionalAll
        } else {
            FragmentClass::Other
        };
        fragments.push(Fragment { text, class });
    }

    Ok(fragments)
}

fn sort(fragments: Vec<Fragment>) -> Sorted {
    let mut sorted = Sorted::default();
    for fragment in fragments {
        match fragment.class {
            FragmentClass::UnconditionalAll => sorted.found_any = true,
            FragmentClass::Other => sorted.found_other = true,
        }
        sorted.values.insert(fragment.text);
    }
    sorted
}

fn validate(kind: &TokenKind, sorted: Sorted) -> Result<Option<Vec<String>>, EncodeError> {
    if sorted.found_any && sorted.found_other {
        return Err(EncodeError::Inconsistent {
            token: kind.full_name(),
            values: sorted.values.into_iter().collect(),
        });
    }
    if sorted.values.is_empty() {
        return Ok(None);
    }
    Ok(Some(sorted.values.into_iter().collect()))
}

fn with_condition(
    kind: &TokenKind,
    ctx: &LoadContext,
    mut text: String,
    condition: Option<&Condition>,
) -> Result<String, EncodeError> {
    if let Some(condition) = condition {
        let rendered = ctx
            .conditions()
            .render(condition)
            .map_err(|source| EncodeError::Condition {
                token: kind.full_name(),
                source,
            })?;
        text.push(OPEN_BRACKET);
        text.push_str(&rendered);
        text.push(CLOSE_BRACKET);
    }
    Ok(text)
}

/// Case-insensitive order, exact text as tie-break.
fn compare_lst(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn render_payload(kind: &TokenKind, refs: &ReferenceTable, payload: &GrantPayload) -> String {
    match payload {
        GrantPayload::All(_) => ALL_KEYWORD.to_string(),
        GrantPayload::Refs {
            capabilities,
            type_groups,
        } => {
            let mut named: Vec<String> = capabilities
                .iter()
                .map(|r| refs.lst_format(*r).to_string())
                .collect();
            named.sort_by(|a, b| compare_lst(a, b));

            let mut typed: Vec<String> = type_groups
                .iter()
                .map(|r| render_type_group(kind, refs.target(*r), refs.lst_format(*r)))
                .collect();
            typed.sort_by(|a, b| compare_lst(a, b));

            named.extend(typed);
            named.join(&PIPE.to_string())
        }
    }
}

/// `TYPE=Heavy.SHIELD` is written as `SHIELDTYPE=Heavy`: the implied base
/// type is dropped, types spelled out in the data are kept.
fn render_type_group(kind: &TokenKind, target: &RefTarget, lst_format: &str) -> String {
    match target {
        RefTarget::Typed { types, .. } => {
            format!("{}{}", kind.canonical_type_prefix(), types.join("."))
        }
        _ => lst_format.to_string(),
    }
}

impl TokenKind {
    /// Canonical values for everything this token attached to `entity`.
    ///
    /// `Ok(None)` means there is nothing to write.
    pub fn try_encode(
        &self,
        ctx: &LoadContext,
        entity: &Entity,
    ) -> Result<Option<Vec<String>>, EncodeError> {
        let collected = collect(self, entity);
        let fragments = canonicalize(self, ctx, &collected)?;
        validate(self, sort(fragments))
    }

    /// Like [Self::try_encode], but a failure becomes a write message in
    /// `ctx.report` and `None`, so a save never aborts on one entity.
    pub fn encode(&self, ctx: &mut LoadContext, entity: &Entity) -> Option<Vec<String>> {
        match self.try_encode(ctx, entity) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(
                    entity = entity.key(),
                    token = self.name,
                    error = %err,
                    "grants not written"
                );
                ctx.add_write_message(
                    format!("{} {}", entity.key(), self.full_name()),
                    err.to_string(),
                );
                None
            }
        }
    }
}
