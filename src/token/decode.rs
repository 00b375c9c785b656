//! Decoder: one raw value into grants on an entity.
//!
//! Nothing reaches the entity until the whole value has been checked, so a
//! failed decode leaves it untouched.

use crate::context::{Entity, LoadContext, Ref};
use crate::token::attach::{attach_all, Attachment};
use crate::token::error::GrantError;
use crate::token::kind::TokenKind;
use crate::token::model::{DeferredListGrant, GrantOutcome, GrantPayload, GrantSpec};
use crate::token::syntax::{self, ALL_KEYWORD, LIST_KEYWORD, PIPE};

#[derive(Debug, Default)]
struct PendingGrant {
    all: Option<Ref>,
    capabilities: Vec<Ref>,
    type_groups: Vec<Ref>,
}

impl PendingGrant {
    fn into_payload(self) -> Option<GrantPayload> {
        if let Some(all) = self.all {
            return Some(GrantPayload::All(all));
        }
        if self.capabilities.is_empty() && self.type_groups.is_empty() {
            return None;
        }
        Some(GrantPayload::Refs {
            capabilities: self.capabilities,
            type_groups: self.type_groups,
        })
    }
}

fn push_unique(refs: &mut Vec<Ref>, r: Ref) {
    if !refs.contains(&r) {
        refs.push(r);
    }
}

impl TokenKind {
    /// Decode `value` and attach the result to `entity`.
    pub fn decode(
        &self,
        ctx: &mut LoadContext,
        entity: &mut Entity,
        value: &str,
    ) -> Result<(), GrantError> {
        let token = self.full_name();

        let (payload, condition_text) =
            syntax::split_condition(value).map_err(|_| GrantError::UnterminatedCondition {
                token: token.clone(),
                value: value.to_string(),
            })?;

        let condition = match condition_text {
            Some(text) => Some(ctx.conditions().parse(text).map_err(|source| {
                GrantError::InvalidCondition {
                    token: token.clone(),
                    value: value.to_string(),
                    text: text.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        syntax::check_illegal_separator(PIPE, payload).map_err(|problem| {
            GrantError::MalformedSeparator {
                token: token.clone(),
                value: value.to_string(),
                problem: problem.describe(PIPE),
            }
        })?;

        let mut found_any = false;
        let mut found_other = false;
        let mut pending = PendingGrant::default();
        let mut deferred = Vec::new();

        for segment in payload.split(PIPE) {
            if segment == LIST_KEYWORD {
                found_other = true;
                deferred.push(DeferredListGrant::new(
                    self.name,
                    GrantOutcome::from(condition.clone()),
                ));
            } else if segment.eq_ignore_ascii_case(ALL_KEYWORD) {
                found_any = true;
                pending.all = Some(ctx.refs.resolve_all_of(self.capability));
            } else if let Some(rest) = syntax::strip_any_prefix(segment, self.type_prefixes) {
                found_other = true;
                let r = ctx
                    .refs
                    .resolve_by_type(self.type_category, self.type_base, rest)
                    .ok_or_else(|| GrantError::UnresolvedTypeReference {
                        token: token.clone(),
                        value: value.to_string(),
                        type_expr: format!("{}.{rest}", self.type_base),
                    })?;
                push_unique(&mut pending.type_groups, r);
            } else {
                found_other = true;
                let r = ctx.refs.resolve_named(self.capability, segment);
                push_unique(&mut pending.capabilities, r);
            }
        }

        if found_any && found_other {
            return Err(GrantError::MutualExclusionViolation {
                token,
                value: value.to_string(),
            });
        }

        let mut attachments: Vec<Attachment> =
            deferred.into_iter().map(Attachment::DeferredList).collect();
        if let Some(payload) = pending.into_payload() {
            attachments.push(Attachment::Grant(GrantSpec::new(payload, condition)));
        }
        attach_all(entity, self, attachments);
        Ok(())
    }
}
