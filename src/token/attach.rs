//! Writes decoded grants into an entity's lists.

use crate::context::Entity;
use crate::token::kind::TokenKind;
use crate::token::model::{DeferredListGrant, GrantSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Grant(GrantSpec),
    DeferredList(DeferredListGrant),
}

/// Commit attachments in order: grants to the token's slot, `%LIST`
/// registrations to the entity's choose-actor list.
pub fn attach_all(entity: &mut Entity, kind: &TokenKind, attachments: Vec<Attachment>) {
    for attachment in attachments {
        match attachment {
            Attachment::Grant(spec) => {
                tracing::debug!(entity = entity.key(), token = kind.name, "grant attached");
                entity.add_grant(kind.name, spec);
            }
            Attachment::DeferredList(grant) => {
                tracing::debug!(
                    entity = entity.key(),
                    token = kind.name,
                    conditional = grant.condition().is_some(),
                    "choose actor registered"
                );
                entity.add_choose_actor(grant);
            }
        }
    }
}
