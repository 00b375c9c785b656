//! Decoded form of a grant-list value.

use crate::context::{Condition, Ref};

/// What a grant covers: every capability of the kind, or specific references.
/// The two never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantPayload {
    All(Ref),
    Refs {
        capabilities: Vec<Ref>,
        type_groups: Vec<Ref>,
    },
}

/// One decoded value, minus any `%LIST` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantSpec {
    payload: GrantPayload,
    condition: Option<Condition>,
}

impl GrantSpec {
    pub fn new(payload: GrantPayload, condition: Option<Condition>) -> Self {
        Self { payload, condition }
    }

    pub fn payload(&self) -> &GrantPayload {
        &self.payload
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn is_all(&self) -> bool {
        matches!(self.payload, GrantPayload::All(_))
    }

    pub fn capability_refs(&self) -> &[Ref] {
        match &self.payload {
            GrantPayload::All(_) => &[],
            GrantPayload::Refs { capabilities, .. } => capabilities,
        }
    }

    pub fn type_group_refs(&self) -> &[Ref] {
        match &self.payload {
            GrantPayload::All(_) => &[],
            GrantPayload::Refs { type_groups, .. } => type_groups,
        }
    }

    /// Every reference the grant holds, the all-marker included.
    pub fn refs(&self) -> Vec<Ref> {
        match &self.payload {
            GrantPayload::All(all) => vec![*all],
            GrantPayload::Refs {
                capabilities,
                type_groups,
            } => capabilities.iter().chain(type_groups).copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Unconditional,
    Conditional(Condition),
}

impl GrantOutcome {
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Self::Unconditional => None,
            Self::Conditional(condition) => Some(condition),
        }
    }
}

impl From<Option<Condition>> for GrantOutcome {
    fn from(condition: Option<Condition>) -> Self {
        condition.map_or(Self::Unconditional, Self::Conditional)
    }
}

/// A `%LIST` registration: capabilities picked later, per character, by the
/// choice mechanism. `source` is the token name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredListGrant {
    source: &'static str,
    outcome: GrantOutcome,
}

impl DeferredListGrant {
    pub fn new(source: &'static str, outcome: GrantOutcome) -> Self {
        Self { source, outcome }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn outcome(&self) -> &GrantOutcome {
        &self.outcome
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.outcome.condition()
    }
}
