use thiserror::Error;

use crate::context::ConditionError;

/// Why a value could not be decoded. Messages name the token and the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantError {
    #[error("Illegal separator in {token} {value}: {problem}")]
    MalformedSeparator {
        token: String,
        value: String,
        problem: String,
    },

    #[error("Unresolved condition in {token} {value}")]
    UnterminatedCondition { token: String, value: String },

    #[error("Error generating condition '{text}' in {token} {value}: {source}")]
    InvalidCondition {
        token: String,
        value: String,
        text: String,
        #[source]
        source: ConditionError,
    },

    #[error("Internal error in {token} {value}: no type reference for '{type_expr}'")]
    UnresolvedTypeReference {
        token: String,
        value: String,
        type_expr: String,
    },

    #[error("Non-sensical {token}: Contains ALL and a specific reference: {value}")]
    MutualExclusionViolation { token: String, value: String },
}

impl GrantError {
    /// Internal errors point at the resolver, not at the data file.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnresolvedTypeReference { .. })
    }
}

/// Why stored state could not be written back out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Non-sensical {token}: Contains ALL and a specific reference: {values:?}")]
    Inconsistent { token: String, values: Vec<String> },

    #[error("Error writing condition in {token}: {source}")]
    Condition {
        token: String,
        #[source]
        source: ConditionError,
    },
}
