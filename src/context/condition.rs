//! Conditions attached to grants: an opaque text handle plus the builder seam
//! that turns bracket text into a [Condition] and back.
//!
//! The condition language itself belongs to the host. [OpaqueConditions] is the
//! default builder: it only checks that the text can live inside a bracket pair.

use std::fmt;

use thiserror::Error;

use crate::character::Character;

/// Parsed condition handle. Equality and ordering follow the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Condition {
    text: String,
}

impl Condition {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,
    #[error("condition '{0}' contains a bracket")]
    Bracket(String),
    #[error("condition cannot be written: {0}")]
    Unwritable(String),
}

/// Builds condition handles from bracket text and renders them back.
pub trait ConditionBuilder {
    fn parse(&self, text: &str) -> Result<Condition, ConditionError>;

    fn render(&self, condition: &Condition) -> Result<String, ConditionError>;
}

/// Default builder: keeps the text verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueConditions;

impl ConditionBuilder for OpaqueConditions {
    fn parse(&self, text: &str) -> Result<Condition, ConditionError> {
        if text.trim().is_empty() {
            return Err(ConditionError::Empty);
        }
        if text.contains(&['[', ']'][..]) {
            return Err(ConditionError::Bracket(text.to_string()));
        }
        Ok(Condition::new(text))
    }

    fn render(&self, condition: &Condition) -> Result<String, ConditionError> {
        Ok(condition.text().to_string())
    }
}

/// Runtime predicate deciding whether a conditional grant applies to a character.
pub trait ConditionCheck {
    fn passes(&self, condition: &Condition, character: &Character) -> bool;
}

impl<F> ConditionCheck for F
where
    F: Fn(&Condition, &Character) -> bool,
{
    fn passes(&self, condition: &Condition, character: &Character) -> bool {
        self(condition, character)
    }
}

/// Check that lets every condition through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysPass;

impl ConditionCheck for AlwaysPass {
    fn passes(&self, _condition: &Condition, _character: &Character) -> bool {
        true
    }
}
