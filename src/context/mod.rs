//! Load context: the collaborators a token needs while decoding and encoding,
//! passed explicitly instead of reached through a global.

pub mod condition;
pub mod objects;
pub mod refs;

use crate::data::validate::{ValidationReport, ValidationSeverity};

pub use condition::{
    AlwaysPass, Condition, ConditionBuilder, ConditionCheck, ConditionError, OpaqueConditions,
};
pub use objects::{Changes, Entity, TrackedList};
pub use refs::{Category, Ref, RefTarget, ReferenceTable};

pub struct LoadContext {
    pub refs: ReferenceTable,
    pub report: ValidationReport,
    conditions: Box<dyn ConditionBuilder>,
}

impl LoadContext {
    pub fn new() -> Self {
        Self::with_conditions(OpaqueConditions)
    }

    pub fn with_conditions(builder: impl ConditionBuilder + 'static) -> Self {
        Self {
            refs: ReferenceTable::new(),
            report: ValidationReport::default(),
            conditions: Box::new(builder),
        }
    }

    pub fn conditions(&self) -> &dyn ConditionBuilder {
        self.conditions.as_ref()
    }

    /// Record a problem found while writing data back out.
    pub fn add_write_message(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.report
            .push(ValidationSeverity::Error, context, message);
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::new()
    }
}
