//! Diagnostics collected while loading and writing rule sets, and the
//! round-trip check behind `autoprof validate`.

use std::fmt;

use serde::Serialize;

use crate::context::{Entity, LoadContext};
use crate::data::catalog::CapabilityRegistry;
use crate::data::ruleset::{compile_rule_set, RuleSetFile};
use crate::token::SHIELD_PROF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compile a rule set, re-encode every entity and decode the result again,
/// checking that the second encoding matches the first.
///
/// With a registry, references the catalog cannot construct are reported as warnings.
pub fn validate_rule_set(
    file: &RuleSetFile,
    registry: Option<&CapabilityRegistry>,
) -> ValidationReport {
    let mut ctx = LoadContext::new();
    let compiled = compile_rule_set(&mut ctx, file);

    for entity in &compiled.entities {
        check_round_trip(&mut ctx, entity);
    }

    if let Some(registry) = registry {
        for name in ctx.refs.finalize(registry) {
            ctx.report.push(
                ValidationSeverity::Warning,
                SHIELD_PROF.full_name(),
                format!("unconstructed reference '{name}'"),
            );
        }
    }

    ctx.report
}

fn check_round_trip(ctx: &mut LoadContext, entity: &Entity) {
    // Encode failures are already in the report.
    let Some(values) = SHIELD_PROF.encode(ctx, entity) else {
        return;
    };

    let mut reparsed = Entity::new(entity.key());
    for value in &values {
        if let Err(err) = SHIELD_PROF.decode(ctx, &mut reparsed, value) {
            ctx.report.push(
                ValidationSeverity::Error,
                entity.key(),
                format!("canonical value '{value}' does not decode: {err}"),
            );
            return;
        }
    }

    let again = SHIELD_PROF.encode(ctx, &reparsed);
    if again.as_ref() != Some(&values) {
        ctx.report.push(
            ValidationSeverity::Error,
            entity.key(),
            format!("round trip changed {values:?} into {again:?}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ruleset::EntityRecord;

    fn rules(values: &[(&str, &[&str])]) -> RuleSetFile {
        RuleSetFile {
            entities: values
                .iter()
                .map(|(key, raw)| EntityRecord {
                    key: key.to_string(),
                    auto_shieldprof: raw.iter().map(|v| v.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn clean_rule_set_has_no_diagnostics() {
        let file = rules(&[
            ("Fighter", &["Buckler|SHIELDTYPE.Heavy", "%LIST[CLASS=Fighter]"]),
            ("Paladin", &["ALL"]),
        ]);
        let report = validate_rule_set(&file, None);
        assert!(report.is_empty(), "unexpected diagnostics: {:?}", report.diagnostics);
    }

    #[test]
    fn mixed_all_and_specific_across_values_is_reported_on_write() {
        let file = rules(&[("Fighter", &["ALL", "Buckler"])]);
        let report = validate_rule_set(&file, None);
        assert_eq!(report.error_count(), 1);
        let diag = &report.diagnostics[0];
        assert!(diag.context.contains("Fighter"));
        assert!(diag.message.contains("Non-sensical AUTO:SHIELDPROF"));
    }

    #[test]
    fn unknown_names_are_warnings_when_a_catalog_is_given() {
        let mut registry = CapabilityRegistry::new();
        registry.construct("Buckler");
        let file = rules(&[("Fighter", &["Buckler|Kite"])]);
        let report = validate_rule_set(&file, Some(&registry));
        assert!(!report.has_errors());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, ValidationSeverity::Warning);
        assert_eq!(report.diagnostics[0].message, "unconstructed reference 'Kite'");
    }

    #[test]
    fn diagnostics_render_with_severity_and_context() {
        let mut report = ValidationReport::default();
        report.push(ValidationSeverity::Warning, "Fighter", "something odd");
        assert_eq!(report.diagnostics[0].to_string(), "[warning] Fighter: something odd");
    }
}
