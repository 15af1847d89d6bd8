//! Table-driven checking of variant-conditional fields.
//!
//! A [`RuleTable`] maps each value of a discriminator field to the fields that
//! value requires, forbids, and fills in when absent. [`check`] applies one
//! rule to a [`Record`], so adding a variant is a change to the table alone.

use serde_json::Value;
use tracing::debug;

use super::error::ValidationError;
use super::naming::to_camel;
use super::record::Record;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FieldDefault {
    Integer(u64),
    Boolean(bool),
}

impl From<FieldDefault> for Value {
    fn from(value: FieldDefault) -> Self {
        match value {
            FieldDefault::Integer(v) => Value::from(v),
            FieldDefault::Boolean(v) => Value::Bool(v),
        }
    }
}

/// Field names are canonical snake_case.
#[derive(Debug)]
pub struct FieldRule {
    pub required: &'static [&'static str],
    pub forbidden: &'static [&'static str],
    pub defaults: &'static [(&'static str, FieldDefault)],
}

impl FieldRule {
    pub const EMPTY: FieldRule = FieldRule {
        required: &[],
        forbidden: &[],
        defaults: &[],
    };
}

#[derive(Debug)]
pub struct RuleTable {
    discriminator: &'static str,
    rules: &'static [(&'static str, FieldRule)],
}

impl RuleTable {
    pub const fn new(
        discriminator: &'static str,
        rules: &'static [(&'static str, FieldRule)],
    ) -> Self {
        Self {
            discriminator,
            rules,
        }
    }

    /// Every variant this table names, with its rule, in declaration order.
    pub fn variants(&self) -> impl Iterator<Item = (&'static str, &'static FieldRule)> {
        let rules: &'static [(&'static str, FieldRule)] = self.rules;
        rules.iter().map(|(name, rule)| (*name, rule))
    }

    /// Unknown variants get [`FieldRule::EMPTY`] rather than an error.
    pub fn rule_for(&self, variant: &str) -> &FieldRule {
        self.rules
            .iter()
            .find(|(name, _)| *name == variant)
            .map(|(_, rule)| rule)
            .unwrap_or(&FieldRule::EMPTY)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantConstraintViolation {
    pub discriminator: &'static str,
    pub variant: String,
    pub missing: Vec<&'static str>,
    pub forbidden: Vec<&'static str>,
}

impl VariantConstraintViolation {
    /// One failure per non-empty class, each naming all of its fields.
    pub fn into_errors(self) -> Vec<ValidationError> {
        let discriminator = to_camel(self.discriminator);
        let variant = to_camel(&self.variant);
        let public = |fields: &[&str]| fields.iter().map(|f| to_camel(f)).collect::<Vec<_>>();

        let mut errors = Vec::with_capacity(2);
        if !self.missing.is_empty() {
            errors.push(ValidationError::MissingForVariant {
                discriminator: discriminator.clone(),
                variant: variant.clone(),
                fields: public(&self.missing),
            });
        }
        if !self.forbidden.is_empty() {
            errors.push(ValidationError::ForbiddenForVariant {
                discriminator,
                variant,
                fields: public(&self.forbidden),
            });
        }
        errors
    }
}

/// Applies the rule for `variant`: fills defaults first, then collects every
/// absent required field and every present forbidden field.
pub fn check(
    variant: &str,
    record: &mut Record,
    table: &RuleTable,
) -> Result<(), VariantConstraintViolation> {
    let rule = table.rule_for(variant);

    for &(field, default) in rule.defaults {
        if record.set_default(field, default.into()) {
            debug!(field = %to_camel(field), ?default, variant, "applied default");
        }
    }

    let missing: Vec<&'static str> = rule
        .required
        .iter()
        .copied()
        .filter(|field| !record.is_present(field))
        .collect();
    let forbidden: Vec<&'static str> = rule
        .forbidden
        .iter()
        .copied()
        .filter(|field| record.is_present(field))
        .collect();

    if missing.is_empty() && forbidden.is_empty() {
        return Ok(());
    }
    Err(VariantConstraintViolation {
        discriminator: table.discriminator,
        variant: variant.to_string(),
        missing,
        forbidden,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use serde_json::json;

    static TEST_RULES: RuleTable = RuleTable::new(
        "shape",
        &[
            (
                "circle",
                FieldRule {
                    required: &["radius"],
                    forbidden: &["width", "height"],
                    defaults: &[],
                },
            ),
            (
                "rectangle",
                FieldRule {
                    required: &["width", "height"],
                    forbidden: &["radius"],
                    defaults: &[("corner_radius", FieldDefault::Integer(0))],
                },
            ),
            (
                "square",
                FieldRule {
                    required: &["width", "rounded"],
                    forbidden: &[],
                    defaults: &[("rounded", FieldDefault::Boolean(false))],
                },
            ),
        ],
    );

    fn record(value: serde_json::Value) -> Record {
        let mut errors = crate::core::ValidationErrors::new();
        let record = Record::from_value(&value, &mut errors).expect("record");
        assert!(errors.is_empty());
        record
    }

    #[test]
    fn exact_field_set_passes() {
        let mut r = record(json!({"radius": 2}));
        assert_eq!(check("circle", &mut r, &TEST_RULES), Ok(()));
    }

    #[test]
    fn missing_and_forbidden_are_collected_jointly() {
        let mut r = record(json!({"radius": 2}));
        let violation = check("rectangle", &mut r, &TEST_RULES).unwrap_err();
        assert_eq!(violation.discriminator, "shape");
        assert_eq!(violation.variant, "rectangle");
        assert_eq!(violation.missing, vec!["width", "height"]);
        assert_eq!(violation.forbidden, vec!["radius"]);

        let errors = violation.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| e.kind() == ErrorKind::VariantConstraintViolation)
        );
        assert_eq!(errors[0].fields(), vec!["width", "height"]);
        assert_eq!(errors[0].to_string(), "width, height is required when shape is rectangle");
        assert_eq!(errors[1].to_string(), "radius must be absent when shape is rectangle");
    }

    #[test]
    fn defaults_are_applied_before_required_check() {
        let mut r = record(json!({"width": 3}));
        assert_eq!(check("square", &mut r, &TEST_RULES), Ok(()));
        assert_eq!(r.get("rounded"), Some(&json!(false)));
    }

    #[test]
    fn defaults_never_override_supplied_values() {
        let mut r = record(json!({"width": 3, "height": 4, "cornerRadius": 5}));
        assert_eq!(check("rectangle", &mut r, &TEST_RULES), Ok(()));
        assert_eq!(r.get("corner_radius"), Some(&json!(5)));
    }

    #[test]
    fn unknown_variant_applies_empty_rule() {
        let mut r = record(json!({"radius": 1, "width": 2}));
        assert_eq!(check("hexagon", &mut r, &TEST_RULES), Ok(()));
        let rule = TEST_RULES.rule_for("hexagon");
        assert!(rule.required.is_empty() && rule.forbidden.is_empty() && rule.defaults.is_empty());
    }

    #[test]
    fn variants_lists_rules_in_declaration_order() {
        let names: Vec<&str> = TEST_RULES.variants().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["circle", "rectangle", "square"]);
        let (_, square) = TEST_RULES.variants().last().expect("square");
        assert_eq!(square.required, &["width", "rounded"]);
    }

    #[test]
    fn only_non_empty_classes_produce_errors() {
        let mut r = record(json!({"radius": 1, "width": 2}));
        let errors = check("circle", &mut r, &TEST_RULES)
            .unwrap_err()
            .into_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::ForbiddenForVariant { .. }));
    }
}
