use serde_json::Value;
use tracing::debug;

use super::coerce;
use super::error::{ValidationError, ValidationErrors};
use super::field_set::{self, FieldRule, RuleTable};
use super::naming::{Variant, to_camel};
use super::record::Record;
use super::types::{CashFlowConfig, Strategy};

const STRATEGY: &str = "strategy";
const CONTRIBUTION: &str = "contribution";
const WITHDRAWAL: &str = "withdrawal";
const MONTHS_TO_RETIREMENT: &str = "months_to_retirement";

const KNOWN_FIELDS: &[&str] = &[STRATEGY, CONTRIBUTION, WITHDRAWAL, MONTHS_TO_RETIREMENT];

pub static CASH_FLOW_RULES: RuleTable = RuleTable::new(
    STRATEGY,
    &[
        (
            "zero",
            FieldRule {
                required: &[],
                forbidden: &[CONTRIBUTION, WITHDRAWAL, MONTHS_TO_RETIREMENT],
                defaults: &[],
            },
        ),
        (
            "fixed",
            FieldRule {
                required: &[CONTRIBUTION],
                forbidden: &[WITHDRAWAL, MONTHS_TO_RETIREMENT],
                defaults: &[],
            },
        ),
        (
            "fixed_lifecycle",
            FieldRule {
                required: &[CONTRIBUTION, WITHDRAWAL, MONTHS_TO_RETIREMENT],
                forbidden: &[],
                defaults: &[],
            },
        ),
    ],
);

/// Validates a cash-flow object, reporting every failure it finds.
pub fn validate_cash_flow(raw: &Value) -> Result<CashFlowConfig, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut record = Record::from_value(raw, &mut errors)?;

    let strategy = errors.record(coerce::variant::<Strategy>(&record, STRATEGY));
    if let Some(strategy) = strategy {
        if let Err(violation) = field_set::check(strategy.as_str(), &mut record, &CASH_FLOW_RULES)
        {
            errors.extend(violation.into_errors());
        }
    }

    let contribution = errors
        .record(coerce::optional(&record, CONTRIBUTION, coerce::decimal))
        .flatten();
    let withdrawal = errors
        .record(coerce::optional(&record, WITHDRAWAL, coerce::decimal))
        .flatten();
    let months_to_retirement = errors
        .record(coerce::optional(
            &record,
            MONTHS_TO_RETIREMENT,
            coerce::non_negative_u32,
        ))
        .flatten();

    record.log_unknown(KNOWN_FIELDS);

    if !errors.is_empty() {
        debug!(errors = errors.len(), "cash flow config rejected");
        return Err(errors);
    }

    let config = match strategy {
        Some(Strategy::Zero) => CashFlowConfig::Zero,
        Some(Strategy::Fixed) => CashFlowConfig::Fixed {
            contribution: present(contribution, CONTRIBUTION)?,
        },
        Some(Strategy::FixedLifecycle) => CashFlowConfig::FixedLifecycle {
            contribution: present(contribution, CONTRIBUTION)?,
            withdrawal: present(withdrawal, WITHDRAWAL)?,
            months_to_retirement: present(months_to_retirement, MONTHS_TO_RETIREMENT)?,
        },
        None => return Err(ValidationError::missing(STRATEGY).into()),
    };
    Ok(config)
}

pub(crate) fn present<T>(value: Option<T>, name: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::missing(to_camel(name)))
}
