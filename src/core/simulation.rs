use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::cash_flow::{present, validate_cash_flow};
use super::coerce;
use super::error::{ROOT_PATH, ValidationError, ValidationErrors};
use super::naming::{Variant, to_camel};
use super::record::{Record, json_type};
use super::return_model::validate_return_model;
use super::types::{InitialBalances, SimulationConfig};

pub const MIN_STEPS: i64 = 12;
pub const MAX_STEPS: i64 = 12 * 100;
pub const MIN_PATHS: i64 = 100;
pub const MAX_PATHS: i64 = 1_000_000;

const NUM_STEPS: &str = "num_steps";
const NUM_PATHS: &str = "num_paths";
const INITIAL_BALANCES: &str = "initial_balances";
const PERCENTILES: &str = "percentiles";
const RETURN_MODEL: &str = "return_model";
const CASH_FLOW_STRATEGY: &str = "cash_flow_strategy";

const KNOWN_FIELDS: &[&str] = &[
    NUM_STEPS,
    NUM_PATHS,
    INITIAL_BALANCES,
    PERCENTILES,
    RETURN_MODEL,
    CASH_FLOW_STRATEGY,
];

/// Parses a request body, reporting malformed JSON as a type failure of the
/// whole payload.
pub fn parse_payload(body: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(body).map_err(|e| {
        ValidationError::type_coercion(ROOT_PATH, format!("invalid JSON payload: {e}"))
    })
}

/// Validates a full simulation request.
///
/// Every independent check runs; on failure the returned list holds all of
/// them, nested failures prefixed with `returnModel.` / `cashFlowStrategy.`.
pub fn validate_simulation(raw: &Value) -> Result<SimulationConfig, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let record = Record::from_value(raw, &mut errors)?;

    let num_steps = errors.record(coerce::required(&record, NUM_STEPS, |field, value| {
        bounded(field, value, MIN_STEPS, MAX_STEPS)
    }));

    // The count comparison only needs a whole number, so an out-of-range
    // path count still gets its balances checked against it.
    let raw_num_paths = errors.record(coerce::required(&record, NUM_PATHS, coerce::integer));
    let num_paths = raw_num_paths
        .zip(record.get(NUM_PATHS))
        .and_then(|(value, supplied)| {
            errors.record(in_range(
                &to_camel(NUM_PATHS),
                value,
                supplied,
                MIN_PATHS,
                MAX_PATHS,
            ))
        });

    let initial_balances = field(&record, INITIAL_BALANCES, &mut errors, parse_initial_balances);
    if let (Some(InitialBalances::PerPath(balances)), Some(expected)) =
        (&initial_balances, raw_num_paths)
    {
        if i64::try_from(balances.len()).map_or(true, |len| len != expected) {
            errors.push(ValidationError::BalanceCountMismatch {
                field: to_camel(INITIAL_BALANCES),
                num_paths_field: to_camel(NUM_PATHS),
                balances: balances.len(),
                num_paths: expected,
            });
        }
    }

    let percentiles = field(&record, PERCENTILES, &mut errors, parse_percentiles);

    let return_model = field(&record, RETURN_MODEL, &mut errors, |path, value| {
        validate_return_model(value).map_err(|nested| nested.nest(path))
    });
    let cash_flow_strategy = field(&record, CASH_FLOW_STRATEGY, &mut errors, |path, value| {
        validate_cash_flow(value).map_err(|nested| nested.nest(path))
    });

    record.log_unknown(KNOWN_FIELDS);

    if !errors.is_empty() {
        debug!(errors = errors.len(), "simulation config rejected");
        return Err(errors);
    }

    let config = SimulationConfig {
        num_steps: present(num_steps, NUM_STEPS)?,
        num_paths: present(num_paths, NUM_PATHS)?,
        initial_balances: present(initial_balances, INITIAL_BALANCES)?,
        percentiles: present(percentiles, PERCENTILES)?,
        return_model: present(return_model, RETURN_MODEL)?,
        cash_flow_strategy: present(cash_flow_strategy, CASH_FLOW_STRATEGY)?,
    };
    debug!(
        num_steps = config.num_steps,
        num_paths = config.num_paths,
        model_type = config.return_model.model_type().as_str(),
        "simulation config accepted"
    );
    Ok(config)
}

/// Parses and validates a request body in one step.
pub fn validate_simulation_str(body: &str) -> Result<SimulationConfig, ValidationErrors> {
    let raw = parse_payload(body)?;
    validate_simulation(&raw)
}

/// Runs `check` on a required field, recording a missing field or its
/// failures in `errors`.
fn field<T>(
    record: &Record,
    name: &str,
    errors: &mut ValidationErrors,
    check: impl FnOnce(&str, &Value) -> Result<T, ValidationErrors>,
) -> Option<T> {
    let path = to_camel(name);
    let Some(value) = record.get(name) else {
        errors.push(ValidationError::missing(path));
        return None;
    };
    errors.absorb(check(&path, value))
}

/// `supplied` is the value as sent, shown in the failure message.
fn in_range(
    field: &str,
    value: i64,
    supplied: &Value,
    min: i64,
    max: i64,
) -> Result<u32, ValidationError> {
    if !(min..=max).contains(&value) {
        let shown = match supplied {
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        return Err(ValidationError::Range {
            field: field.to_string(),
            value: shown,
            min,
            max,
        });
    }
    u32::try_from(value).map_err(|_| ValidationError::type_coercion(field, "out of range"))
}

fn bounded(field: &str, value: &Value, min: i64, max: i64) -> Result<u32, ValidationError> {
    in_range(field, coerce::integer(field, value)?, value, min, max)
}

fn parse_initial_balances(field: &str, value: &Value) -> Result<InitialBalances, ValidationErrors> {
    let Value::Array(items) = value else {
        let balance = coerce::decimal(field, value)?;
        if balance < 0.0 {
            return Err(ValidationError::NegativeBalance {
                field: field.to_string(),
                count: 1,
                first_index: None,
            }
            .into());
        }
        return Ok(InitialBalances::Uniform(balance));
    };

    let mut balances = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        balances.push(coerce::decimal(&format!("{field}[{index}]"), item)?);
    }

    let first_index = balances.iter().position(|b| *b < 0.0);
    if let Some(first) = first_index {
        return Err(ValidationError::NegativeBalance {
            field: field.to_string(),
            count: balances.iter().filter(|b| **b < 0.0).count(),
            first_index: Some(first),
        }
        .into());
    }
    Ok(InitialBalances::PerPath(balances))
}

/// Returns the percentiles sorted ascending. Range and uniqueness are checked
/// independently so both can be reported at once.
fn parse_percentiles(field: &str, value: &Value) -> Result<Vec<u8>, ValidationErrors> {
    let Value::Array(items) = value else {
        return Err(ValidationError::type_coercion(
            field,
            format!("expected an array of integers, got {}", json_type(value)),
        )
        .into());
    };

    let mut errors = ValidationErrors::new();
    let values: Vec<i64> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            errors.record(coerce::integer(&format!("{field}[{index}]"), item))
        })
        .collect();

    let out_of_range: Vec<i64> = values
        .iter()
        .copied()
        .filter(|p| !(1..100).contains(p))
        .collect();
    if !out_of_range.is_empty() {
        errors.push(ValidationError::PercentileOutOfRange {
            field: field.to_string(),
            values: out_of_range,
        });
    }

    let mut seen = BTreeSet::new();
    let repeated: BTreeSet<i64> = values.iter().copied().filter(|p| !seen.insert(*p)).collect();
    if !repeated.is_empty() {
        errors.push(ValidationError::DuplicatePercentile {
            field: field.to_string(),
            values: repeated.into_iter().collect(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut sorted: Vec<u8> = values
        .into_iter()
        .filter_map(|p| u8::try_from(p).ok())
        .collect();
    sorted.sort_unstable();
    Ok(sorted)
}
