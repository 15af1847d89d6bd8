use serde_json::Value;
use tracing::debug;

use super::cash_flow::present;
use super::coerce;
use super::error::{ValidationError, ValidationErrors};
use super::field_set::{self, FieldDefault, FieldRule, RuleTable};
use super::naming::{Variant, to_camel};
use super::record::Record;
use super::types::{ModelType, ReturnModelConfig, ReturnsSource};

const MODEL_TYPE: &str = "model_type";
const NOMINAL_EXPECTED_RETURN: &str = "nominal_expected_return";
const NOMINAL_STANDARD_DEVIATION: &str = "nominal_standard_deviation";
const REAL_EXPECTED_RETURN: &str = "real_expected_return";
const REAL_STANDARD_DEVIATION: &str = "real_standard_deviation";
const RETURNS_SOURCE: &str = "returns_source";
const START_DATE: &str = "start_date";
const END_DATE: &str = "end_date";
const BLOCK_SIZE: &str = "block_size";
const CIRCULAR: &str = "circular";

const MOMENTS: [&str; 4] = [
    NOMINAL_EXPECTED_RETURN,
    NOMINAL_STANDARD_DEVIATION,
    REAL_EXPECTED_RETURN,
    REAL_STANDARD_DEVIATION,
];

const KNOWN_FIELDS: &[&str] = &[
    MODEL_TYPE,
    NOMINAL_EXPECTED_RETURN,
    NOMINAL_STANDARD_DEVIATION,
    REAL_EXPECTED_RETURN,
    REAL_STANDARD_DEVIATION,
    RETURNS_SOURCE,
    START_DATE,
    END_DATE,
    BLOCK_SIZE,
    CIRCULAR,
];

pub const DEFAULT_BLOCK_SIZE: u64 = 1;
pub const DEFAULT_CIRCULAR: bool = true;

pub static RETURN_MODEL_RULES: RuleTable = RuleTable::new(
    MODEL_TYPE,
    &[
        (
            "parametric",
            FieldRule {
                required: &MOMENTS,
                forbidden: &[RETURNS_SOURCE, START_DATE, END_DATE, BLOCK_SIZE, CIRCULAR],
                defaults: &[],
            },
        ),
        (
            "statistical",
            FieldRule {
                required: &[RETURNS_SOURCE],
                forbidden: &[
                    NOMINAL_EXPECTED_RETURN,
                    NOMINAL_STANDARD_DEVIATION,
                    REAL_EXPECTED_RETURN,
                    REAL_STANDARD_DEVIATION,
                    BLOCK_SIZE,
                    CIRCULAR,
                ],
                defaults: &[],
            },
        ),
        (
            "bootstrap",
            FieldRule {
                required: &[RETURNS_SOURCE],
                forbidden: &MOMENTS,
                defaults: &[
                    (BLOCK_SIZE, FieldDefault::Integer(DEFAULT_BLOCK_SIZE)),
                    (CIRCULAR, FieldDefault::Boolean(DEFAULT_CIRCULAR)),
                ],
            },
        ),
    ],
);

fn returns_source(field: &str, value: &Value) -> Result<ReturnsSource, ValidationError> {
    let token = coerce::string(field, value)?;
    if token.trim().is_empty() {
        return Err(ValidationError::type_coercion(field, "must not be empty"));
    }
    Ok(ReturnsSource::from_token(token))
}

/// Validates a return-model object, reporting every failure it finds.
///
/// Bootstrap models get `blockSize = 1` and `circular = true` when those
/// fields are absent. `returnsSource` is never rejected for being an
/// unrecognized identifier, only for being absent where it is required.
pub fn validate_return_model(raw: &Value) -> Result<ReturnModelConfig, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut record = Record::from_value(raw, &mut errors)?;

    let model_type = errors.record(coerce::variant::<ModelType>(&record, MODEL_TYPE));
    if let Some(model_type) = model_type {
        if let Err(violation) =
            field_set::check(model_type.as_str(), &mut record, &RETURN_MODEL_RULES)
        {
            errors.extend(violation.into_errors());
        }
    }

    let mut decimal = |name: &str, coerce_fn: fn(&str, &Value) -> Result<f64, ValidationError>| {
        errors.record(coerce::optional(&record, name, coerce_fn)).flatten()
    };
    let nominal_expected_return = decimal(NOMINAL_EXPECTED_RETURN, coerce::decimal);
    let nominal_standard_deviation =
        decimal(NOMINAL_STANDARD_DEVIATION, coerce::non_negative_decimal);
    let real_expected_return = decimal(REAL_EXPECTED_RETURN, coerce::decimal);
    let real_standard_deviation = decimal(REAL_STANDARD_DEVIATION, coerce::non_negative_decimal);

    let returns_source = errors
        .record(coerce::optional(&record, RETURNS_SOURCE, returns_source))
        .flatten();
    let start_date = errors
        .record(coerce::optional(&record, START_DATE, coerce::date))
        .flatten();
    let end_date = errors
        .record(coerce::optional(&record, END_DATE, coerce::date))
        .flatten();
    let block_size = errors
        .record(coerce::optional(&record, BLOCK_SIZE, coerce::positive_u32))
        .flatten();
    let circular = errors
        .record(coerce::optional(&record, CIRCULAR, coerce::boolean))
        .flatten();

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            errors.push(ValidationError::DateRangeInverted {
                start_field: to_camel(START_DATE),
                end_field: to_camel(END_DATE),
                start,
                end,
            });
        }
    }

    record.log_unknown(KNOWN_FIELDS);

    if !errors.is_empty() {
        debug!(errors = errors.len(), "return model config rejected");
        return Err(errors);
    }

    let config = match model_type {
        Some(ModelType::Parametric) => ReturnModelConfig::Parametric {
            nominal_expected_return: present(nominal_expected_return, NOMINAL_EXPECTED_RETURN)?,
            nominal_standard_deviation: present(
                nominal_standard_deviation,
                NOMINAL_STANDARD_DEVIATION,
            )?,
            real_expected_return: present(real_expected_return, REAL_EXPECTED_RETURN)?,
            real_standard_deviation: present(real_standard_deviation, REAL_STANDARD_DEVIATION)?,
        },
        Some(ModelType::Statistical) => ReturnModelConfig::Statistical {
            returns_source: present(returns_source, RETURNS_SOURCE)?,
            start_date,
            end_date,
        },
        Some(ModelType::Bootstrap) => ReturnModelConfig::Bootstrap {
            returns_source: present(returns_source, RETURNS_SOURCE)?,
            start_date,
            end_date,
            block_size: present(block_size, BLOCK_SIZE)?,
            circular: present(circular, CIRCULAR)?,
        },
        None => return Err(ValidationError::missing(to_camel(MODEL_TYPE)).into()),
    };
    Ok(config)
}
