use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde_json::Value;

use super::error::ValidationError;
use super::naming::{Variant, to_camel};
use super::record::{Record, json_type};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Coerces `name` from `record` when present; absent fields stay `None`.
pub(crate) fn optional<T>(
    record: &Record,
    name: &str,
    coerce: impl FnOnce(&str, &Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    record
        .get(name)
        .map(|value| coerce(&to_camel(name), value))
        .transpose()
}

pub(crate) fn required<T>(
    record: &Record,
    name: &str,
    coerce: impl FnOnce(&str, &Value) -> Result<T, ValidationError>,
) -> Result<T, ValidationError> {
    optional(record, name, coerce)?.ok_or_else(|| ValidationError::missing(to_camel(name)))
}

/// Reads a discriminator, matching its token case-insensitively.
pub(crate) fn variant<V: Variant>(record: &Record, name: &str) -> Result<V, ValidationError> {
    required(record, name, |field, value| {
        let token = string(field, value)?;
        V::from_token(token).ok_or_else(|| ValidationError::UnknownVariant {
            field: field.to_string(),
            value: token.to_string(),
            expected: V::public_names(),
        })
    })
}

pub(crate) fn string<'a>(field: &str, value: &'a Value) -> Result<&'a str, ValidationError> {
    match value {
        Value::String(s) => Ok(s.as_str()),
        other => Err(ValidationError::type_coercion(
            field,
            format!("expected a string, got {}", json_type(other)),
        )),
    }
}

pub(crate) fn decimal(field: &str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => {
            return Err(ValidationError::type_coercion(
                field,
                format!("expected a number, got {}", json_type(other)),
            ));
        }
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::type_coercion(
            field,
            format!("{value} is not a valid finite number"),
        )),
    }
}

pub(crate) fn non_negative_decimal(field: &str, value: &Value) -> Result<f64, ValidationError> {
    let v = decimal(field, value)?;
    if v < 0.0 {
        return Err(ValidationError::type_coercion(
            field,
            format!("must be greater than or equal to 0, got {v}"),
        ));
    }
    Ok(v)
}

/// Whole numbers only; `17`, `17.0` and `"17.0"` are all accepted. Whole
/// numbers beyond the `i64` range saturate at its bounds so callers report
/// them as out of range rather than malformed.
pub(crate) fn integer(field: &str, value: &Value) -> Result<i64, ValidationError> {
    let not_whole = || {
        ValidationError::type_coercion(field, format!("{value} is not a valid whole number"))
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().and_then(whole))
            .ok_or_else(not_whole),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => Ok(v),
                Err(_) => s.parse::<f64>().ok().and_then(whole).ok_or_else(not_whole),
            }
        }
        other => Err(ValidationError::type_coercion(
            field,
            format!("expected an integer, got {}", json_type(other)),
        )),
    }
}

fn whole(v: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

pub(crate) fn non_negative_u32(field: &str, value: &Value) -> Result<u32, ValidationError> {
    let v = integer(field, value)?;
    if v < 0 {
        return Err(ValidationError::type_coercion(
            field,
            format!("must be greater than or equal to 0, got {v}"),
        ));
    }
    u32::try_from(v)
        .map_err(|_| ValidationError::type_coercion(field, format!("{v} is too large")))
}

pub(crate) fn positive_u32(field: &str, value: &Value) -> Result<NonZeroU32, ValidationError> {
    let v = integer(field, value)?;
    if v < 1 {
        return Err(ValidationError::type_coercion(
            field,
            format!("must be greater than or equal to 1, got {v}"),
        ));
    }
    u32::try_from(v)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| ValidationError::type_coercion(field, format!("{v} is too large")))
}

pub(crate) fn boolean(field: &str, value: &Value) -> Result<bool, ValidationError> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| {
        ValidationError::type_coercion(field, format!("{value} is not a valid boolean"))
    })
}

/// ISO calendar date, `YYYY-MM-DD`.
pub(crate) fn date(field: &str, value: &Value) -> Result<NaiveDate, ValidationError> {
    let s = string(field, value)?;
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
        ValidationError::type_coercion(field, format!("'{s}' is not a valid YYYY-MM-DD date: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        assert_eq!(decimal("contribution", &json!(500)).unwrap(), 500.0);
        assert_eq!(decimal("contribution", &json!("500.0")).unwrap(), 500.0);
        assert_eq!(decimal("withdrawal", &json!(-400)).unwrap(), -400.0);
    }

    #[test]
    fn decimal_rejects_booleans_text_and_non_finite() {
        assert!(decimal("contribution", &json!(true)).is_err());
        assert!(decimal("contribution", &json!("lots")).is_err());
        assert!(decimal("contribution", &json!("inf")).is_err());
        assert!(decimal("contribution", &json!("NaN")).is_err());
    }

    #[test]
    fn integer_accepts_whole_floats_and_strings() {
        assert_eq!(integer("blockSize", &json!(17)).unwrap(), 17);
        assert_eq!(integer("blockSize", &json!(17.0)).unwrap(), 17);
        assert_eq!(integer("blockSize", &json!("17.0")).unwrap(), 17);
        assert_eq!(integer("blockSize", &json!(" 17 ")).unwrap(), 17);
    }

    #[test]
    fn integer_saturates_whole_numbers_beyond_i64() {
        assert_eq!(integer("numSteps", &json!(u64::MAX)).unwrap(), i64::MAX);
        assert_eq!(integer("numSteps", &json!(1e300)).unwrap(), i64::MAX);
        assert_eq!(integer("numSteps", &json!(-1e300)).unwrap(), i64::MIN);
        assert_eq!(integer("numSteps", &json!("1e300")).unwrap(), i64::MAX);
    }

    #[test]
    fn integer_rejects_fractions() {
        let err = integer("numSteps", &json!(12.5)).unwrap_err();
        assert_eq!(err.fields(), vec!["numSteps"]);
        assert!(integer("numSteps", &json!("12.5")).is_err());
        assert!(integer("numSteps", &json!([12])).is_err());
    }

    #[test]
    fn non_negative_u32_rejects_negative() {
        assert_eq!(non_negative_u32("monthsToRetirement", &json!(0)).unwrap(), 0);
        let err = non_negative_u32("monthsToRetirement", &json!(-1)).unwrap_err();
        assert!(err.to_string().starts_with("monthsToRetirement"));
    }

    #[test]
    fn positive_u32_rejects_zero() {
        assert_eq!(positive_u32("blockSize", &json!(1)).unwrap().get(), 1);
        assert!(positive_u32("blockSize", &json!(0)).is_err());
        assert!(positive_u32("blockSize", &json!(-3)).is_err());
    }

    #[test]
    fn boolean_accepts_lax_spellings() {
        assert!(!boolean("circular", &json!("false")).unwrap());
        assert!(!boolean("circular", &json!("FALSE")).unwrap());
        assert!(boolean("circular", &json!("yes")).unwrap());
        assert!(boolean("circular", &json!(1)).unwrap());
        assert!(boolean("circular", &json!(2)).is_err());
        assert!(boolean("circular", &json!("maybe")).is_err());
    }

    #[test]
    fn date_requires_full_iso_date() {
        assert_eq!(
            date("startDate", &json!("2004-09-01")).unwrap(),
            NaiveDate::from_ymd_opt(2004, 9, 1).unwrap()
        );
        let err = date("endDate", &json!("2007")).unwrap_err();
        assert_eq!(err.fields(), vec!["endDate"]);
        assert!(date("endDate", &json!(2007)).is_err());
    }
}
