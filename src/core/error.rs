use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Path used for failures that concern the whole payload rather than a field.
pub const ROOT_PATH: &str = "$";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    TypeCoercion,
    UnknownVariant,
    VariantConstraintViolation,
    RangeViolation,
    NegativeBalance,
    BalanceCountMismatch,
    PercentileOutOfRange,
    DuplicatePercentile,
    DateRangeInverted,
    MissingField,
    ConflictingAliases,
}

/// A single validation failure. Every field path uses the public camelCase
/// spelling, dotted for nested objects (`returnModel.blockSize`).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    TypeCoercion { field: String, reason: String },

    #[error("{field}: '{value}' is not one of {}", .expected.join(", "))]
    UnknownVariant {
        field: String,
        value: String,
        expected: Vec<String>,
    },

    #[error("{} is required when {discriminator} is {variant}", .fields.join(", "))]
    MissingForVariant {
        discriminator: String,
        variant: String,
        fields: Vec<String>,
    },

    #[error("{} must be absent when {discriminator} is {variant}", .fields.join(", "))]
    ForbiddenForVariant {
        discriminator: String,
        variant: String,
        fields: Vec<String>,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    Range {
        field: String,
        value: String,
        min: i64,
        max: i64,
    },

    #[error("{field} must be greater than or equal to 0{}", negative_note(.count, .first_index))]
    NegativeBalance {
        field: String,
        count: usize,
        first_index: Option<usize>,
    },

    #[error("{field} has {balances} entries but {num_paths_field} is {num_paths}")]
    BalanceCountMismatch {
        field: String,
        num_paths_field: String,
        balances: usize,
        num_paths: i64,
    },

    #[error("each value in {field} must be greater than 0 and less than 100, got {}", join_values(.values))]
    PercentileOutOfRange { field: String, values: Vec<i64> },

    #[error("{field} must be unique, repeated {}", join_values(.values))]
    DuplicatePercentile { field: String, values: Vec<i64> },

    #[error("'{start_field}' cannot be after '{end_field}' ({start} > {end})")]
    DateRangeInverted {
        start_field: String,
        end_field: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("{field} is required")]
    MissingField { field: String },

    #[error("{field} and {alias} name the same field with different values")]
    ConflictingAliases { field: String, alias: String },
}

fn negative_note(count: &usize, first_index: &Option<usize>) -> String {
    match first_index {
        Some(index) => format!(" ({count} negative, first at index {index})"),
        None => String::new(),
    }
}

fn join_values(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn type_coercion(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeCoercion {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            Self::UnknownVariant { .. } => ErrorKind::UnknownVariant,
            Self::MissingForVariant { .. } | Self::ForbiddenForVariant { .. } => {
                ErrorKind::VariantConstraintViolation
            }
            Self::Range { .. } => ErrorKind::RangeViolation,
            Self::NegativeBalance { .. } => ErrorKind::NegativeBalance,
            Self::BalanceCountMismatch { .. } => ErrorKind::BalanceCountMismatch,
            Self::PercentileOutOfRange { .. } => ErrorKind::PercentileOutOfRange,
            Self::DuplicatePercentile { .. } => ErrorKind::DuplicatePercentile,
            Self::DateRangeInverted { .. } => ErrorKind::DateRangeInverted,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::ConflictingAliases { .. } => ErrorKind::ConflictingAliases,
        }
    }

    /// Public paths of every field this failure names.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::TypeCoercion { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::Range { field, .. }
            | Self::NegativeBalance { field, .. }
            | Self::PercentileOutOfRange { field, .. }
            | Self::DuplicatePercentile { field, .. }
            | Self::MissingField { field } => vec![field.as_str()],
            Self::MissingForVariant { fields, .. } | Self::ForbiddenForVariant { fields, .. } => {
                fields.iter().map(String::as_str).collect()
            }
            Self::BalanceCountMismatch {
                field,
                num_paths_field,
                ..
            } => vec![field.as_str(), num_paths_field.as_str()],
            Self::DateRangeInverted {
                start_field,
                end_field,
                ..
            } => vec![start_field.as_str(), end_field.as_str()],
            Self::ConflictingAliases { field, alias } => vec![field.as_str(), alias.as_str()],
        }
    }

    fn paths_mut(&mut self) -> Vec<&mut String> {
        match self {
            Self::TypeCoercion { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::Range { field, .. }
            | Self::NegativeBalance { field, .. }
            | Self::PercentileOutOfRange { field, .. }
            | Self::DuplicatePercentile { field, .. }
            | Self::MissingField { field } => vec![field],
            Self::MissingForVariant {
                discriminator,
                fields,
                ..
            }
            | Self::ForbiddenForVariant {
                discriminator,
                fields,
                ..
            } => std::iter::once(discriminator).chain(fields.iter_mut()).collect(),
            Self::BalanceCountMismatch {
                field,
                num_paths_field,
                ..
            } => vec![field, num_paths_field],
            Self::DateRangeInverted {
                start_field,
                end_field,
                ..
            } => vec![start_field, end_field],
            Self::ConflictingAliases { field, alias } => vec![field, alias],
        }
    }

    /// Re-roots every path of this failure under `prefix`.
    pub fn nest(mut self, prefix: &str) -> Self {
        for path in self.paths_mut() {
            *path = if path.as_str() == ROOT_PATH {
                prefix.to_string()
            } else {
                format!("{prefix}.{path}")
            };
        }
        self
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entry = serializer.serialize_struct("ValidationError", 3)?;
        entry.serialize_field("code", &self.kind())?;
        entry.serialize_field("fields", &self.fields())?;
        entry.serialize_field("message", &self.to_string())?;
        entry.end()
    }
}

/// Every failure found in one validation pass, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Keeps the value on success and records the failure otherwise.
    pub fn record<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    /// Like [`ValidationErrors::record`] for a nested validator's aggregate.
    pub fn absorb<T>(&mut self, result: Result<T, ValidationErrors>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(errors) => {
                self.0.extend(errors.0);
                None
            }
        }
    }

    pub fn nest(self, prefix: &str) -> Self {
        Self(self.0.into_iter().map(|error| error.nest(prefix)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(ValidationError::kind).collect()
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|error| error.kind() == kind)
    }

    /// True when some failure names `field` (a full public path).
    pub fn names(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.fields().contains(&field))
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
