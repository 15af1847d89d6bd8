use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use super::error::{ROOT_PATH, ValidationError, ValidationErrors};
use super::naming::{to_camel, to_snake};

/// A JSON object with every key folded to its canonical snake_case spelling.
///
/// `null` values are dropped so that "absent" has a single representation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Normalizes the keys of `value`, which must be a JSON object.
    ///
    /// Both spellings of a field may be supplied as long as they agree. A
    /// disagreement is pushed to `errors` and the first spelling is kept, so
    /// the rest of the object is still checked.
    pub fn from_value(
        value: &Value,
        errors: &mut ValidationErrors,
    ) -> Result<Self, ValidationError> {
        let Value::Object(object) = value else {
            return Err(ValidationError::type_coercion(
                ROOT_PATH,
                format!("expected a JSON object, got {}", json_type(value)),
            ));
        };

        let mut spellings: BTreeMap<String, &str> = BTreeMap::new();
        let mut fields = BTreeMap::new();
        for (key, value) in object {
            if value.is_null() {
                continue;
            }
            let canonical = to_snake(key);
            if let Some(existing) = fields.get(&canonical) {
                if existing != value {
                    let first = spellings.get(&canonical).copied().unwrap_or(key.as_str());
                    errors.push(ValidationError::ConflictingAliases {
                        field: first.to_string(),
                        alias: key.clone(),
                    });
                }
                continue;
            }
            spellings.insert(canonical.clone(), key.as_str());
            fields.insert(canonical, value.clone());
        }

        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Inserts `value` under `name` unless the field is already present.
    pub fn set_default(&mut self, name: &str, value: Value) -> bool {
        if self.is_present(name) {
            return false;
        }
        self.fields.insert(name.to_string(), value);
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Logs every key that is not one of `known`; unknown keys are ignored.
    pub fn log_unknown(&self, known: &[&str]) {
        for key in self.keys().filter(|key| !known.contains(key)) {
            debug!(field = %to_camel(key), "ignoring unknown field");
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(value: Value) -> Record {
        let mut errors = ValidationErrors::new();
        let record = Record::from_value(&value, &mut errors).expect("record");
        assert!(errors.is_empty(), "{errors}");
        record
    }

    #[test]
    fn folds_public_and_internal_spellings_to_one_key() {
        let public = clean(json!({"monthsToRetirement": 32}));
        let internal = clean(json!({"months_to_retirement": 32}));
        assert_eq!(public, internal);
        assert_eq!(public.get("months_to_retirement"), Some(&json!(32)));
    }

    #[test]
    fn null_is_absent() {
        let record = clean(json!({"contribution": null}));
        assert!(!record.is_present("contribution"));
    }

    #[test]
    fn agreeing_aliases_are_accepted() {
        let record = clean(json!({"blockSize": 3, "block_size": 3}));
        assert_eq!(record.get("block_size"), Some(&json!(3)));
    }

    #[test]
    fn conflicting_aliases_are_recorded_and_folding_continues() {
        let mut errors = ValidationErrors::new();
        let record = Record::from_value(
            &json!({"blockSize": 3, "block_size": 4, "circular": false}),
            &mut errors,
        )
        .expect("record");
        assert_eq!(errors.len(), 1);
        let err = errors.iter().next().expect("conflict");
        assert!(matches!(err, ValidationError::ConflictingAliases { .. }));
        assert!(err.fields().contains(&"blockSize"));
        assert!(err.fields().contains(&"block_size"));
        assert_eq!(record.get("block_size"), Some(&json!(3)));
        assert_eq!(record.get("circular"), Some(&json!(false)));
    }

    #[test]
    fn non_object_is_a_type_error() {
        let err = Record::from_value(&json!([1, 2]), &mut ValidationErrors::new())
            .expect_err("array");
        assert_eq!(err.fields(), vec![ROOT_PATH]);
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn set_default_only_fills_absent_fields() {
        let mut record = clean(json!({"circular": false}));
        assert!(!record.set_default("circular", json!(true)));
        assert!(record.set_default("block_size", json!(1)));
        assert_eq!(record.get("circular"), Some(&json!(false)));
        assert_eq!(record.get("block_size"), Some(&json!(1)));
    }
}
