mod cash_flow;
mod coerce;
mod error;
mod field_set;
mod naming;
mod record;
mod return_model;
mod simulation;
mod types;

pub use cash_flow::{CASH_FLOW_RULES, validate_cash_flow};
pub use error::{ErrorKind, ROOT_PATH, ValidationError, ValidationErrors};
pub use field_set::{FieldDefault, FieldRule, RuleTable, VariantConstraintViolation, check};
pub use naming::{Variant, to_camel, to_snake};
pub use record::Record;
pub use return_model::{
    DEFAULT_BLOCK_SIZE, DEFAULT_CIRCULAR, RETURN_MODEL_RULES, validate_return_model,
};
pub use simulation::{
    MAX_PATHS, MAX_STEPS, MIN_PATHS, MIN_STEPS, parse_payload, validate_simulation,
    validate_simulation_str,
};
pub use types::{
    CashFlowConfig, InitialBalances, ModelType, ReturnModelConfig, ReturnsSource,
    SimulationConfig, Strategy,
};
