use std::num::NonZeroU32;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::naming::{Variant, to_snake};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Zero,
    Fixed,
    FixedLifecycle,
}

impl Variant for Strategy {
    const ALL: &'static [Self] = &[Self::Zero, Self::Fixed, Self::FixedLifecycle];

    fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Fixed => "fixed",
            Self::FixedLifecycle => "fixed_lifecycle",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Statistical,
    Parametric,
    Bootstrap,
}

impl Variant for ModelType {
    const ALL: &'static [Self] = &[Self::Statistical, Self::Parametric, Self::Bootstrap];

    fn as_str(self) -> &'static str {
        match self {
            Self::Statistical => "statistical",
            Self::Parametric => "parametric",
            Self::Bootstrap => "bootstrap",
        }
    }
}

/// Historical return data set. `Global` and `Usa` are built in; anything
/// else (a ticker such as `vfinx`) is carried through lowercased.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReturnsSource {
    Global,
    Usa,
    Other(String),
}

impl ReturnsSource {
    pub fn from_token(token: &str) -> Self {
        match to_snake(token).as_str() {
            "global" => Self::Global,
            "usa" => Self::Usa,
            _ => Self::Other(token.trim().to_lowercase()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::Usa => "usa",
            Self::Other(id) => id.as_str(),
        }
    }
}

impl Serialize for ReturnsSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Contribution and withdrawal schedule. Each variant carries exactly the
/// fields its strategy requires.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(
    tag = "strategy",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum CashFlowConfig {
    Zero,
    Fixed {
        contribution: f64,
    },
    FixedLifecycle {
        contribution: f64,
        withdrawal: f64,
        months_to_retirement: u32,
    },
}

impl CashFlowConfig {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Zero => Strategy::Zero,
            Self::Fixed { .. } => Strategy::Fixed,
            Self::FixedLifecycle { .. } => Strategy::FixedLifecycle,
        }
    }

    pub fn contribution(&self) -> Option<f64> {
        match self {
            Self::Zero => None,
            Self::Fixed { contribution } | Self::FixedLifecycle { contribution, .. } => {
                Some(*contribution)
            }
        }
    }

    pub fn withdrawal(&self) -> Option<f64> {
        match self {
            Self::FixedLifecycle { withdrawal, .. } => Some(*withdrawal),
            _ => None,
        }
    }

    pub fn months_to_retirement(&self) -> Option<u32> {
        match self {
            Self::FixedLifecycle {
                months_to_retirement,
                ..
            } => Some(*months_to_retirement),
            _ => None,
        }
    }
}

/// Statistical return model. Parametric models carry their moments; the two
/// history-driven models carry a source and an optional, inclusive window of
/// historical dates to draw from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(
    tag = "modelType",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ReturnModelConfig {
    Statistical {
        returns_source: ReturnsSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
    },
    Parametric {
        nominal_expected_return: f64,
        nominal_standard_deviation: f64,
        real_expected_return: f64,
        real_standard_deviation: f64,
    },
    Bootstrap {
        returns_source: ReturnsSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_date: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
        block_size: NonZeroU32,
        circular: bool,
    },
}

impl ReturnModelConfig {
    pub fn model_type(&self) -> ModelType {
        match self {
            Self::Statistical { .. } => ModelType::Statistical,
            Self::Parametric { .. } => ModelType::Parametric,
            Self::Bootstrap { .. } => ModelType::Bootstrap,
        }
    }

    pub fn returns_source(&self) -> Option<&ReturnsSource> {
        match self {
            Self::Statistical { returns_source, .. } | Self::Bootstrap { returns_source, .. } => {
                Some(returns_source)
            }
            Self::Parametric { .. } => None,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Statistical { start_date, .. } | Self::Bootstrap { start_date, .. } => {
                *start_date
            }
            Self::Parametric { .. } => None,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Statistical { end_date, .. } | Self::Bootstrap { end_date, .. } => *end_date,
            Self::Parametric { .. } => None,
        }
    }

    pub fn block_size(&self) -> Option<NonZeroU32> {
        match self {
            Self::Bootstrap { block_size, .. } => Some(*block_size),
            _ => None,
        }
    }

    pub fn circular(&self) -> Option<bool> {
        match self {
            Self::Bootstrap { circular, .. } => Some(*circular),
            _ => None,
        }
    }

    /// `(expected, standard deviation)` of nominal returns.
    pub fn nominal_moments(&self) -> Option<(f64, f64)> {
        match self {
            Self::Parametric {
                nominal_expected_return,
                nominal_standard_deviation,
                ..
            } => Some((*nominal_expected_return, *nominal_standard_deviation)),
            _ => None,
        }
    }

    /// `(expected, standard deviation)` of real returns.
    pub fn real_moments(&self) -> Option<(f64, f64)> {
        match self {
            Self::Parametric {
                real_expected_return,
                real_standard_deviation,
                ..
            } => Some((*real_expected_return, *real_standard_deviation)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InitialBalances {
    /// Every path starts from the same balance.
    Uniform(f64),
    /// One starting balance per path.
    PerPath(Vec<f64>),
}

impl InitialBalances {
    pub fn for_path(&self, path: usize) -> Option<f64> {
        match self {
            Self::Uniform(balance) => Some(*balance),
            Self::PerPath(balances) => balances.get(path).copied(),
        }
    }
}

/// A fully validated simulation request. Only the validator constructs one,
/// so every invariant on ranges, balances and percentiles holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub(crate) num_steps: u32,
    pub(crate) num_paths: u32,
    pub(crate) initial_balances: InitialBalances,
    pub(crate) percentiles: Vec<u8>,
    pub(crate) return_model: ReturnModelConfig,
    pub(crate) cash_flow_strategy: CashFlowConfig,
}

impl SimulationConfig {
    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    pub fn num_paths(&self) -> u32 {
        self.num_paths
    }

    pub fn initial_balances(&self) -> &InitialBalances {
        &self.initial_balances
    }

    /// Ascending, without duplicates.
    pub fn percentiles(&self) -> &[u8] {
        &self.percentiles
    }

    pub fn return_model(&self) -> &ReturnModelConfig {
        &self.return_model
    }

    pub fn cash_flow_strategy(&self) -> &CashFlowConfig {
        &self.cash_flow_strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_source_matches_builtins_case_insensitively() {
        assert_eq!(ReturnsSource::from_token("USA"), ReturnsSource::Usa);
        assert_eq!(ReturnsSource::from_token("Global"), ReturnsSource::Global);
        assert_eq!(
            ReturnsSource::from_token("VFINX"),
            ReturnsSource::Other("vfinx".to_string())
        );
    }

    #[test]
    fn tokens_split_into_other_words_do_not_match() {
        assert_eq!(Strategy::from_token("f_i_x_e_d"), None);
        assert_eq!(Strategy::from_token("fixedlifecycle"), None);
        assert_eq!(ModelType::from_token("Boot-Strap"), None);
        assert_eq!(
            ReturnsSource::from_token("U_S_A"),
            ReturnsSource::Other("u_s_a".to_string())
        );
    }

    #[test]
    fn strategy_tokens_accept_both_spellings() {
        assert_eq!(Strategy::from_token("fixedLifecycle"), Some(Strategy::FixedLifecycle));
        assert_eq!(Strategy::from_token("FIXED_LIFECYCLE"), Some(Strategy::FixedLifecycle));
        assert_eq!(Strategy::from_token("fixed-lifecycle"), Some(Strategy::FixedLifecycle));
        assert_eq!(Strategy::from_token("invalid_strategy"), None);
        assert_eq!(Strategy::FixedLifecycle.public_name(), "fixedLifecycle");
    }

    #[test]
    fn cash_flow_serializes_with_canonical_strategy() {
        let config = CashFlowConfig::FixedLifecycle {
            contribution: 500.0,
            withdrawal: -400.0,
            months_to_retirement: 32,
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "strategy": "fixed_lifecycle",
                "contribution": 500.0,
                "withdrawal": -400.0,
                "monthsToRetirement": 32
            })
        );
        assert_eq!(
            serde_json::to_value(CashFlowConfig::Zero).unwrap(),
            json!({"strategy": "zero"})
        );
    }

    #[test]
    fn bootstrap_serializes_flat_with_resolved_defaults() {
        let config = ReturnModelConfig::Bootstrap {
            returns_source: ReturnsSource::Other("vfinx".to_string()),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            end_date: None,
            block_size: NonZeroU32::MIN,
            circular: true,
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "modelType": "bootstrap",
                "returnsSource": "vfinx",
                "startDate": "2000-01-01",
                "blockSize": 1,
                "circular": true
            })
        );
    }

    #[test]
    fn flat_accessors_reflect_the_variant() {
        let parametric = ReturnModelConfig::Parametric {
            nominal_expected_return: 0.07,
            nominal_standard_deviation: 0.15,
            real_expected_return: 0.05,
            real_standard_deviation: 0.1,
        };
        assert_eq!(parametric.model_type(), ModelType::Parametric);
        assert_eq!(parametric.nominal_moments(), Some((0.07, 0.15)));
        assert_eq!(parametric.returns_source(), None);
        assert_eq!(parametric.block_size(), None);
        assert_eq!(parametric.start_date(), None);

        let fixed = CashFlowConfig::Fixed {
            contribution: 500.0,
        };
        assert_eq!(fixed.strategy(), Strategy::Fixed);
        assert_eq!(fixed.contribution(), Some(500.0));
        assert_eq!(fixed.withdrawal(), None);
    }

    #[test]
    fn per_path_balances_index_by_path() {
        let balances = InitialBalances::PerPath(vec![1.0, 2.0]);
        assert_eq!(balances.for_path(1), Some(2.0));
        assert_eq!(balances.for_path(2), None);
        assert_eq!(InitialBalances::Uniform(5.0).for_path(99), Some(5.0));
    }
}
