//! The configuration of a single rewrite request.
//!
//! A [`Context`] is built by value with the `with_*` methods, then shared by reference for the
//! whole computation. Nothing mutates it once rewriting starts except two pieces of interior
//! state: the [`CancellationToken`], whose flag can be raised from another thread, and the
//! [`OutcomeCache`] that remembers which plans failed on which subexpressions.

pub mod cache;
pub mod resource;
pub mod setting;

pub use cache::OutcomeCache;
pub use resource::{Resource, ResourceData};
pub use setting::{Curriculum, Preset, Setting, SettingKind, SettingValue};

use crate::{
    cancel::CancellationToken,
    error::{Error, InvalidSettingValue},
    primitive::{Decimal, SignedDecimal},
};
use rug::Integer;
use std::collections::HashMap;

/// The smallest number of decimal places results are rounded to.
pub const MIN_PRECISION: u32 = 2;

/// The number of decimal places results are rounded to unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 3;

/// The largest number of decimal places results are rounded to.
pub const MAX_PRECISION: u32 = 10;

/// How a [`WhileStrategiesAvailableFirstOf`] reports the strategies that applied.
///
/// [`WhileStrategiesAvailableFirstOf`]: crate::strategy::WhileStrategiesAvailableFirstOf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategySelectionMode {
    /// Every applicable strategy, the best first and the others as alternatives.
    #[default]
    All,

    /// Only the applicable strategy with the highest priority.
    HighestPriority,

    /// The first strategy that applies, without waiting for better ones.
    First,
}

/// The configuration of a rewrite request.
///
/// Cloning a context gives it an empty [`OutcomeCache`].
#[derive(Debug, Clone, Default)]
pub struct Context {
    curriculum: Option<Curriculum>,
    precision: Option<u32>,
    prefer_decimals: Option<bool>,
    solution_variables: Vec<String>,
    settings: HashMap<Setting, SettingValue>,
    preferred_strategies: HashMap<String, String>,
    strategy_selection_mode: StrategySelectionMode,
    cancellation: CancellationToken,
    outcomes: OutcomeCache,
}

impl Context {
    /// A context with no preferences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tailors the computation to a curriculum.
    pub fn with_curriculum(mut self, curriculum: Curriculum) -> Self {
        self.curriculum = Some(curriculum);
        self
    }

    /// Sets the number of decimal places results are rounded to. Values outside
    /// [`MIN_PRECISION`]`..=`[`MAX_PRECISION`] are clamped.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Declares whether results should be presented as decimals.
    pub fn with_prefer_decimals(mut self, prefer_decimals: bool) -> Self {
        self.prefer_decimals = Some(prefer_decimals);
        self
    }

    /// Declares a variable to solve for.
    pub fn with_solution_variable(mut self, name: impl Into<String>) -> Self {
        self.solution_variables.push(name.into());
        self
    }

    /// Assigns a setting, failing if the value does not belong to the setting's kind.
    pub fn with_setting(mut self, setting: Setting, value: SettingValue) -> Result<Self, Error> {
        let kind = setting.kind();
        if !kind.allows(value) {
            return Err(InvalidSettingValue {
                setting: setting.to_string(),
                value: value.to_string(),
                allowed: kind.values().iter().map(ToString::to_string).collect(),
            }.into());
        }
        self.settings.insert(setting, value);
        Ok(self)
    }

    /// Applies the settings of a preset, and its curriculum if it has one.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.settings.extend(preset.settings());
        if let Some(curriculum) = preset.curriculum() {
            self.curriculum = Some(curriculum);
        }
        self
    }

    /// Prefers the strategy called `strategy` whenever the strategies of `group` compete.
    pub fn with_preferred_strategy(mut self, group: impl Into<String>, strategy: impl Into<String>) -> Self {
        self.preferred_strategies.insert(group.into(), strategy.into());
        self
    }

    pub fn with_strategy_selection_mode(mut self, mode: StrategySelectionMode) -> Self {
        self.strategy_selection_mode = mode;
        self
    }

    /// Uses the given token to observe cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The curriculum, if one was declared.
    pub fn curriculum(&self) -> Option<Curriculum> {
        self.curriculum
    }

    /// The effective number of decimal places.
    pub fn precision(&self) -> u32 {
        self.precision
            .unwrap_or(DEFAULT_PRECISION)
            .clamp(MIN_PRECISION, MAX_PRECISION)
    }

    /// The declared decimal preference, if any.
    pub fn prefer_decimals(&self) -> Option<bool> {
        self.prefer_decimals
    }

    /// Returns true if results should be presented as decimals, either by declaration or through
    /// the [`Setting::PreferDecimals`] setting.
    pub fn prefers_decimals(&self) -> bool {
        self.prefer_decimals.unwrap_or_else(|| self.is_set(Setting::PreferDecimals))
    }

    /// The variables to solve for.
    pub fn solution_variables(&self) -> &[String] {
        &self.solution_variables
    }

    /// The value of a setting, or its default if it was not assigned.
    pub fn get(&self, setting: Setting) -> SettingValue {
        self.settings
            .get(&setting)
            .copied()
            .unwrap_or_else(|| setting.kind().default_value())
    }

    /// Returns true if a boolean setting is `true`.
    pub fn is_set(&self, setting: Setting) -> bool {
        self.get(setting) == SettingValue::True
    }

    /// The preferred strategy of a group, if one was declared.
    pub fn preferred_strategy(&self, group: &str) -> Option<&str> {
        self.preferred_strategies.get(group).map(String::as_str)
    }

    pub fn strategy_selection_mode(&self) -> StrategySelectionMode {
        self.strategy_selection_mode
    }

    /// The outcomes of the plans run with this context so far.
    pub fn outcomes(&self) -> &OutcomeCache {
        &self.outcomes
    }

    /// The token this computation observes.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Fails with a cancellation error if the computation was cancelled or ran out of time.
    pub fn checkpoint(&self) -> Result<(), Error> {
        self.cancellation.checkpoint()
    }

    /// Rounds `numerator / denominator` half-up to the effective precision, keeping its sign.
    /// Returns `None` if the denominator is zero.
    pub fn round_ratio(&self, numerator: &Integer, denominator: &Integer) -> Option<SignedDecimal> {
        Decimal::from_ratio(numerator, denominator, self.precision())
    }
}

#[cfg(test)]
mod tests {
    use crate::primitive::int;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn precision_is_clamped() {
        assert_eq!(Context::new().precision(), DEFAULT_PRECISION);
        assert_eq!(Context::new().with_precision(0).precision(), MIN_PRECISION);
        assert_eq!(Context::new().with_precision(40).precision(), MAX_PRECISION);
        assert_eq!(Context::new().with_precision(5).precision(), 5);
    }

    #[test]
    fn settings_default_and_assign() {
        let ctx = Context::new();
        assert_eq!(ctx.get(Setting::BalancingMode), SettingValue::Basic);
        assert!(!ctx.is_set(Setting::QuickAddLikeFraction));

        let ctx = ctx.with_setting(Setting::BalancingMode, SettingValue::NextTo).unwrap();
        assert_eq!(ctx.get(Setting::BalancingMode), SettingValue::NextTo);
    }

    #[test]
    fn invalid_setting_value() {
        let error = Context::new()
            .with_setting(Setting::QuickAddLikeTerms, SettingValue::Advanced)
            .unwrap_err();
        assert_eq!(error, InvalidSettingValue {
            setting: "QuickAddLikeTerms".to_string(),
            value: "advanced".to_string(),
            allowed: vec!["true".to_string(), "false".to_string()],
        }.into());
    }

    #[test]
    fn presets() {
        let ctx = Context::new().with_preset(Preset::UsCurriculum);
        assert_eq!(ctx.curriculum(), Some(Curriculum::Us));
        assert!(ctx.is_set(Setting::AddMixedNumbersWithoutConvertingToImproperFractions));

        let ctx = Context::new().with_preset(Preset::GmFriendly);
        assert_eq!(ctx.curriculum(), None);
        assert_eq!(ctx.get(Setting::BalancingMode), SettingValue::NextTo);
    }

    #[test]
    fn decimal_preference() {
        assert!(!Context::new().prefers_decimals());
        let ctx = Context::new().with_setting(Setting::PreferDecimals, SettingValue::True).unwrap();
        assert!(ctx.prefers_decimals());
        assert!(!ctx.with_prefer_decimals(false).prefers_decimals());
    }

    #[test]
    fn rounding_uses_precision() {
        let ctx = Context::new().with_precision(2);
        assert_eq!(ctx.round_ratio(&int(2), &int(3)).unwrap().to_string(), "0.67");
        assert_eq!(ctx.round_ratio(&int(2), &int(0)), None);
        assert_eq!(ctx.round_ratio(&int(2), &int(-3)).unwrap().to_string(), "-0.67");
    }

    #[test]
    fn strategy_preferences() {
        let ctx = Context::new();
        assert_eq!(ctx.preferred_strategy("Balancing"), None);
        assert_eq!(ctx.strategy_selection_mode(), StrategySelectionMode::All);

        let ctx = ctx
            .with_preferred_strategy("Balancing", "MoveConstants")
            .with_strategy_selection_mode(StrategySelectionMode::First);
        assert_eq!(ctx.preferred_strategy("Balancing"), Some("MoveConstants"));
        assert_eq!(ctx.strategy_selection_mode(), StrategySelectionMode::First);
    }

    #[test]
    fn cancellation_is_shared() {
        let token = CancellationToken::new();
        let ctx = Context::new().with_cancellation(token.clone());
        assert!(ctx.checkpoint().is_ok());
        token.cancel();
        assert!(ctx.checkpoint().unwrap_err().is_cancelled());
    }
}
