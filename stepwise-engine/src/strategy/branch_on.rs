use super::StepsProducer;
use crate::{
    context::{Context, Setting, SettingValue},
    error::Error,
    expr::Subexpression,
    transformation::Transformation,
};
use std::sync::Arc;

/// Chooses between producers by the value of a setting.
///
/// The cases whose value equals the setting's value in the [`Context`] are tried in the order
/// they were added, and the first one that applies wins. If none applies, neither does the
/// branch.
pub struct BranchOn {
    setting: Setting,
    cases: Vec<(SettingValue, Arc<dyn StepsProducer>)>,
}

impl BranchOn {
    pub fn new(setting: Setting) -> Self {
        Self { setting, cases: Vec::new() }
    }

    /// Adds a producer for when the setting has the value `value`.
    pub fn case(mut self, value: SettingValue, producer: impl StepsProducer + 'static) -> Self {
        self.cases.push((value, Arc::new(producer)));
        self
    }
}

impl StepsProducer for BranchOn {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        let value = ctx.get(self.setting);
        for (_, producer) in self.cases.iter().filter(|(case, _)| *case == value) {
            if let Some(steps) = producer.produce_steps(ctx, sub)? {
                return Ok(Some(steps));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        expr::Expression,
        strategy::testing::{double_small, increment, DOUBLE, INCREMENT},
    };
    use pretty_assertions::assert_eq;
    use super::*;

    fn branch() -> BranchOn {
        BranchOn::new(Setting::BalancingMode)
            .case(SettingValue::Basic, double_small())
            .case(SettingValue::Basic, increment())
            .case(SettingValue::Advanced, increment())
    }

    fn key(steps: Option<Vec<Transformation>>) -> Option<String> {
        steps.and_then(|steps| steps[0].explanation.as_ref().map(|e| e.key.to_string()))
    }

    #[test]
    fn follows_the_setting() {
        let three = Subexpression::root(Expression::integer(3));

        let basic = Context::new();
        assert_eq!(key(branch().produce_steps(&basic, &three).unwrap()), Some(DOUBLE.to_string()));

        let advanced = Context::new().with_setting(Setting::BalancingMode, SettingValue::Advanced).unwrap();
        assert_eq!(key(branch().produce_steps(&advanced, &three).unwrap()), Some(INCREMENT.to_string()));
    }

    #[test]
    fn later_cases_with_the_same_value_are_tried() {
        let ctx = Context::new();
        let large = Subexpression::root(Expression::integer(300));
        assert_eq!(key(branch().produce_steps(&ctx, &large).unwrap()), Some(INCREMENT.to_string()));
    }

    #[test]
    fn no_matching_case_does_not_apply() {
        let ctx = Context::new().with_setting(Setting::BalancingMode, SettingValue::NextTo).unwrap();
        let three = Subexpression::root(Expression::integer(3));
        assert_eq!(branch().produce_steps(&ctx, &three).unwrap(), None);
    }
}
