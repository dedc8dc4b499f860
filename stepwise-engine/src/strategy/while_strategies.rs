use super::{builder::Candidate, Method, StepsBuilder, StepsProducer, MAX_WHILE_POSSIBLE_ITERATIONS};
use crate::{
    context::{Context, StrategySelectionMode},
    error::{Error, TooManyIterations},
    expr::Subexpression,
    transformation::{Metadata, MetadataKey, StrategyAlternative, Transformation},
};
use std::{cmp::Reverse, fmt, sync::Arc};

/// The priority of the strategy the [`Context`] prefers, above every declared priority.
pub const MAX_STRATEGY_PRIORITY: i32 = i32::MAX;

/// One of several competing ways of solving a problem, such as isolating a variable by moving
/// terms or by balancing.
///
/// Strategies are identified by name. Strategies of the same family exclude each other: once
/// one of them applies, the others are no longer tried.
pub struct Strategy {
    name: String,
    explanation: MetadataKey,
    priority: i32,
    family: Option<String>,
    steps: Arc<dyn StepsProducer>,
}

impl Strategy {
    pub fn new(
        name: impl Into<String>,
        explanation: MetadataKey,
        priority: i32,
        steps: impl StepsProducer + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            explanation,
            priority,
            family: None,
            steps: Arc::new(steps),
        }
    }

    /// Makes the strategy exclude the other strategies of `family`.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the strategy does, used to explain its steps.
    pub fn explanation(&self) -> MetadataKey {
        self.explanation
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns true if both strategies belong to the same family.
    pub fn excludes(&self, other: &Strategy) -> bool {
        matches!((&self.family, &other.family), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

enum Choice {
    Strategy(Arc<Strategy>),
    Fallback(Arc<Strategy>),
    Steps(Arc<dyn StepsProducer>),
}

/// Runs competing strategies side by side, in rounds, and reports the best one with the others
/// as alternatives.
///
/// Each round goes through the options in order on the current expression:
///
/// - a strategy option that applies records a candidate chain: the steps so far followed by the
///   strategy's steps. The strategy, and the strategies of its family, are not tried again;
/// - a plain option that applies extends the common chain and ends the round;
/// - a fallback strategy is only tried if nothing else applied in the round and no candidate
///   was recorded yet.
///
/// When a round ends with candidates, the [`StrategySelectionMode`] of the [`Context`] decides
/// whether to stop: [`All`](StrategySelectionMode::All) waits until no strategy is left or a
/// round fails and reports every candidate,
/// [`HighestPriority`](StrategySelectionMode::HighestPriority) stops once no remaining strategy
/// could do better, and [`First`](StrategySelectionMode::First) stops at once. A round in which
/// nothing applies and no candidate exists means the whole method does not apply. Running more
/// rounds than the iteration ceiling is a fatal [`TooManyIterations`] error.
pub struct WhileStrategiesAvailableFirstOf {
    group: String,
    strategies: Vec<Arc<Strategy>>,
    choices: Vec<Choice>,
    limit: usize,
}

impl WhileStrategiesAvailableFirstOf {
    /// A method choosing between the strategies of `group`. The group is the key of the
    /// preferred strategy in the [`Context`].
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            strategies: Vec::new(),
            choices: Vec::new(),
            limit: MAX_WHILE_POSSIBLE_ITERATIONS,
        }
    }

    /// Adds a competing strategy.
    pub fn option(mut self, strategy: Strategy) -> Self {
        let strategy = self.register(strategy);
        self.choices.push(Choice::Strategy(strategy));
        self
    }

    /// Adds steps shared by every strategy.
    pub fn option_steps(mut self, producer: impl StepsProducer + 'static) -> Self {
        self.choices.push(Choice::Steps(Arc::new(producer)));
        self
    }

    /// Adds a strategy only tried when nothing else applies.
    pub fn fallback(mut self, strategy: Strategy) -> Self {
        let strategy = self.register(strategy);
        self.choices.push(Choice::Fallback(strategy));
        self
    }

    /// Changes the round ceiling.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn register(&mut self, strategy: Strategy) -> Arc<Strategy> {
        let strategy = Arc::new(strategy);
        if !self.strategies.iter().any(|known| known.name == strategy.name) {
            self.strategies.push(strategy.clone());
        }
        strategy
    }

    /// Applies the method to `sub`.
    pub fn apply(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        let preferred = ctx.preferred_strategy(&self.group);
        let priority = |strategy: &Strategy| {
            if preferred == Some(strategy.name()) {
                MAX_STRATEGY_PRIORITY
            } else {
                strategy.priority
            }
        };

        let mut builder = StepsBuilder::new(sub.clone());
        let mut remaining = self.strategies.clone();

        for _ in 0..self.limit {
            ctx.checkpoint()?;
            let round_succeeded = self.round(ctx, &mut builder, &mut remaining)?;
            let candidates = builder.alternatives();

            if candidates.is_empty() {
                if !round_succeeded {
                    return Ok(None);
                }
                continue;
            }

            match ctx.strategy_selection_mode() {
                StrategySelectionMode::All => {
                    if !round_succeeded || remaining.is_empty() {
                        let mut candidates = candidates.to_vec();
                        candidates.sort_by_key(|candidate| Reverse(priority(&candidate.strategy)));
                        return self.report(sub, candidates);
                    }
                },
                StrategySelectionMode::HighestPriority => {
                    let best = candidates
                        .iter()
                        .min_by_key(|candidate| Reverse(priority(&candidate.strategy)))
                        .cloned();
                    if let Some(best) = best {
                        let best_priority = priority(&best.strategy);
                        if !round_succeeded || remaining.iter().all(|s| priority(s) <= best_priority) {
                            return self.report(sub, vec![best]);
                        }
                    }
                },
                StrategySelectionMode::First => {
                    return self.report(sub, candidates[..1].to_vec());
                },
            }
        }

        tracing::warn!(limit = self.limit, group = %self.group, path = %sub.path, "strategies never settled");
        Err(TooManyIterations { limit: self.limit }.into())
    }

    /// Runs one round of options. Returns true if a plain option applied.
    fn round(
        &self,
        ctx: &Context,
        builder: &mut StepsBuilder,
        remaining: &mut Vec<Arc<Strategy>>,
    ) -> Result<bool, Error> {
        for choice in &self.choices {
            match choice {
                Choice::Strategy(strategy) => self.try_strategy(ctx, builder, remaining, strategy)?,
                Choice::Fallback(strategy) => {
                    if builder.alternatives().is_empty() {
                        self.try_strategy(ctx, builder, remaining, strategy)?;
                    }
                },
                Choice::Steps(producer) => {
                    if let Some(steps) = producer.produce_steps(ctx, builder.expression())? {
                        builder.add_steps(steps)?;
                        return Ok(true);
                    }
                },
            }
        }
        Ok(false)
    }

    fn try_strategy(
        &self,
        ctx: &Context,
        builder: &mut StepsBuilder,
        remaining: &mut Vec<Arc<Strategy>>,
        strategy: &Arc<Strategy>,
    ) -> Result<(), Error> {
        if !remaining.iter().any(|s| s.name == strategy.name) {
            return Ok(());
        }
        let Some(steps) = strategy.steps.produce_steps(ctx, builder.expression())? else {
            return Ok(());
        };
        if builder.add_alternative(strategy.clone(), steps)? {
            tracing::debug!(group = %self.group, strategy = %strategy.name, "strategy applied");
            remaining.retain(|s| s.name != strategy.name && !s.excludes(strategy));
        }
        Ok(())
    }

    /// The transformation of the first candidate, with the others as its alternatives.
    fn report(&self, sub: &Subexpression, candidates: Vec<Candidate>) -> Result<Option<Transformation>, Error> {
        let mut candidates = candidates.into_iter();
        let Some(main) = candidates.next() else {
            return Ok(None);
        };
        let alternatives = candidates
            .map(|candidate| StrategyAlternative {
                strategy: Metadata::from_key(candidate.strategy.explanation),
                steps: candidate.steps,
            })
            .collect::<Vec<_>>();

        if let [step] = main.steps.as_slice() {
            if step.explanation.as_ref().map(|e| e.key) == Some(main.strategy.explanation) {
                return Ok(Some(step.clone().with_alternatives(alternatives)));
            }
        }

        Ok(Transformation::plan(sub.clone(), main.steps).map(|plan| {
            plan.with_explanation(Metadata::from_key(main.strategy.explanation))
                .with_alternatives(alternatives)
        }))
    }
}

impl Method for WhileStrategiesAvailableFirstOf {
    fn name(&self) -> &str {
        &self.group
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        self.apply(ctx, sub)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        expr::Expression,
        strategy::testing::{double_small, increment, DOUBLE, INCREMENT},
        transformation::TransformationKind,
    };
    use pretty_assertions::assert_eq;
    use super::*;

    fn doubling() -> Strategy {
        Strategy::new("Double", DOUBLE, 1, double_small())
    }

    fn incrementing() -> Strategy {
        Strategy::new("Increment", INCREMENT, 2, increment())
    }

    fn both() -> WhileStrategiesAvailableFirstOf {
        WhileStrategiesAvailableFirstOf::new("Arithmetic").option(doubling()).option(incrementing())
    }

    fn int(n: i32) -> Subexpression {
        Subexpression::root(Expression::integer(n))
    }

    fn alternative_keys(transformation: &Transformation) -> Vec<MetadataKey> {
        transformation.alternatives.iter().map(|a| a.strategy.key).collect()
    }

    #[test]
    fn best_strategy_first() {
        let ctx = Context::new();
        let applied = both().apply(&ctx, &int(3)).unwrap().unwrap();

        // a single step explained like its strategy is reported as is
        assert_eq!(applied.kind, TransformationKind::Rule);
        assert_eq!(applied.to.expr.to_string(), "4");
        assert_eq!(alternative_keys(&applied), vec![DOUBLE]);
        assert_eq!(applied.alternatives[0].steps[0].to.expr.to_string(), "6");
    }

    #[test]
    fn preferred_strategy_wins() {
        let ctx = Context::new().with_preferred_strategy("Arithmetic", "Double");
        let applied = both().apply(&ctx, &int(3)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "6");
        assert_eq!(alternative_keys(&applied), vec![INCREMENT]);
    }

    #[test]
    fn selection_modes() {
        let highest = Context::new().with_strategy_selection_mode(StrategySelectionMode::HighestPriority);
        let applied = both().apply(&highest, &int(3)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "4");
        assert!(applied.alternatives.is_empty());

        let first = Context::new().with_strategy_selection_mode(StrategySelectionMode::First);
        let applied = both().apply(&first, &int(3)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "6");
        assert!(applied.alternatives.is_empty());
    }

    #[test]
    fn family_members_exclude_each_other() {
        let ctx = Context::new();
        let method = WhileStrategiesAvailableFirstOf::new("Arithmetic")
            .option(doubling().with_family("Arithmetic"))
            .option(incrementing().with_family("Arithmetic"));
        let applied = method.apply(&ctx, &int(3)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "6");
        assert!(applied.alternatives.is_empty());
    }

    #[test]
    fn shared_steps_open_new_rounds() {
        // doubling does not apply to 0, so the shared increment runs first
        let ctx = Context::new();
        let method = WhileStrategiesAvailableFirstOf::new("Arithmetic").option(doubling()).option_steps(increment());
        let applied = method.apply(&ctx, &int(0)).unwrap().unwrap();

        assert_eq!(applied.kind, TransformationKind::Plan);
        assert_eq!(applied.explanation.unwrap().key, DOUBLE);
        let results = applied.steps.iter().map(|s| s.to.expr.to_string()).collect::<Vec<_>>();
        assert_eq!(results, vec!["1", "2"]);
    }

    #[test]
    fn fallback_only_when_nothing_else_applies() {
        let ctx = Context::new();
        let method = WhileStrategiesAvailableFirstOf::new("Arithmetic").option(doubling()).fallback(incrementing());

        let applied = method.apply(&ctx, &int(300)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "301");

        let applied = method.apply(&ctx, &int(3)).unwrap().unwrap();
        assert_eq!(applied.to.expr.to_string(), "6");
        assert!(applied.alternatives.is_empty());
    }

    #[test]
    fn nothing_applies() {
        let ctx = Context::new();
        let x = Subexpression::root(Expression::variable("x"));
        assert_eq!(both().apply(&ctx, &x).unwrap(), None);
    }

    #[test]
    fn round_ceiling() {
        let ctx = Context::new();
        let method = WhileStrategiesAvailableFirstOf::new("Arithmetic").option_steps(increment()).with_limit(5);
        let error = method.apply(&ctx, &int(0)).unwrap_err();
        assert_eq!(error, Error::from(TooManyIterations { limit: 5 }));
    }
}
