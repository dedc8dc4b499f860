use super::Strategy;
use crate::{
    error::Error,
    expr::Subexpression,
    transformation::Transformation,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    InProgress,
    Succeeded,
    Aborted,
}

/// The steps a competing strategy would take, from the start of a chain.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub strategy: Arc<Strategy>,
    pub steps: Vec<Transformation>,
}

/// Chains steps starting from one subexpression, keeping track of the current expression.
///
/// Every added step is substituted into the current expression. A step that rewrote a
/// descendant of the current expression is recorded as a rewrite of the whole current
/// expression, with provenance moving every untouched part and carrying the step's own edges for
/// the rewritten part.
///
/// Besides its own chain, the builder collects [`Candidate`]s: chains that branch off the
/// current one with the steps of a strategy.
#[derive(Debug, Clone)]
pub struct StepsBuilder {
    current: Subexpression,
    steps: Vec<Transformation>,
    status: Status,
    candidates: Vec<Candidate>,
}

impl StepsBuilder {
    /// Starts a chain at `sub`.
    pub fn new(sub: Subexpression) -> Self {
        Self { current: sub, steps: Vec::new(), status: Status::InProgress, candidates: Vec::new() }
    }

    /// The expression the starting subexpression was turned into by the steps so far.
    pub fn expression(&self) -> &Subexpression {
        &self.current
    }

    /// Returns true if steps can still be added.
    pub fn in_progress(&self) -> bool {
        self.status == Status::InProgress
    }

    /// The steps added so far.
    pub fn steps(&self) -> &[Transformation] {
        &self.steps
    }

    /// Adds a step starting from the current expression or one of its descendants.
    ///
    /// If the result equals an expression the chain already went through, the steps since then
    /// are dropped.
    pub fn add_step(&mut self, step: Transformation) -> Result<(), Error> {
        let substitution = self.current.substitute(&step.from.path, step.to.clone())?;
        let result = Subexpression::new(self.current.path.clone(), substitution.expr.clone());

        let step = if step.from.path == self.current.path {
            step
        } else {
            Transformation { from: self.current.clone(), to: substitution, ..step }
        };
        self.steps.push(step);

        if let Some(index) = self.steps.iter().position(|s| s.from.expr == result.expr) {
            tracing::warn!(
                expression = %result.expr,
                dropped = self.steps.len() - index,
                "circular steps detected",
            );
            self.steps.truncate(index);
        }

        self.current = result;
        Ok(())
    }

    /// Adds every step, in order, unless the chain is finished.
    pub fn add_steps(&mut self, steps: Vec<Transformation>) -> Result<(), Error> {
        if !self.in_progress() {
            return Ok(());
        }
        for step in steps {
            self.add_step(step)?;
        }
        Ok(())
    }

    /// Records the chain so far followed by `steps` as the candidate of `strategy`. The chain
    /// itself is unchanged.
    ///
    /// Returns false, recording nothing, if the chain is finished or the candidate would have no
    /// steps.
    pub fn add_alternative(&mut self, strategy: Arc<Strategy>, steps: Vec<Transformation>) -> Result<bool, Error> {
        if !self.in_progress() || (steps.is_empty() && self.steps.is_empty()) {
            return Ok(false);
        }
        let mut branch = Self::new(self.current.clone());
        branch.steps = self.steps.clone();
        branch.add_steps(steps)?;
        self.candidates.push(Candidate { strategy, steps: branch.steps });
        Ok(true)
    }

    /// The candidates recorded so far, in order.
    pub fn alternatives(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Abandons the chain: [`StepsBuilder::finish`] will return `None`.
    pub fn abort(&mut self) {
        self.status = Status::Aborted;
    }

    /// Ends the chain successfully; later additions are ignored.
    pub fn succeed(&mut self) {
        self.status = Status::Succeeded;
    }

    /// The steps of the chain, or `None` if it was aborted or has no steps.
    pub fn finish(self) -> Option<Vec<Transformation>> {
        match self.status {
            Status::Aborted => None,
            _ if self.steps.is_empty() => None,
            _ => Some(self.steps),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        context::Context,
        expr::{Expression, Path},
        mapping::{PathMapping, PathMappingType},
        strategy::testing::{double_small, increment, DOUBLE},
    };
    use pretty_assertions::assert_eq;
    use super::*;

    fn x_plus_one() -> Subexpression {
        Subexpression::root(Expression::sum(vec![Expression::variable("x"), Expression::integer(1)]).unwrap())
    }

    #[test]
    fn steps_below_are_rebased() {
        let ctx = Context::new();
        let sub = x_plus_one();
        let mut builder = StepsBuilder::new(sub.clone());

        let child = sub.child(1).unwrap();
        let step = increment().apply(&ctx, &child).unwrap().unwrap();
        builder.add_step(step).unwrap();

        assert_eq!(builder.expression().expr.to_string(), "x + 2");
        let steps = builder.finish().unwrap();
        assert_eq!(steps[0].from, sub);
        assert_eq!(steps[0].path_mappings(), vec![
            PathMapping::new(vec![Path::from_indices([0])], PathMappingType::Move, vec![Path::from_indices([0])]),
            PathMapping::new(vec![Path::from_indices([1])], PathMappingType::Transform, vec![Path::from_indices([1])]),
        ]);
    }

    #[test]
    fn empty_or_aborted_chains_have_no_steps() {
        assert_eq!(StepsBuilder::new(x_plus_one()).finish(), None);

        let ctx = Context::new();
        let sub = Subexpression::root(Expression::integer(1));
        let mut builder = StepsBuilder::new(sub.clone());
        builder.add_step(increment().apply(&ctx, &sub).unwrap().unwrap()).unwrap();
        builder.abort();
        assert!(!builder.in_progress());
        assert_eq!(builder.finish(), None);
    }

    #[test]
    fn circular_steps_are_dropped() {
        let sub = Subexpression::root(Expression::integer(1));
        let two = Subexpression::root(Expression::integer(2));
        let mut builder = StepsBuilder::new(sub.clone());

        let there = Transformation::rule(sub.clone(), two.to_mapped());
        let back = Transformation::rule(two, sub.to_mapped());
        builder.add_steps(vec![there, back]).unwrap();

        assert_eq!(builder.expression(), &sub);
        assert_eq!(builder.steps().len(), 0);
    }

    #[test]
    fn alternatives_branch_off_the_chain() {
        let ctx = Context::new();
        let sub = Subexpression::root(Expression::integer(1));
        let mut builder = StepsBuilder::new(sub.clone());
        builder.add_step(increment().apply(&ctx, &sub).unwrap().unwrap()).unwrap();

        let doubling = Arc::new(Strategy::new("Double", DOUBLE, 0, double_small()));
        let step = double_small().apply(&ctx, builder.expression()).unwrap().unwrap();
        assert!(builder.add_alternative(doubling.clone(), vec![step]).unwrap());

        assert_eq!(builder.expression().expr.to_string(), "2");
        let candidate = &builder.alternatives()[0];
        assert_eq!(candidate.strategy.name(), "Double");
        let results = candidate.steps.iter().map(|s| s.to.expr.to_string()).collect::<Vec<_>>();
        assert_eq!(results, vec!["2", "4"]);

        builder.succeed();
        assert!(!builder.add_alternative(doubling, Vec::new()).unwrap());
        assert_eq!(builder.alternatives().len(), 1);
    }
}
