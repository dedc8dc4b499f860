use super::{Method, Plan, StepsBuilder, StepsProducer};
use crate::{
    context::Context,
    error::Error,
    expr::{BracketKind, Expression, Operator, Subexpression},
    mapping::{MappedExpression, PathMappingTree},
    pattern::{Match, NaryPattern},
    transformation::{Metadata, MetadataKey, MetadataMaker, Tag, Transformation},
};

/// The matched operands were next to each other and were only bracketed.
pub const EXTRACT_PARTIAL_EXPRESSION: MetadataKey = MetadataKey::new("SolverEngine", "ExtractPartialExpression");

/// The matched terms of a sum were moved next to each other.
pub const REARRANGE_SUM: MetadataKey = MetadataKey::new("SolverEngine", "RearrangeSum");

/// The matched factors of a product were moved next to each other.
pub const REARRANGE_PRODUCT: MetadataKey = MetadataKey::new("SolverEngine", "RearrangeProduct");

pub const INLINE_PARTIAL_SUM: MetadataKey = MetadataKey::new("SolverEngine", "InlinePartialSum");

pub const INLINE_PARTIAL_PRODUCT: MetadataKey = MetadataKey::new("SolverEngine", "InlinePartialProduct");

/// A [`Plan`] over some of the operands of a sum or product.
///
/// When the pattern matches fewer operands than the expression has, the matched operands are
/// first gathered into a partial expression (shown as `<.1 + 2.>`) at the position of the first
/// one, the producer runs on that partial expression alone, and the partial bracket is then
/// removed, splicing the result back among the other operands. Gathering operands that were not
/// next to each other is recorded as a rearrangement. If the pattern covers every operand, this
/// behaves as a plain [`Plan`].
///
/// Each match of the pattern is tried in turn until the producer applies to one.
pub struct PartialPlan {
    pattern: NaryPattern,
    plan: Plan,
}

impl PartialPlan {
    pub fn new(name: impl Into<String>, pattern: NaryPattern, producer: impl StepsProducer + 'static) -> Self {
        let plan = Plan::new(name, producer).with_pattern(pattern.pattern());
        Self { pattern, plan }
    }

    pub fn with_explanation(mut self, explanation: impl Into<MetadataMaker>) -> Self {
        self.plan = self.plan.with_explanation(explanation);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<MetadataMaker>) -> Self {
        self.plan = self.plan.with_skill(skill);
        self
    }

    /// Tries `plan` before gathering any operands.
    pub fn with_specific_plan(mut self, plan: impl Method + 'static) -> Self {
        self.plan = self.plan.with_specific_plan(plan);
        self
    }

    /// Applies the plan to `sub`.
    pub fn apply(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        ctx.outcomes().unless_previously_failed(self.plan.id(), sub, || self.run(ctx, sub))
    }

    fn run(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        if let Some(transformation) = self.plan.apply_specific(ctx, sub)? {
            return Ok(Some(transformation));
        }
        if sub.expr.children().len() == self.pattern.operands().len() {
            return self.plan.run_steps(ctx, sub);
        }

        for m in self.pattern.matches(ctx, sub)? {
            ctx.checkpoint()?;
            let Some(steps) = self.run_on_match(ctx, sub, &m)? else {
                continue;
            };
            return self.plan.complete(ctx, sub, &m, steps);
        }
        Ok(None)
    }

    fn run_on_match(
        &self,
        ctx: &Context,
        sub: &Subexpression,
        m: &Match,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        let mut builder = StepsBuilder::new(sub.clone());
        builder.add_step(self.extract(sub, m)?)?;

        let Some(partial) = partial_child(builder.expression()).and_then(|child| child.child(0)) else {
            return Ok(None);
        };
        let Some(steps) = self.plan.producer().produce_steps(ctx, &partial)? else {
            return Ok(None);
        };
        builder.add_steps(steps)?;

        let current = builder.expression().clone();
        if partial_child(&current).is_some() {
            builder.add_step(self.inline(&current)?)?;
        }
        Ok(builder.finish())
    }

    /// The step gathering the matched operands into a partial expression.
    fn extract(&self, sub: &Subexpression, m: &Match) -> Result<Transformation, Error> {
        let indices = self.pattern.matched_indices(m)?;
        let children = sub.children();
        let operands = indices.iter().filter_map(|&i| children.get(i)).map(Subexpression::to_mapped).collect();
        let partial = MappedExpression::with_operator(self.pattern.operator().clone(), operands)?;
        let bracketed = MappedExpression::new(
            Expression::new(Operator::Bracket(BracketKind::Partial), vec![partial.expr.clone()])?,
            PathMappingTree::Parent(vec![partial.mappings]),
        );
        let to = self.pattern.substitute(m, vec![bracketed])?;

        if are_adjacent(&indices) {
            return Ok(Transformation::rule(sub.clone(), to)
                .with_explanation(Metadata::from_key(EXTRACT_PARTIAL_EXPRESSION))
                .with_tags([Tag::InvisibleChange]));
        }

        let key = match self.pattern.operator() {
            Operator::Product => REARRANGE_PRODUCT,
            _ => REARRANGE_SUM,
        };
        let location = partial_child(&Subexpression::new(sub.path.clone(), to.expr.clone()))
            .and_then(|child| child.child(0))
            .map(|child| vec![child])
            .unwrap_or_default();
        Ok(Transformation::rule(sub.clone(), to)
            .with_explanation(Metadata::new(key, location))
            .with_tags([Tag::Rearrangement]))
    }

    /// The step removing the partial bracket from `current`.
    fn inline(&self, current: &Subexpression) -> Result<Transformation, Error> {
        let operands = current
            .children()
            .into_iter()
            .map(|child| match child.expr.operator() {
                Operator::Bracket(BracketKind::Partial) => child.child(0).unwrap_or(child).to_mapped(),
                _ => child.to_mapped(),
            })
            .collect();
        let to = MappedExpression::flattened(self.pattern.operator().clone(), operands)?;

        let key = match self.pattern.operator() {
            Operator::Product => INLINE_PARTIAL_PRODUCT,
            _ => INLINE_PARTIAL_SUM,
        };
        Ok(Transformation::rule(current.clone(), to)
            .with_explanation(Metadata::from_key(key))
            .with_tags([Tag::InvisibleChange]))
    }
}

/// The first child of `sub` in a partial bracket.
fn partial_child(sub: &Subexpression) -> Option<Subexpression> {
    sub.children()
        .into_iter()
        .find(|child| child.expr.operator() == &Operator::Bracket(BracketKind::Partial))
}

/// Returns true if the indices, once sorted, have no gaps.
fn are_adjacent(indices: &[usize]) -> bool {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

impl Method for PartialPlan {
    fn name(&self) -> &str {
        self.plan.name()
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        self.apply(ctx, sub)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        pattern::{integer, sum_containing},
        strategy::testing::{add_integers, ADD},
        transformation::TransformationKind,
    };
    use pretty_assertions::assert_eq;
    use super::*;

    const ADD_PARTIAL: MetadataKey = MetadataKey::new("Test", "AddPartial");

    fn add_two_integers() -> PartialPlan {
        let (a, b) = (integer(), integer());
        PartialPlan::new("AddTwoIntegers", sum_containing(vec![a.clone(), b.clone()]), add_integers())
            .with_explanation(MetadataMaker::new(ADD_PARTIAL, vec![a, b]))
    }

    fn sum(terms: Vec<Expression>) -> Subexpression {
        Subexpression::root(Expression::sum(terms).unwrap())
    }

    fn explanations(plan: &Transformation) -> Vec<String> {
        plan.steps
            .iter()
            .map(|step| step.explanation.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    #[test]
    fn adjacent_operands_are_extracted() {
        let ctx = Context::new();
        let sub = sum(vec![Expression::integer(1), Expression::integer(2), Expression::variable("x")]);
        let plan = add_two_integers().apply(&ctx, &sub).unwrap().unwrap();

        assert_eq!(plan.kind, TransformationKind::Plan);
        assert_eq!(plan.to.expr.to_string(), "3 + x");
        assert_eq!(plan.explanation.as_ref().unwrap().to_string(), "Test.AddPartial(1, 2)");
        assert_eq!(explanations(&plan), vec![
            "SolverEngine.ExtractPartialExpression".to_string(),
            ADD.to_string() + "(1, 2)",
            "SolverEngine.InlinePartialSum".to_string(),
        ]);
        assert_eq!(plan.steps[0].to.expr.to_string(), "<.1 + 2.> + x");
        assert_eq!(plan.steps[0].tags, vec![Tag::InvisibleChange]);
        assert_eq!(plan.steps[1].to.expr.to_string(), "<.3.> + x");
        assert_eq!(plan.steps[2].tags, vec![Tag::InvisibleChange]);
    }

    #[test]
    fn scattered_operands_are_rearranged() {
        let ctx = Context::new();
        let sub = sum(vec![Expression::integer(1), Expression::variable("x"), Expression::integer(2)]);
        let plan = add_two_integers().apply(&ctx, &sub).unwrap().unwrap();

        assert_eq!(plan.to.expr.to_string(), "3 + x");
        assert_eq!(plan.steps[0].to.expr.to_string(), "<.1 + 2.> + x");
        assert_eq!(plan.steps[0].tags, vec![Tag::Rearrangement]);
        assert_eq!(plan.steps[0].explanation.as_ref().unwrap().to_string(), "SolverEngine.RearrangeSum(1 + 2)");
    }

    #[test]
    fn whole_expression_runs_as_a_plan() {
        let ctx = Context::new();
        let sub = sum(vec![Expression::integer(1), Expression::integer(2)]);
        let plan = add_two_integers().apply(&ctx, &sub).unwrap().unwrap();

        assert_eq!(plan.to.expr.to_string(), "3");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].explanation.as_ref().unwrap().key, ADD);
    }

    #[test]
    fn later_matches_are_tried() {
        // only the second pair of integers sums to a small enough value to double
        let ctx = Context::new();
        let (a, b) = (integer(), integer());
        let double_sum = PartialPlan::new(
            "DoubleSum",
            sum_containing(vec![a, b]),
            crate::strategy::pipeline().apply(add_integers()).apply(crate::strategy::testing::double_small()),
        );
        let sub = sum(vec![Expression::integer(90), Expression::integer(10), Expression::integer(1)]);
        let plan = double_sum.apply(&ctx, &sub).unwrap().unwrap();
        assert_eq!(plan.to.expr.to_string(), "182 + 10");
    }

    #[test]
    fn no_match_does_not_apply() {
        let ctx = Context::new();
        let sub = sum(vec![Expression::integer(1), Expression::variable("x"), Expression::variable("y")]);
        assert_eq!(add_two_integers().apply(&ctx, &sub).unwrap(), None);
    }
}
