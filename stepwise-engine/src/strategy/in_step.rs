use super::{StepsBuilder, StepsProducer};
use crate::{
    context::Context,
    error::Error,
    expr::Subexpression,
    mapping::MappedExpression,
    transformation::{Metadata, MetadataKey, Transformation, TransformationKind},
};
use std::sync::Arc;

struct Stage {
    explanation: MetadataKey,
    producer: Arc<dyn StepsProducer>,
    optional: bool,
}

/// Applies the same stages to every child of a node, presenting each stage as one step.
///
/// Stage one runs on every child, and the children it applied to are rewritten together in a
/// single step whose substeps are the per-child results. Stage two then runs on the updated
/// children, and so on. A required stage must apply to every child; an optional stage only
/// needs to apply to one of them to produce a step.
#[derive(Default)]
pub struct InStep {
    stages: Vec<Stage>,
}

impl InStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stage that must apply to every child.
    pub fn step(mut self, explanation: MetadataKey, producer: impl StepsProducer + 'static) -> Self {
        self.stages.push(Stage { explanation, producer: Arc::new(producer), optional: false });
        self
    }

    /// A stage that is skipped for children it does not apply to.
    pub fn optional_step(
        mut self,
        explanation: MetadataKey,
        producer: impl StepsProducer + 'static,
    ) -> Self {
        self.stages.push(Stage { explanation, producer: Arc::new(producer), optional: true });
        self
    }
}

/// Runs `producer` on `child` and folds its steps into a single transformation of `child`.
fn apply_to_child(
    ctx: &Context,
    producer: &dyn StepsProducer,
    child: &Subexpression,
) -> Result<Option<Transformation>, Error> {
    let Some(steps) = producer.produce_steps(ctx, child)? else {
        return Ok(None);
    };
    let mut builder = StepsBuilder::new(child.clone());
    builder.add_steps(steps)?;
    let Some(mut steps) = builder.finish() else {
        return Ok(None);
    };
    if steps.len() == 1 {
        Ok(steps.pop())
    } else {
        Ok(Transformation::plan(child.clone(), steps))
    }
}

impl StepsProducer for InStep {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        if sub.expr.is_leaf() {
            return Ok(None);
        }
        let mut builder = StepsBuilder::new(sub.clone());

        for stage in &self.stages {
            let current = builder.expression().clone();
            let children = current.children();

            let mut results = Vec::with_capacity(children.len());
            for child in &children {
                results.push(apply_to_child(ctx, stage.producer.as_ref(), child)?);
            }
            if !stage.optional && results.iter().any(Option::is_none) {
                return Ok(None);
            }
            if results.iter().all(Option::is_none) {
                continue;
            }

            let operands = children
                .iter()
                .zip(&results)
                .map(|(child, result)| match result {
                    Some(step) => step.to.clone(),
                    None => child.to_mapped(),
                })
                .collect::<Vec<_>>();
            let to = MappedExpression::with_operator(current.expr.operator().clone(), operands)?;

            let step = Transformation::new(TransformationKind::Plan, current, to)
                .with_explanation(Metadata::from_key(stage.explanation))
                .with_steps(results.into_iter().flatten().collect());
            builder.add_step(step)?;
        }

        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        expr::{Expression, Path},
        strategy::testing::{double_small, increment, DOUBLE, INCREMENT},
    };
    use pretty_assertions::assert_eq;
    use super::*;

    fn sum(terms: &[i32]) -> Subexpression {
        Subexpression::root(Expression::sum(terms.iter().map(|&n| Expression::integer(n)).collect()).unwrap())
    }

    #[test]
    fn one_step_per_stage() {
        let ctx = Context::new();
        let in_step = InStep::new().step(INCREMENT, increment()).step(DOUBLE, double_small());
        let steps = in_step.produce_steps(&ctx, &sum(&[1, 2, 3])).unwrap().unwrap();

        let results = steps.iter().map(|s| s.to.expr.to_string()).collect::<Vec<_>>();
        assert_eq!(results, vec!["2 + 3 + 4", "4 + 6 + 8"]);
        assert_eq!(steps[0].explanation, Some(Metadata::from_key(INCREMENT)));
        assert_eq!(steps[0].steps.len(), 3);
        assert_eq!(steps[1].from.expr.to_string(), "2 + 3 + 4");
        assert_eq!(steps[1].steps[2].from.path, Path::from_indices([2]));
    }

    #[test]
    fn required_stage_must_apply_to_every_child() {
        let ctx = Context::new();
        let in_step = InStep::new().step(DOUBLE, double_small());
        assert_eq!(in_step.produce_steps(&ctx, &sum(&[0, 5])).unwrap(), None);
    }

    #[test]
    fn optional_stage_skips_children() {
        let ctx = Context::new();
        let in_step = InStep::new().optional_step(DOUBLE, double_small());
        let steps = in_step.produce_steps(&ctx, &sum(&[0, 5])).unwrap().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].to.expr.to_string(), "0 + 10");
        assert_eq!(steps[0].steps.len(), 1);

        assert_eq!(in_step.produce_steps(&ctx, &sum(&[0, 500])).unwrap(), None);
    }
}
