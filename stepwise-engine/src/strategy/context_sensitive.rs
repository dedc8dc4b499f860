use super::StepsProducer;
use crate::{
    context::{Context, Resource, ResourceData},
    error::Error,
    expr::Subexpression,
    transformation::Transformation,
};
use std::sync::Arc;

/// A producer tagged with the context it is tailored for.
#[derive(Clone)]
pub struct Alternative {
    producer: Arc<dyn StepsProducer>,
    resource: ResourceData,
}

impl Resource for Alternative {
    fn resource_data(&self) -> &ResourceData {
        &self.resource
    }
}

/// Delegates to the alternative best suited to the context, or to the default if no
/// alternative suits it strictly better.
pub struct ContextSensitive {
    default: Alternative,
    alternatives: Vec<Alternative>,
}

impl ContextSensitive {
    /// Creates the selection with its default implementation.
    pub fn new(default: impl StepsProducer + 'static, resource: ResourceData) -> Self {
        Self {
            default: Alternative { producer: Arc::new(default), resource },
            alternatives: Vec::new(),
        }
    }

    /// Adds an alternative implementation.
    pub fn alternative(mut self, producer: impl StepsProducer + 'static, resource: ResourceData) -> Self {
        self.alternatives.push(Alternative { producer: Arc::new(producer), resource });
        self
    }
}

impl StepsProducer for ContextSensitive {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        let best = ctx.select_best_resource(&self.default, &self.alternatives);
        tracing::debug!(
            resource = ?best.resource,
            score = best.resource.score(ctx),
            is_default = std::ptr::eq(best, &self.default),
            "selected implementation",
        );
        best.producer.produce_steps(ctx, sub)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        context::Curriculum,
        expr::Expression,
        strategy::{
            pipeline,
            testing::{double_small, increment},
        },
    };
    use pretty_assertions::assert_eq;
    use super::*;

    /// Default doubles, `A` increments once, `B` increments twice.
    fn choice() -> ContextSensitive {
        ContextSensitive::new(double_small(), ResourceData::new().with_prefer_decimals(true))
            .alternative(increment(), ResourceData::new().with_prefer_decimals(false))
            .alternative(
                pipeline().apply(increment()).apply(increment()),
                ResourceData::new().with_curriculum(Curriculum::Us),
            )
    }

    fn result(ctx: &Context) -> String {
        let sub = Subexpression::root(Expression::integer(3));
        let steps = choice().produce_steps(ctx, &sub).unwrap().unwrap();
        steps.last().map(|s| s.to.expr.to_string()).unwrap_or_default()
    }

    #[test]
    fn best_match_outweighs_mismatch() {
        let ctx = Context::new().with_curriculum(Curriculum::Eu).with_prefer_decimals(false);
        assert_eq!(result(&ctx), "4");
    }

    #[test]
    fn default_wins_ties() {
        assert_eq!(result(&Context::new()), "6");
    }

    #[test]
    fn curriculum_selects_alternative() {
        let ctx = Context::new().with_curriculum(Curriculum::Us);
        assert_eq!(result(&ctx), "5");
    }
}
