use super::StepsProducer;
use crate::{
    context::Context,
    error::Error,
    expr::{Subexpression, TraversalOrder},
    transformation::Transformation,
};
use std::sync::Arc;

/// Applies a producer at the first node where it applies, searching depth first.
///
/// In pre-order a node is tried before its children, in post-order after them, so when the
/// producer applies both at a node and below it, the order decides which one is rewritten. The
/// steps start from the node they rewrote; callers that chain them rebase them.
pub struct Deeply {
    producer: Arc<dyn StepsProducer>,
    order: TraversalOrder,
}

impl Deeply {
    pub fn new(producer: impl StepsProducer + 'static, order: TraversalOrder) -> Self {
        Self { producer: Arc::new(producer), order }
    }

    /// Searches parents before children.
    pub fn pre_order(producer: impl StepsProducer + 'static) -> Self {
        Self::new(producer, TraversalOrder::PreOrder)
    }

    /// Searches children before parents.
    pub fn post_order(producer: impl StepsProducer + 'static) -> Self {
        Self::new(producer, TraversalOrder::PostOrder)
    }

    fn visit(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Vec<Transformation>>, Error> {
        ctx.checkpoint()?;

        if self.order == TraversalOrder::PreOrder {
            if let Some(steps) = self.producer.produce_steps(ctx, sub)? {
                return Ok(Some(steps));
            }
        }

        for child in sub.children() {
            if let Some(steps) = self.visit(ctx, &child)? {
                return Ok(Some(steps));
            }
        }

        if self.order == TraversalOrder::PostOrder {
            return self.producer.produce_steps(ctx, sub);
        }
        Ok(None)
    }
}

impl StepsProducer for Deeply {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        self.visit(ctx, sub)
    }
}
