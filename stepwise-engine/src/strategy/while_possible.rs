use super::{StepsBuilder, StepsProducer};
use crate::{
    context::Context,
    error::{Error, TooManyIterations},
    expr::Subexpression,
    transformation::Transformation,
};
use std::sync::Arc;

/// The default iteration ceiling of [`WhilePossible`].
pub const MAX_WHILE_POSSIBLE_ITERATIONS: usize = 100;

/// Applies a producer to the running expression until it no longer applies.
///
/// Reaching the iteration ceiling is a fatal [`TooManyIterations`] error, since it almost
/// always means two rules undo each other. If the producer does not apply even once, neither
/// does the loop.
pub struct WhilePossible {
    producer: Arc<dyn StepsProducer>,
    limit: usize,
}

impl WhilePossible {
    pub fn new(producer: impl StepsProducer + 'static) -> Self {
        Self {
            producer: Arc::new(producer),
            limit: MAX_WHILE_POSSIBLE_ITERATIONS,
        }
    }

    /// Changes the iteration ceiling.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl StepsProducer for WhilePossible {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        let mut builder = StepsBuilder::new(sub.clone());
        for _ in 0..self.limit {
            ctx.checkpoint()?;
            match self.producer.produce_steps(ctx, builder.expression())? {
                Some(steps) => builder.add_steps(steps)?,
                None => return Ok(builder.finish()),
            }
        }

        tracing::warn!(limit = self.limit, path = %sub.path, "no fixed point reached");
        Err(TooManyIterations { limit: self.limit }.into())
    }
}
