use super::StepsProducer;
use crate::{
    context::Context,
    error::Error,
    expr::Subexpression,
    transformation::Transformation,
};
use std::sync::Arc;

/// Tries options in the order they were added and returns the steps of the first one that
/// applies.
#[derive(Default)]
pub struct FirstOf {
    options: Vec<Arc<dyn StepsProducer>>,
}

impl FirstOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option after the existing ones.
    pub fn option(mut self, producer: impl StepsProducer + 'static) -> Self {
        self.options.push(Arc::new(producer));
        self
    }
}

impl StepsProducer for FirstOf {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        for option in &self.options {
            if let Some(steps) = option.produce_steps(ctx, sub)? {
                return Ok(Some(steps));
            }
        }
        Ok(None)
    }
}
