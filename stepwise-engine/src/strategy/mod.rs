//! Step combinators: the operators that assemble rules into strategies.
//!
//! Everything that produces steps implements [`StepsProducer`]. A producer returns `Ok(None)`
//! when it does not apply, and otherwise a non-empty list of steps, each starting from the
//! subexpression it was given or from one of its descendants. Fatal errors propagate through
//! every combinator with `?`; no combinator recovers from them.
//!
//! - [`Pipeline`]: stages applied one after the other, all or nothing.
//! - [`FirstOf`]: the first option that applies.
//! - [`WhilePossible`]: one producer, repeated until it no longer applies.
//! - [`Deeply`]: one producer, at the first node of a traversal where it applies.
//! - [`InStep`]: the same stages applied to every child of a node, one combined step per stage.
//! - [`ContextSensitive`]: the alternative best suited to the [`Context`].
//! - [`BranchOn`]: the producers registered for the value a setting has in the [`Context`].
//! - [`Plan`] and [`TaskSet`]: named [`Method`]s that fold steps or tasks into one
//!   [`Transformation`]. [`PartialPlan`] is a plan over some of the operands of a sum or product.
//! - [`WhileStrategiesAvailableFirstOf`]: a [`Method`] running competing [`Strategy`]s and
//!   reporting the losers as alternatives of the winner.

pub mod branch_on;
pub mod builder;
pub mod context_sensitive;
pub mod deeply;
pub mod first_of;
pub mod in_step;
pub mod partial;
pub mod pipeline;
pub mod plan;
pub mod task_set;
pub mod while_possible;
pub mod while_strategies;

pub use branch_on::BranchOn;
pub use builder::{Candidate, StepsBuilder};
pub use context_sensitive::{Alternative, ContextSensitive};
pub use deeply::Deeply;
pub use first_of::FirstOf;
pub use in_step::InStep;
pub use partial::PartialPlan;
pub use pipeline::{pipeline, Pipeline};
pub use plan::Plan;
pub use task_set::{TaskSet, TasksBuilder};
pub use while_possible::{WhilePossible, MAX_WHILE_POSSIBLE_ITERATIONS};
pub use while_strategies::{Strategy, WhileStrategiesAvailableFirstOf, MAX_STRATEGY_PRIORITY};

use crate::{
    context::Context,
    error::Error,
    expr::Subexpression,
    rule::Rule,
    transformation::Transformation,
};
use std::sync::Arc;

/// Something that produces a list of steps from a subexpression.
pub trait StepsProducer: Send + Sync {
    /// Produces a non-empty list of steps, or `None` if the producer does not apply.
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error>;
}

/// A named strategy that rewrites a subexpression in a single, possibly composite,
/// [`Transformation`].
pub trait Method: Send + Sync {
    /// The name of the method, used in logs and in the registry.
    fn name(&self) -> &str;

    /// Applies the method to `sub`, returning `None` if it does not apply.
    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error>;
}

impl<T: StepsProducer + ?Sized> StepsProducer for Arc<T> {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        (**self).produce_steps(ctx, sub)
    }
}

impl<T: Method + ?Sized> Method for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        (**self).try_execute(ctx, sub)
    }
}

/// Implements [`StepsProducer`] for methods: the single transformation is the only step.
macro_rules! method_steps {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StepsProducer for $ty {
                fn produce_steps(
                    &self,
                    ctx: &Context,
                    sub: &Subexpression,
                ) -> Result<Option<Vec<Transformation>>, Error> {
                    Ok(self.try_execute(ctx, sub)?.map(|step| vec![step]))
                }
            }
        )*
    };
}

method_steps!(Rule, Plan, PartialPlan, TaskSet, WhileStrategiesAvailableFirstOf, dyn Method);
