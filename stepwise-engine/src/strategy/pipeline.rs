use super::{Deeply, FirstOf, StepsBuilder, StepsProducer, WhilePossible};
use crate::{
    context::Context,
    error::Error,
    expr::{Subexpression, TraversalOrder},
    pattern::Pattern,
    transformation::Transformation,
};
use std::sync::Arc;

type CheckFn = dyn Fn(&Context, &Subexpression) -> bool + Send + Sync;

/// One stage of a [`Pipeline`].
enum Stage {
    /// Must apply, or the whole pipeline does not apply.
    Apply(Arc<dyn StepsProducer>),

    /// Applied if possible, skipped otherwise.
    Optionally(Arc<dyn StepsProducer>),

    /// If it applies, the pipeline ends successfully right after it.
    Shortcut(Arc<dyn StepsProducer>),

    /// The current expression must satisfy the predicate.
    Check(Box<CheckFn>),

    /// The current expression must match the pattern.
    CheckForm(Pattern),

    /// Applied to each child of the current expression in turn.
    ApplyToChildren {
        producer: Arc<dyn StepsProducer>,
        all: bool,
        at_least_one: bool,
    },
}

impl Stage {
    fn run(&self, ctx: &Context, builder: &mut StepsBuilder) -> Result<(), Error> {
        let current = builder.expression().clone();
        match self {
            Self::Apply(producer) => match producer.produce_steps(ctx, &current)? {
                Some(steps) => builder.add_steps(steps)?,
                None => builder.abort(),
            },
            Self::Optionally(producer) => {
                if let Some(steps) = producer.produce_steps(ctx, &current)? {
                    builder.add_steps(steps)?;
                }
            },
            Self::Shortcut(producer) => {
                if let Some(steps) = producer.produce_steps(ctx, &current)? {
                    builder.add_steps(steps)?;
                    builder.succeed();
                }
            },
            Self::Check(check) => {
                if !check(ctx, &current) {
                    builder.abort();
                }
            },
            Self::CheckForm(pattern) => {
                if !pattern.is_match(ctx, &current)? {
                    builder.abort();
                }
            },
            Self::ApplyToChildren { producer, all, at_least_one } => {
                let mut applied = false;
                let mut index = 0;
                // the number of children may change as steps are added
                while let Some(child) = builder.expression().child(index) {
                    match producer.produce_steps(ctx, &child)? {
                        Some(steps) => {
                            builder.add_steps(steps)?;
                            applied = true;
                        },
                        None if *all => {
                            builder.abort();
                            return Ok(());
                        },
                        None => {},
                    }
                    index += 1;
                }
                if *at_least_one && !applied {
                    builder.abort();
                }
            },
        }
        Ok(())
    }
}

/// Stages applied one after the other to the running expression.
///
/// The pipeline is all or nothing: if a required stage does not apply, the pipeline returns no
/// steps at all, even if earlier stages produced some. A pipeline where every stage was skipped
/// does not apply either.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

/// Creates an empty [`Pipeline`].
pub fn pipeline() -> Pipeline {
    Pipeline::new()
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// A stage that must apply.
    pub fn apply(self, producer: impl StepsProducer + 'static) -> Self {
        self.stage(Stage::Apply(Arc::new(producer)))
    }

    /// A stage that is skipped if it does not apply.
    pub fn optionally(self, producer: impl StepsProducer + 'static) -> Self {
        self.stage(Stage::Optionally(Arc::new(producer)))
    }

    /// A stage that, if it applies, ends the pipeline.
    pub fn shortcut(self, producer: impl StepsProducer + 'static) -> Self {
        self.stage(Stage::Shortcut(Arc::new(producer)))
    }

    /// A guard on the running expression.
    pub fn check(
        self,
        check: impl Fn(&Context, &Subexpression) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.stage(Stage::Check(Box::new(check)))
    }

    /// A guard requiring the running expression to match `pattern`.
    pub fn check_form(self, pattern: Pattern) -> Self {
        self.stage(Stage::CheckForm(pattern))
    }

    /// A stage applied to every child of the running expression.
    ///
    /// If `all` is set, every child must accept the producer. If `at_least_one` is set, the
    /// stage does not apply unless some child accepted it.
    pub fn apply_to_children(
        self,
        producer: impl StepsProducer + 'static,
        all: bool,
        at_least_one: bool,
    ) -> Self {
        self.stage(Stage::ApplyToChildren {
            producer: Arc::new(producer),
            all,
            at_least_one,
        })
    }

    /// An optional stage applying `producer` for as long as it applies.
    pub fn while_possible(self, producer: impl StepsProducer + 'static) -> Self {
        self.optionally(WhilePossible::new(producer))
    }

    /// A required stage applying `producer` at the first node of the traversal where it applies.
    pub fn deeply(self, producer: impl StepsProducer + 'static, order: TraversalOrder) -> Self {
        self.apply(Deeply::new(producer, order))
    }

    /// A required stage applying the first option that applies.
    pub fn first_of(self, options: FirstOf) -> Self {
        self.apply(options)
    }
}

impl StepsProducer for Pipeline {
    fn produce_steps(
        &self,
        ctx: &Context,
        sub: &Subexpression,
    ) -> Result<Option<Vec<Transformation>>, Error> {
        let mut builder = StepsBuilder::new(sub.clone());
        for stage in &self.stages {
            if !builder.in_progress() {
                break;
            }
            stage.run(ctx, &mut builder)?;
        }
        Ok(builder.finish())
    }
}
