//! Rules: the atomic unit of rewriting.
//!
//! A [`Rule`] pairs a [`Pattern`] with a result builder. Applying the rule finds the first match
//! of the pattern against the subexpression and hands it to the builder, which returns the
//! rewritten expression as a [`Transformation`], or `None` if, having inspected the match, it
//! finds no useful rewrite. Both "no match" and "no useful rewrite" are reported as `Ok(None)`.

pub mod maker;

pub use maker::ResultBuilder;

use crate::{
    context::Context,
    error::Error,
    expr::Subexpression,
    pattern::Pattern,
    strategy::Method,
    transformation::Transformation,
};
use std::fmt;

type BuildFn = dyn Fn(&ResultBuilder<'_>) -> Result<Option<Transformation>, Error> + Send + Sync;

/// A pattern plus a result builder plus an explanation.
pub struct Rule {
    name: String,
    pattern: Pattern,
    build: Box<BuildFn>,
}

impl Rule {
    /// Creates a rule. The builder runs on the first match of `pattern` only.
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<Pattern>,
        build: impl Fn(&ResultBuilder<'_>) -> Result<Option<Transformation>, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            build: Box::new(build),
        }
    }

    /// The pattern the rule rewrites.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Applies the rule to `sub`.
    pub fn apply(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        ctx.checkpoint()?;
        let Some(m) = self.pattern.first_match(ctx, sub)? else {
            return Ok(None);
        };

        let result = (self.build)(&ResultBuilder::new(ctx, sub, &m))?;
        if result.is_some() {
            tracing::trace!(rule = %self.name, path = %sub.path, "applied rule");
        }
        Ok(result)
    }
}

impl Method for Rule {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        self.apply(ctx, sub)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
