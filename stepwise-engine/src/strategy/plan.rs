use super::{Method, StepsBuilder, StepsProducer};
use crate::{
    context::Context,
    error::Error,
    expr::Subexpression,
    pattern::{any, Match, Pattern},
    transformation::{MetadataMaker, Tag, Transformation},
};
use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

static NEXT_PLAN_ID: AtomicUsize = AtomicUsize::new(0);

/// A named strategy that folds the steps of a producer into one composite [`Transformation`].
///
/// The plan applies only if its pattern matches the subexpression, the producer applies, and,
/// when a result pattern is set, the final expression matches it. The explanation and skills are
/// built from the match of the pattern.
///
/// Specific plans, if any, are tried first; the first one that applies is returned in place of
/// the plan. A plan that fails on a subexpression is not run on it again with the same
/// [`Context`].
pub struct Plan {
    id: usize,
    name: String,
    pattern: Pattern,
    result_pattern: Option<Pattern>,
    explanation: Option<MetadataMaker>,
    skills: Vec<MetadataMaker>,
    tags: Vec<Tag>,
    specific_plans: Vec<Arc<dyn Method>>,
    producer: Arc<dyn StepsProducer>,
}

impl Plan {
    /// A plan applying `producer` to any subexpression.
    pub fn new(name: impl Into<String>, producer: impl StepsProducer + 'static) -> Self {
        Self {
            id: NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            pattern: any(),
            result_pattern: None,
            explanation: None,
            skills: Vec::new(),
            tags: Vec::new(),
            specific_plans: Vec::new(),
            producer: Arc::new(producer),
        }
    }

    /// Only applies to subexpressions matching `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Only applies if the result matches `pattern`.
    pub fn with_result_pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.result_pattern = Some(pattern.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<MetadataMaker>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_skill(mut self, skill: impl Into<MetadataMaker>) -> Self {
        self.skills.push(skill.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Tries `plan` before the plan's own steps.
    pub fn with_specific_plan(mut self, plan: impl Method + 'static) -> Self {
        self.specific_plans.push(Arc::new(plan));
        self
    }

    /// A number identifying this plan among all plans created by the process.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Applies the plan to `sub`.
    pub fn apply(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        ctx.outcomes().unless_previously_failed(self.id, sub, || self.run(ctx, sub))
    }

    /// Tries the specific plans in order.
    pub(crate) fn apply_specific(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        for plan in &self.specific_plans {
            if let Some(transformation) = plan.try_execute(ctx, sub)? {
                tracing::debug!(plan = %self.name, specific = plan.name(), "specific plan applied");
                return Ok(Some(transformation));
            }
        }
        Ok(None)
    }

    /// Builds the plan's transformation from steps produced for `sub`, checking the result
    /// pattern and attaching the metadata made from `m`.
    pub(crate) fn complete(
        &self,
        ctx: &Context,
        sub: &Subexpression,
        m: &Match,
        steps: Vec<Transformation>,
    ) -> Result<Option<Transformation>, Error> {
        let mut builder = StepsBuilder::new(sub.clone());
        builder.add_steps(steps)?;
        let Some(plan) = builder.finish().and_then(|steps| Transformation::plan(sub.clone(), steps)) else {
            return Ok(None);
        };

        if let Some(result_pattern) = &self.result_pattern {
            if !result_pattern.is_match(ctx, &plan.result())? {
                return Ok(None);
            }
        }

        let mut plan = plan.with_tags(self.tags.iter().copied());
        if let Some(explanation) = &self.explanation {
            plan = plan.with_explanation(explanation.make(m)?);
        }
        let skills = self.skills.iter().map(|skill| skill.make(m)).collect::<Result<Vec<_>, _>>()?;
        let plan = plan.with_skills(skills);

        tracing::debug!(plan = %self.name, path = %sub.path, steps = plan.steps.len(), "completed plan");
        Ok(Some(plan))
    }

    fn run(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        if let Some(transformation) = self.apply_specific(ctx, sub)? {
            return Ok(Some(transformation));
        }
        self.run_steps(ctx, sub)
    }

    /// Runs the plan's own steps, ignoring specific plans and the outcome cache.
    pub(crate) fn run_steps(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        let Some(m) = self.pattern.first_match(ctx, sub)? else {
            return Ok(None);
        };
        let Some(steps) = self.producer.produce_steps(ctx, sub)? else {
            return Ok(None);
        };
        self.complete(ctx, sub, &m, steps)
    }

    pub(crate) fn producer(&self) -> &dyn StepsProducer {
        self.producer.as_ref()
    }
}

impl Method for Plan {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        self.apply(ctx, sub)
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("explanation", &self.explanation)
            .finish_non_exhaustive()
    }
}
