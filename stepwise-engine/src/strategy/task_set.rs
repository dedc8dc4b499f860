use super::{Method, StepsBuilder, StepsProducer};
use crate::{
    context::Context,
    error::Error,
    expr::{Expression, Path, Subexpression},
    mapping::{MappedExpression, PathMappingType},
    pattern::{any, Match, Pattern},
    transformation::{Metadata, MetadataKey, MetadataMaker, Task, Transformation, TransformationKind},
};
use rug::Integer;
use std::{fmt, mem};

/// Collects the tasks of a [`TaskSet`].
///
/// Each task gets the next identifier (`1`, `2`, ...) and starts at its own path root, so its
/// steps never share paths with the main expression or with other tasks.
pub struct TasksBuilder<'a> {
    ctx: &'a Context,
    sub: &'a Subexpression,
    m: &'a Match,
    tasks: Vec<Task>,
}

impl<'a> TasksBuilder<'a> {
    fn new(ctx: &'a Context, sub: &'a Subexpression, m: &'a Match) -> Self {
        Self { ctx, sub, m, tasks: Vec::new() }
    }

    /// The context of the computation.
    pub fn ctx(&self) -> &Context {
        self.ctx
    }

    /// The subexpression the task set is applied to.
    pub fn expression(&self) -> &Subexpression {
        self.sub
    }

    /// The subexpression bound to `p` by the task set's pattern.
    pub fn get(&self, p: &Pattern) -> Result<&Subexpression, Error> {
        self.m.bound(p)
    }

    /// The signed integer value bound to `p`.
    pub fn integer(&self, p: &Pattern) -> Result<Integer, Error> {
        self.m.integer(p)
    }

    /// Metadata whose parameters are the subexpressions bound to `params`.
    pub fn metadata(&self, key: MetadataKey, params: &[&Pattern]) -> Result<Metadata, Error> {
        let params = params
            .iter()
            .map(|p| self.get(p).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Metadata::new(key, params))
    }

    fn next_start(&self, start: Expression) -> (String, Subexpression) {
        let id = (self.tasks.len() + 1).to_string();
        let start = Subexpression::new(Path::task(id.clone()), start);
        (id, start)
    }

    fn push(
        &mut self,
        id: String,
        start: Subexpression,
        explanation: Metadata,
        depends_on: &[&Task],
        steps: Vec<Transformation>,
    ) -> Task {
        let task = Task {
            id,
            start,
            explanation: Some(explanation),
            steps,
            depends_on: depends_on.iter().map(|task| task.id.clone()).collect(),
        };
        self.tasks.push(task.clone());
        task
    }

    /// Adds a task that runs `producer` on `start`, or returns `None` if the producer does not
    /// apply.
    pub fn task(
        &mut self,
        start: Expression,
        explanation: Metadata,
        depends_on: &[&Task],
        producer: &dyn StepsProducer,
    ) -> Result<Option<Task>, Error> {
        let (id, start) = self.next_start(start);
        let Some(steps) = producer.produce_steps(self.ctx, &start)? else {
            return Ok(None);
        };
        let mut builder = StepsBuilder::new(start.clone());
        builder.add_steps(steps)?;
        let Some(steps) = builder.finish() else {
            return Ok(None);
        };
        Ok(Some(self.push(id, start, explanation, depends_on, steps)))
    }

    /// Adds a task that runs `producer` on `start`. If the producer does not apply, the task
    /// has no steps and its result is `start`.
    pub fn task_with_optional_steps(
        &mut self,
        start: Expression,
        explanation: Metadata,
        depends_on: &[&Task],
        producer: &dyn StepsProducer,
    ) -> Result<Task, Error> {
        let (id, start) = self.next_start(start);
        let mut builder = StepsBuilder::new(start.clone());
        if let Some(steps) = producer.produce_steps(self.ctx, &start)? {
            builder.add_steps(steps)?;
        }
        let steps = builder.finish().unwrap_or_default();
        Ok(self.push(id, start, explanation, depends_on, steps))
    }

    /// Takes the tasks added so far, or `None` if there are none.
    pub fn all_tasks(&mut self) -> Option<Vec<Task>> {
        let tasks = mem::take(&mut self.tasks);
        (!tasks.is_empty()).then_some(tasks)
    }
}

type TasksFn = dyn Fn(&mut TasksBuilder<'_>) -> Result<Option<Vec<Task>>, Error> + Send + Sync;

/// A named strategy that splits the work into tasks, each working on its own expression.
///
/// The result of the task set is the result of its last task. If the closure returns `None`,
/// typically because a task it needed did not apply, the whole task set does not apply.
pub struct TaskSet {
    name: String,
    pattern: Pattern,
    explanation: Option<MetadataMaker>,
    tasks: Box<TasksFn>,
}

impl TaskSet {
    pub fn new(
        name: impl Into<String>,
        tasks: impl Fn(&mut TasksBuilder<'_>) -> Result<Option<Vec<Task>>, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: any(),
            explanation: None,
            tasks: Box::new(tasks),
        }
    }

    /// Only applies to subexpressions matching `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<MetadataMaker>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Applies the task set to `sub`.
    pub fn apply(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        let Some(m) = self.pattern.first_match(ctx, sub)? else {
            return Ok(None);
        };
        let mut builder = TasksBuilder::new(ctx, sub, &m);
        let Some(tasks) = (self.tasks)(&mut builder)? else {
            return Ok(None);
        };
        let Some(last) = tasks.last() else {
            return Ok(None);
        };

        let to = MappedExpression::with_sources(
            last.result().expr,
            vec![sub.path.clone()],
            PathMappingType::Combine,
        );
        let mut result = Transformation::new(TransformationKind::TaskSet, sub.clone(), to).with_tasks(tasks);
        if let Some(explanation) = &self.explanation {
            result = result.with_explanation(explanation.make(&m)?);
        }

        tracing::debug!(task_set = %self.name, path = %sub.path, tasks = result.tasks.len(), "completed task set");
        Ok(Some(result))
    }
}

impl Method for TaskSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_execute(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Transformation>, Error> {
        self.apply(ctx, sub)
    }
}

impl fmt::Debug for TaskSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSet")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
