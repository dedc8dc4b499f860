//! The recorded result of a rewrite.
//!
//! A [`Transformation`] says what an expression was rewritten into, why, and, for composite
//! strategies, through which intermediate steps or sub-tasks.

use crate::{
    error::Error,
    expr::{Path, Subexpression},
    mapping::{MappedExpression, PathMapping, PathMappingType},
    pattern::{Match, Pattern},
};
use std::fmt;

/// What produced a [`Transformation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationKind {
    /// An atomic rewrite that cannot be decomposed further.
    Rule,

    /// A chain of steps, each rewriting the result of the previous one.
    Plan,

    /// A set of tasks, each working on its own expression. The last task holds the result.
    TaskSet,
}

/// Extra information about a transformation, used by renderers to decide how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Only the operands of a commutative operator were rearranged.
    Rearrangement,

    /// Only the appearance changed, for example by adding clarifying brackets.
    Cosmetic,

    /// The step exists only to make the output more consistent.
    Pedantic,

    /// The step makes no visible change and should be squashed into the next one.
    InvisibleChange,
}

/// An opaque identifier for an explanation or a skill, of the form `Category.Key`.
///
/// The text behind a key is looked up by an external translation service; the engine only
/// compares and passes keys around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataKey {
    category: &'static str,
    key: &'static str,
}

impl MetadataKey {
    /// Creates a key.
    pub const fn new(category: &'static str, key: &'static str) -> Self {
        Self { category, key }
    }

    /// The category of the key.
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// The name of the key inside its category.
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.key)
    }
}

/// An explanation or skill: a key plus the parts of the expression that fill in its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The key of the message.
    pub key: MetadataKey,

    /// The message parameters, in order.
    pub params: Vec<Subexpression>,
}

impl Metadata {
    /// Creates metadata from a key and its parameters.
    pub fn new(key: MetadataKey, params: Vec<Subexpression>) -> Self {
        Self { key, params }
    }

    /// Metadata without parameters.
    pub fn from_key(key: MetadataKey) -> Self {
        Self::new(key, Vec::new())
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.params.is_empty() {
            let params = self.params.iter().map(|p| p.expr.to_string()).collect::<Vec<_>>();
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}

/// Builds [`Metadata`] from a match, using the subexpressions bound to a list of patterns as
/// parameters.
#[derive(Debug, Clone)]
pub struct MetadataMaker {
    key: MetadataKey,
    params: Vec<Pattern>,
}

impl MetadataMaker {
    /// A maker for the given key and parameter patterns.
    pub fn new(key: MetadataKey, params: Vec<Pattern>) -> Self {
        Self { key, params }
    }

    /// Builds the metadata, failing if a parameter pattern is not bound in `m`.
    pub fn make(&self, m: &Match) -> Result<Metadata, Error> {
        let params = self
            .params
            .iter()
            .map(|p| m.bound(p).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Metadata::new(self.key, params))
    }
}

impl From<MetadataKey> for MetadataMaker {
    fn from(key: MetadataKey) -> Self {
        Self::new(key, Vec::new())
    }
}

/// An independently addressed sub-computation of a task set.
///
/// The start expression of a task sits at the task's own path root (`#id`), so the paths in its
/// steps never collide with the paths of the main expression or of other tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The identifier of the task, without the leading `#`.
    pub id: String,

    /// The expression the task starts from.
    pub start: Subexpression,

    /// What the task does.
    pub explanation: Option<Metadata>,

    /// The steps of the task.
    pub steps: Vec<Transformation>,

    /// The identifiers of the tasks whose results this task uses.
    pub depends_on: Vec<String>,
}

impl Task {
    /// The root path of the task.
    pub fn path(&self) -> Path {
        Path::task(self.id.clone())
    }

    /// The result of the task: the result of its last step, or its start expression if it has no
    /// steps.
    pub fn result(&self) -> Subexpression {
        match self.steps.last() {
            Some(step) => step.result(),
            None => self.start.clone(),
        }
    }
}

/// Another way of reaching a result, found by a competing strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAlternative {
    /// The strategy, described by its explanation.
    pub strategy: Metadata,

    /// The steps the strategy took, from the same subexpression as the main transformation.
    pub steps: Vec<Transformation>,
}

/// The recorded result of applying a rule or a strategy to a subexpression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    /// What produced the transformation.
    pub kind: TransformationKind,

    /// Presentation hints.
    pub tags: Vec<Tag>,

    /// The subexpression that was rewritten.
    pub from: Subexpression,

    /// What it was rewritten into, with provenance relative to `from`.
    pub to: MappedExpression,

    /// The intermediate steps, for plans.
    pub steps: Vec<Transformation>,

    /// The sub-tasks, for task sets.
    pub tasks: Vec<Task>,

    /// Why the transformation was made.
    pub explanation: Option<Metadata>,

    /// The skills the transformation exercises.
    pub skills: Vec<Metadata>,

    /// The results of other strategies that also applied.
    pub alternatives: Vec<StrategyAlternative>,
}

impl Transformation {
    /// A transformation of the given kind, without explanation, steps or tasks.
    pub fn new(kind: TransformationKind, from: Subexpression, to: MappedExpression) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            from,
            to,
            steps: Vec::new(),
            tasks: Vec::new(),
            explanation: None,
            skills: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// A leaf transformation produced by a rule.
    pub fn rule(from: Subexpression, to: MappedExpression) -> Self {
        Self::new(TransformationKind::Rule, from, to)
    }

    /// A composite transformation whose result is the result of its last step. Each step must
    /// start from the subexpression `from`.
    ///
    /// The result is described as a whole as a combination of `from`; the detailed provenance
    /// lives in the steps.
    pub fn plan(from: Subexpression, steps: Vec<Transformation>) -> Option<Self> {
        let last = steps.last()?;
        let to = MappedExpression::with_sources(
            last.to.expr.clone(),
            vec![from.path.clone()],
            PathMappingType::Combine,
        );
        Some(Self { steps, ..Self::new(TransformationKind::Plan, from, to) })
    }

    /// Sets the explanation.
    pub fn with_explanation(mut self, explanation: Metadata) -> Self {
        self.explanation = Some(explanation);
        self
    }

    /// Adds skills.
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = Metadata>) -> Self {
        self.skills.extend(skills);
        self
    }

    /// Adds tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Sets the intermediate steps.
    pub fn with_steps(mut self, steps: Vec<Transformation>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the alternatives.
    pub fn with_alternatives(mut self, alternatives: Vec<StrategyAlternative>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Sets the sub-tasks.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Returns true if the transformation carries the tag.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// The result, located where the rewritten subexpression was.
    pub fn result(&self) -> Subexpression {
        Subexpression::new(self.from.path.clone(), self.to.expr.clone())
    }

    /// The provenance of the result, in the coordinates of the expression `from` belongs to.
    pub fn path_mappings(&self) -> Vec<PathMapping> {
        self.to.merged_path_mappings(&self.from.path)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(f, "{}{:?}", indent, self.kind)?;
        if let Some(explanation) = &self.explanation {
            write!(f, " {}", explanation)?;
        }
        write!(f, " at {}: {} -> {}", self.from.path, self.from.expr, self.to.expr)?;
        if !self.tags.is_empty() {
            write!(f, " {:?}", self.tags)?;
        }
        writeln!(f)?;

        for step in &self.steps {
            step.fmt_indented(f, depth + 1)?;
        }
        for task in &self.tasks {
            write!(f, "{}  Task {}", indent, task.path())?;
            if let Some(explanation) = &task.explanation {
                write!(f, " {}", explanation)?;
            }
            if !task.depends_on.is_empty() {
                let deps = task.depends_on.iter().map(|id| format!("#{}", id)).collect::<Vec<_>>();
                write!(f, " (uses {})", deps.join(", "))?;
            }
            writeln!(f, ": {}", task.start.expr)?;
            for step in &task.steps {
                step.fmt_indented(f, depth + 2)?;
            }
        }
        for alternative in &self.alternatives {
            writeln!(f, "{}  Alternative {}", indent, alternative.strategy)?;
            for step in &alternative.steps {
                step.fmt_indented(f, depth + 2)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
