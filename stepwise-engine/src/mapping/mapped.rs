use super::{merge_path_mappings, PathMapping, PathMappingTree, PathMappingType};
use crate::{
    error::Error,
    expr::{Expression, Operator, Path},
};
use std::fmt;

/// An expression produced by a rewrite, together with the provenance of each of its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedExpression {
    /// The expression.
    pub expr: Expression,

    /// Where each part of the expression came from.
    pub mappings: PathMappingTree,
}

impl MappedExpression {
    /// Pairs an expression with its provenance.
    pub fn new(expr: Expression, mappings: PathMappingTree) -> Self {
        Self { expr, mappings }
    }

    /// New material with no source in the input.
    pub fn introduced(expr: Expression) -> Self {
        Self::new(expr, PathMappingTree::introduced())
    }

    /// Describes the whole expression with one edge of the given kind.
    pub fn with_sources(expr: Expression, paths: Vec<Path>, kind: PathMappingType) -> Self {
        Self::new(expr, PathMappingTree::leaf(paths, kind))
    }

    /// Applies `operator` to the operands, wrapping operands that are not allowed at their
    /// position in round brackets. Each operand keeps its own provenance.
    pub fn with_operator(operator: Operator, operands: Vec<MappedExpression>) -> Result<Self, Error> {
        let (children, trees): (Vec<_>, Vec<_>) = operands
            .into_iter()
            .enumerate()
            .map(|(index, operand)| {
                let operand = operand.wrap_in_brackets_unless(&operator, index);
                (operand.expr, operand.mappings)
            })
            .unzip();
        Ok(Self::new(Expression::new(operator, children)?, PathMappingTree::Parent(trees)))
    }

    /// Like [`MappedExpression::with_operator`], but operands built with the same operator are
    /// spliced into the result instead of being bracketed.
    pub fn flattened(operator: Operator, operands: Vec<MappedExpression>) -> Result<Self, Error> {
        let mut flat = Vec::with_capacity(operands.len());
        for operand in operands {
            if operand.expr.operator() == &operator {
                flat.extend(operand.into_children());
            } else {
                flat.push(operand);
            }
        }
        Self::with_operator(operator, flat)
    }

    /// Splits the expression into its children, each with the provenance of that child.
    pub fn into_children(self) -> Vec<MappedExpression> {
        let trees = self.mappings.child_list(self.expr.children().len());
        let (_, children) = self.expr.into_parts();
        children
            .into_iter()
            .zip(trees)
            .map(|(expr, mappings)| Self::new(expr, mappings))
            .collect()
    }

    /// Returns this expression, or the expression inside round brackets if it may not be the
    /// `index`th child of `parent`. The bracket itself has no provenance of its own.
    pub fn wrap_in_brackets_unless(self, parent: &Operator, index: usize) -> Self {
        if parent.nth_child_allowed(index, self.expr.operator()) {
            self
        } else {
            Self::new(Expression::bracket(self.expr), PathMappingTree::Parent(vec![self.mappings]))
        }
    }

    /// Records that the input parts at `paths` were removed while building this expression.
    pub fn cancelling(self, paths: Vec<Path>) -> Self {
        Self::new(self.expr, self.mappings.cancelling(paths))
    }

    /// The edges of the expression with the expression placed at `origin`, in tree order.
    pub fn path_mappings(&self, origin: &Path) -> Vec<PathMapping> {
        self.mappings.path_mappings(origin)
    }

    /// The edges of the expression with the expression placed at `origin`, with equal edges
    /// collapsed and distributed parts unioned (see [`merge_path_mappings`]).
    pub fn merged_path_mappings(&self, origin: &Path) -> Vec<PathMapping> {
        merge_path_mappings(self.path_mappings(origin))
    }
}

impl fmt::Display for MappedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
