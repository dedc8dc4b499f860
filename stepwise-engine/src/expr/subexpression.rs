use super::{
    iter::{PostOrderIter, PreOrderIter, TraversalOrder},
    Expression,
    Path,
};
use crate::{
    error::{Error, InvalidPath},
    mapping::{MappedExpression, PathMappingTree, PathMappingType},
};

/// An expression node together with the path at which it sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subexpression {
    /// The address of the node.
    pub path: Path,

    /// The node itself.
    pub expr: Expression,
}

impl Subexpression {
    /// Creates a located node.
    pub fn new(path: Path, expr: Expression) -> Self {
        Self { path, expr }
    }

    /// Places the expression at the root of the main expression.
    pub fn root(expr: Expression) -> Self {
        Self::new(Path::root(), expr)
    }

    /// The `index`th child of this node.
    pub fn child(&self, index: usize) -> Option<Subexpression> {
        self.expr
            .child(index)
            .map(|child| Self::new(self.path.child(index), child.clone()))
    }

    /// All children of this node.
    pub fn children(&self) -> Vec<Subexpression> {
        self.expr
            .children()
            .iter()
            .enumerate()
            .map(|(index, child)| Self::new(self.path.child(index), child.clone()))
            .collect()
    }

    /// The position of this node in its parent, or `None` if it sits at a root.
    pub fn index(&self) -> Option<usize> {
        self.path.last_index()
    }

    fn invalid_path(&self, path: &Path) -> Error {
        InvalidPath { path: path.to_string(), root: self.path.to_string() }.into()
    }

    /// The descendant of this node at the given absolute path.
    pub fn at(&self, path: &Path) -> Result<Subexpression, Error> {
        if !path.has_ancestor(&self.path) {
            return Err(self.invalid_path(path));
        }
        self.expr
            .get(&path.indices()[self.path.len()..])
            .map(|expr| Self::new(path.clone(), expr.clone()))
            .ok_or_else(|| self.invalid_path(path))
    }

    /// This node, unchanged, as the result of a rewrite: one `Move` edge from its own path.
    pub fn to_mapped(&self) -> MappedExpression {
        MappedExpression::new(
            self.expr.clone(),
            PathMappingTree::leaf(vec![self.path.clone()], PathMappingType::Move),
        )
    }

    /// Replaces the descendant at the absolute path `at` with `replacement`, rebuilding every
    /// ancestor between `at` and this node.
    ///
    /// Untouched children carry `Move` edges from their current paths, and the replacement keeps
    /// its own edges. A replacement that is not allowed at its position is wrapped in round
    /// brackets.
    pub fn substitute(
        &self,
        at: &Path,
        replacement: MappedExpression,
    ) -> Result<MappedExpression, Error> {
        if !at.has_ancestor(&self.path) {
            return Err(self.invalid_path(at));
        }
        self.substitute_below(at, replacement)
    }

    fn substitute_below(
        &self,
        at: &Path,
        replacement: MappedExpression,
    ) -> Result<MappedExpression, Error> {
        let Some(&index) = at.indices().get(self.path.len()) else {
            return Ok(replacement);
        };
        let child = self.child(index).ok_or_else(|| self.invalid_path(at))?;
        let mut replaced = Some(child.substitute_below(at, replacement)?);

        let operands = self
            .children()
            .into_iter()
            .map(|child| match child.index() {
                Some(i) if i == index => replaced.take().unwrap_or_else(|| child.to_mapped()),
                _ => child.to_mapped(),
            })
            .collect();
        MappedExpression::with_operator(self.expr.operator().clone(), operands)
    }

    /// Replaces the descendant at `at` and returns the result located at this node's path.
    pub fn substituted(&self, at: &Path, replacement: MappedExpression) -> Result<Subexpression, Error> {
        let mapped = self.substitute(at, replacement)?;
        Ok(Self::new(self.path.clone(), mapped.expr))
    }

    /// Iterates over this node and its descendants, parents first.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self.path.clone(), &self.expr)
    }

    /// Iterates over this node and its descendants, children first.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self.path.clone(), &self.expr)
    }

    /// Iterates over this node and its descendants in the given order.
    pub fn traverse(&self, order: TraversalOrder) -> Box<dyn Iterator<Item = Subexpression> + '_> {
        match order {
            TraversalOrder::PreOrder => Box::new(self.pre_order_iter()),
            TraversalOrder::PostOrder => Box::new(self.post_order_iter()),
        }
    }
}
