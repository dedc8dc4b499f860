use super::{Expression, Path, Subexpression};

/// The order in which a deep search visits the nodes of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Parents before their children.
    #[default]
    PreOrder,

    /// Children before their parents.
    PostOrder,
}

/// An iterator that traverses the tree of expressions in left-to-right pre-order, yielding each
/// node as a [`Subexpression`] addressed by its path.
///
/// This iterator is created by [`Subexpression::pre_order_iter`].
pub struct PreOrderIter<'a> {
    stack: Vec<(Path, &'a Expression)>,
}

impl<'a> PreOrderIter<'a> {
    /// Creates a new iterator rooted at the given node.
    pub fn new(path: Path, expr: &'a Expression) -> Self {
        Self { stack: vec![(path, expr)] }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = Subexpression;

    fn next(&mut self) -> Option<Self::Item> {
        let (path, expr) = self.stack.pop()?;
        for (index, child) in expr.children().iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }
        Some(Subexpression::new(path, expr.clone()))
    }
}

/// An iterator that traverses the tree of expressions in left-to-right post-order (i.e.
/// depth-first), yielding each node as a [`Subexpression`] addressed by its path.
///
/// This iterator is created by [`Subexpression::post_order_iter`].
pub struct PostOrderIter<'a> {
    stack: Vec<(Path, &'a Expression)>,
    last_visited: Option<&'a Expression>,
}

impl<'a> PostOrderIter<'a> {
    /// Creates a new iterator rooted at the given node.
    pub fn new(path: Path, expr: &'a Expression) -> Self {
        Self { stack: vec![(path, expr)], last_visited: None }
    }

    /// Pops the current node in the stack and marks it as the last visited node.
    fn visit(&mut self) -> Option<Subexpression> {
        let (path, expr) = self.stack.pop()?;
        self.last_visited = Some(expr);
        Some(Subexpression::new(path, expr.clone()))
    }

    /// Returns true if the given node is the last visited node.
    fn is_last_visited(&self, expr: &'a Expression) -> bool {
        match self.last_visited {
            Some(last_visited) => std::ptr::eq(last_visited, expr),
            None => false,
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = Subexpression;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (path, expr) = self.stack.last()?;
            let (path, expr) = (path.clone(), *expr);
            match expr.children().last() {
                None => return self.visit(),
                Some(last) if self.is_last_visited(last) => return self.visit(),
                Some(_) => {
                    for (index, child) in expr.children().iter().enumerate().rev() {
                        self.stack.push((path.child(index), child));
                    }
                },
            }
        }
    }
}
