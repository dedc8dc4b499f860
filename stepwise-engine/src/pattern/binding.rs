use super::{Pattern, PatternId};
use crate::{
    error::{Error, NotAnInteger, UnboundPattern},
    expr::Subexpression,
};
use rug::Integer;
use std::{fmt, sync::Arc};

/// One link of a [`Match`] chain.
struct Binding {
    pattern: PatternId,
    sub: Subexpression,
    parent: Match,
}

/// An immutable chain of bindings from patterns to the subexpressions they matched.
///
/// Extending a match with [`Match::bind`] returns a new chain that shares every existing link,
/// so the many candidate matches explored by a backtracking search never copy each other.
#[derive(Clone, Default)]
pub struct Match(Option<Arc<Binding>>);

impl Match {
    /// The empty match, with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new match with `pattern` bound to `sub` in addition to all bindings of this one.
    pub fn bind(&self, pattern: &Pattern, sub: Subexpression) -> Self {
        Self(Some(Arc::new(Binding {
            pattern: pattern.id(),
            sub,
            parent: self.clone(),
        })))
    }

    /// Iterates over the links of the chain, newest first.
    fn links(&self) -> impl Iterator<Item = &Binding> {
        let mut current = self.0.as_deref();
        std::iter::from_fn(move || {
            let binding = current?;
            current = binding.parent.0.as_deref();
            Some(binding)
        })
    }

    /// The subexpression most recently bound to `pattern`.
    pub fn last_binding(&self, pattern: &Pattern) -> Option<&Subexpression> {
        let id = pattern.id();
        self.links()
            .find(|binding| binding.pattern == id)
            .map(|binding| &binding.sub)
    }

    /// Returns true if `pattern` is bound in this match.
    pub fn is_bound(&self, pattern: &Pattern) -> bool {
        self.last_binding(pattern).is_some()
    }

    /// Every subexpression bound to `pattern`, oldest first.
    pub fn bound_subexpressions(&self, pattern: &Pattern) -> Vec<&Subexpression> {
        let id = pattern.id();
        let mut subs = self.links()
            .filter(|binding| binding.pattern == id)
            .map(|binding| &binding.sub)
            .collect::<Vec<_>>();
        subs.reverse();
        subs
    }

    /// The subexpression most recently bound to `pattern`, failing if it was never bound.
    pub fn bound(&self, pattern: &Pattern) -> Result<&Subexpression, Error> {
        self.last_binding(pattern)
            .ok_or_else(|| UnboundPattern { pattern: pattern.id().0 }.into())
    }

    /// The value of the signed integer bound to `pattern`.
    pub fn integer(&self, pattern: &Pattern) -> Result<Integer, Error> {
        let sub = self.bound(pattern)?;
        sub.expr.signed_integer().ok_or_else(|| NotAnInteger {
            pattern: pattern.id().0,
            expr: sub.expr.to_string(),
        }.into())
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for binding in self.links() {
            list.entry(&format_args!("#{} => {} at {}", binding.pattern.0, binding.sub.expr, binding.sub.path));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{expr::{Expression, Path}, pattern::any};
    use pretty_assertions::assert_eq;
    use super::*;

    fn at(path: &str, expr: Expression) -> Subexpression {
        Subexpression::new(path.parse::<Path>().unwrap(), expr)
    }

    #[test]
    fn bindings_are_persistent() {
        let p = any();
        let q = any();
        let root = Match::new();
        let first = root.bind(&p, at("./0", Expression::integer(1)));
        let second = first.bind(&p, at("./1", Expression::integer(1)));

        assert!(!root.is_bound(&p));
        assert_eq!(first.bound_subexpressions(&p).len(), 1);
        assert_eq!(second.last_binding(&p).unwrap().path.to_string(), "./1");
        assert_eq!(
            second.bound_subexpressions(&p).iter().map(|s| s.path.to_string()).collect::<Vec<_>>(),
            vec!["./0", "./1"],
        );
        assert!(second.last_binding(&q).is_none());
    }

    #[test]
    fn reading_values() {
        let p = any();
        let m = Match::new().bind(&p, at(".", Expression::integer(-12)));
        assert_eq!(m.integer(&p).unwrap(), Integer::from(-12));

        let q = any();
        assert_eq!(m.bound(&q).unwrap_err(), UnboundPattern { pattern: q.id().0 }.into());

        let m = m.bind(&q, at(".", Expression::variable("x")));
        assert!(matches!(m.integer(&q), Err(Error::NotAnInteger(_))));
    }
}
