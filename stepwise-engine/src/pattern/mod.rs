//! Patterns: composable searches that bind parts of an expression.
//!
//! A [`Pattern`] is matched against a [`Subexpression`] and an incoming [`Match`]; every
//! successful match is handed to a visitor callback, in a fixed order: left to right, shallow to
//! deep, and options in the order they were declared. The visitor returns
//! [`ControlFlow::Break`] to stop the search early, which is how "first match wins" is
//! implemented without exploring the rest of the search space.
//!
//! Every pattern has a unique identity ([`PatternId`]), and binds itself to the subexpression it
//! matched. Matching a pattern that is already bound only succeeds if the new subexpression is
//! equivalent to the bound one, so using the same pattern twice expresses "these two parts must
//! be equal".

mod binding;
mod nary;

pub use binding::Match;
pub use nary::{
    commutative_product_of,
    commutative_sum_containing,
    commutative_sum_of,
    product_containing,
    product_of,
    sum_containing,
    sum_of,
    NaryPattern,
};

use crate::{
    context::Context,
    error::Error,
    expr::{Expression, Operator, OperatorKind, Subexpression, TraversalOrder},
};
use rug::Integer;
use std::{
    fmt,
    ops::ControlFlow,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// The callback invoked with each match found by [`Pattern::find_matches`].
pub type Visitor<'a> = dyn FnMut(Match) -> Result<ControlFlow<()>, Error> + 'a;

/// A predicate over a candidate subexpression and the bindings made so far.
pub type ConditionFn = Arc<dyn Fn(&Subexpression, &Match) -> bool + Send + Sync>;

/// The unique identity of a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(usize);

impl PatternId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// How the operand patterns of an n-ary pattern are assigned to the operands of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaryMode {
    /// The expression may have more operands than there are patterns.
    pub partial: bool,

    /// The operands may be matched in any order.
    pub commutative: bool,
}

enum PatternKind {
    Fixed(Expression),
    Any,
    Integer,
    SignedInteger,
    Decimal,
    Variable,
    OfKind(OperatorKind),
    Condition(Pattern, ConditionFn),
    OneOf(Vec<Pattern>),
    AllOf(Vec<Pattern>),
    Find(Pattern, TraversalOrder),
    Operator(OperatorKind, Vec<Pattern>),
    Nary(Operator, Vec<Pattern>, NaryMode),
}

struct PatternData {
    id: PatternId,
    kind: PatternKind,
}

/// A search for a shape inside an expression. Cloning a pattern keeps its identity.
#[derive(Clone)]
pub struct Pattern(Arc<PatternData>);

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.0.kind {
            PatternKind::Fixed(expr) => return write!(f, "Pattern#{}(`{}`)", self.id().0, expr),
            PatternKind::Any => "Any",
            PatternKind::Integer => "Integer",
            PatternKind::SignedInteger => "SignedInteger",
            PatternKind::Decimal => "Decimal",
            PatternKind::Variable => "Variable",
            PatternKind::OfKind(_) => "OfKind",
            PatternKind::Condition(..) => "Condition",
            PatternKind::OneOf(_) => "OneOf",
            PatternKind::AllOf(_) => "AllOf",
            PatternKind::Find(..) => "Find",
            PatternKind::Operator(..) => "Operator",
            PatternKind::Nary(..) => "Nary",
        };
        write!(f, "Pattern#{}({})", self.id().0, name)
    }
}

impl Pattern {
    fn new(kind: PatternKind) -> Self {
        Self(Arc::new(PatternData { id: PatternId::next(), kind }))
    }

    /// The identity of this pattern.
    pub fn id(&self) -> PatternId {
        self.0.id
    }

    /// Finds every match of this pattern against `sub`, extending `incoming`, and hands each one
    /// to `visit`. Returns [`ControlFlow::Break`] if the visitor stopped the search.
    pub fn find_matches(
        &self,
        ctx: &Context,
        sub: &Subexpression,
        incoming: &Match,
        visit: &mut Visitor<'_>,
    ) -> Result<ControlFlow<()>, Error> {
        if let Some(previous) = incoming.last_binding(self) {
            if !previous.expr.equiv(&sub.expr) {
                return Ok(ControlFlow::Continue(()));
            }
        }

        match &self.0.kind {
            PatternKind::Fixed(expr) => self.visit_if(sub.expr.equiv(expr), sub, incoming, visit),
            PatternKind::Any => self.visit_if(true, sub, incoming, visit),
            PatternKind::Integer => self.visit_if(sub.expr.as_integer().is_some(), sub, incoming, visit),
            PatternKind::SignedInteger => {
                self.visit_if(sub.expr.signed_integer().is_some(), sub, incoming, visit)
            },
            PatternKind::Decimal => {
                let matched = matches!(sub.expr.operator(), Operator::Decimal(_));
                self.visit_if(matched, sub, incoming, visit)
            },
            PatternKind::Variable => {
                let matched = matches!(sub.expr.operator(), Operator::Variable(_));
                self.visit_if(matched, sub, incoming, visit)
            },
            PatternKind::OfKind(kind) => self.visit_if(sub.expr.kind() == *kind, sub, incoming, visit),
            PatternKind::Condition(inner, condition) => {
                inner.find_matches(ctx, sub, incoming, &mut |m| {
                    if condition(sub, &m) {
                        visit(m.bind(self, sub.clone()))
                    } else {
                        Ok(ControlFlow::Continue(()))
                    }
                })
            },
            PatternKind::OneOf(options) => {
                let bound = incoming.bind(self, sub.clone());
                for option in options {
                    if option.find_matches(ctx, sub, &bound, visit)?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            },
            PatternKind::AllOf(patterns) => {
                let bound = incoming.bind(self, sub.clone());
                match_all(ctx, sub, patterns, &bound, visit)
            },
            PatternKind::Find(inner, order) => {
                for candidate in sub.traverse(*order) {
                    ctx.checkpoint()?;
                    let flow = inner.find_matches(ctx, &candidate, incoming, &mut |m| {
                        visit(m.bind(self, sub.clone()))
                    })?;
                    if flow.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            },
            PatternKind::Operator(kind, children) => {
                if sub.expr.kind() != *kind || sub.expr.children().len() != children.len() {
                    return Ok(ControlFlow::Continue(()));
                }
                let bound = incoming.bind(self, sub.clone());
                match_in_order(ctx, &sub.children(), children, &bound, visit)
            },
            PatternKind::Nary(operator, operands, mode) => {
                let count = sub.expr.children().len();
                if sub.expr.operator() != operator
                    || count < operands.len()
                    || (!mode.partial && count > operands.len())
                {
                    return Ok(ControlFlow::Continue(()));
                }
                let bound = incoming.bind(self, sub.clone());
                let children = sub.children();
                if mode.commutative {
                    match_commutative(ctx, &children, operands, &vec![false; count], &bound, visit)
                } else {
                    match_ordered(ctx, &children, operands, 0, mode.partial, &bound, visit)
                }
            },
        }
    }

    /// Binds this pattern to `sub` and visits the result if `matched` holds.
    fn visit_if(
        &self,
        matched: bool,
        sub: &Subexpression,
        incoming: &Match,
        visit: &mut Visitor<'_>,
    ) -> Result<ControlFlow<()>, Error> {
        if matched {
            visit(incoming.bind(self, sub.clone()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    }

    /// The first match of this pattern against `sub`, if any.
    pub fn first_match(&self, ctx: &Context, sub: &Subexpression) -> Result<Option<Match>, Error> {
        let mut found = None;
        self.find_matches(ctx, sub, &Match::new(), &mut |m| {
            found = Some(m);
            Ok(ControlFlow::Break(()))
        })?;
        Ok(found)
    }

    /// Every match of this pattern against `sub`, in search order.
    pub fn matches(&self, ctx: &Context, sub: &Subexpression) -> Result<Vec<Match>, Error> {
        let mut found = Vec::new();
        self.find_matches(ctx, sub, &Match::new(), &mut |m| {
            found.push(m);
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(found)
    }

    /// Returns true if this pattern matches `sub` at least once.
    pub fn is_match(&self, ctx: &Context, sub: &Subexpression) -> Result<bool, Error> {
        Ok(self.first_match(ctx, sub)?.is_some())
    }
}

/// Matches `patterns` one after the other against the same subexpression.
fn match_all(
    ctx: &Context,
    sub: &Subexpression,
    patterns: &[Pattern],
    incoming: &Match,
    visit: &mut Visitor<'_>,
) -> Result<ControlFlow<()>, Error> {
    let Some((first, rest)) = patterns.split_first() else {
        return visit(incoming.clone());
    };
    first.find_matches(ctx, sub, incoming, &mut |m| match_all(ctx, sub, rest, &m, visit))
}

/// Matches `patterns[i]` against `children[i]` for every `i`.
fn match_in_order(
    ctx: &Context,
    children: &[Subexpression],
    patterns: &[Pattern],
    incoming: &Match,
    visit: &mut Visitor<'_>,
) -> Result<ControlFlow<()>, Error> {
    let (Some((child, other_children)), Some((first, rest))) = (children.split_first(), patterns.split_first()) else {
        return visit(incoming.clone());
    };
    first.find_matches(ctx, child, incoming, &mut |m| {
        match_in_order(ctx, other_children, rest, &m, visit)
    })
}

/// Assigns `patterns` to operands at strictly increasing indices, starting at `start`. Without
/// `partial`, every pattern must match the operand right after the previous one.
fn match_ordered(
    ctx: &Context,
    children: &[Subexpression],
    patterns: &[Pattern],
    start: usize,
    partial: bool,
    incoming: &Match,
    visit: &mut Visitor<'_>,
) -> Result<ControlFlow<()>, Error> {
    let Some((first, rest)) = patterns.split_first() else {
        return visit(incoming.clone());
    };

    // leave enough operands for the remaining patterns
    let last = if partial { children.len() - patterns.len() } else { start };
    for index in start..=last {
        ctx.checkpoint()?;
        let flow = first.find_matches(ctx, &children[index], incoming, &mut |m| {
            match_ordered(ctx, children, rest, index + 1, partial, &m, visit)
        })?;
        if flow.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Assigns each of `patterns` in turn to any operand not used yet.
fn match_commutative(
    ctx: &Context,
    children: &[Subexpression],
    patterns: &[Pattern],
    used: &[bool],
    incoming: &Match,
    visit: &mut Visitor<'_>,
) -> Result<ControlFlow<()>, Error> {
    let Some((first, rest)) = patterns.split_first() else {
        return visit(incoming.clone());
    };

    for index in (0..children.len()).filter(|&index| !used[index]) {
        ctx.checkpoint()?;
        let mut now_used = used.to_vec();
        now_used[index] = true;
        let flow = first.find_matches(ctx, &children[index], incoming, &mut |m| {
            match_commutative(ctx, children, rest, &now_used, &m, visit)
        })?;
        if flow.is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Matches exactly the given expression, up to bracket kinds.
pub fn fixed(expr: Expression) -> Pattern {
    Pattern::new(PatternKind::Fixed(expr))
}

/// Matches any expression.
pub fn any() -> Pattern {
    Pattern::new(PatternKind::Any)
}

/// Matches a non-negative integer literal.
pub fn integer() -> Pattern {
    Pattern::new(PatternKind::Integer)
}

/// Matches an integer literal or the negation of one.
pub fn signed_integer() -> Pattern {
    Pattern::new(PatternKind::SignedInteger)
}

/// Matches a decimal literal.
pub fn decimal() -> Pattern {
    Pattern::new(PatternKind::Decimal)
}

/// Matches a variable.
pub fn variable() -> Pattern {
    Pattern::new(PatternKind::Variable)
}

/// Matches any expression whose operator is of the given kind.
pub fn of_kind(kind: OperatorKind) -> Pattern {
    Pattern::new(PatternKind::OfKind(kind))
}

/// Matches what `inner` matches, when `condition` holds for the matched subexpression.
pub fn condition(
    inner: Pattern,
    condition: impl Fn(&Subexpression, &Match) -> bool + Send + Sync + 'static,
) -> Pattern {
    Pattern::new(PatternKind::Condition(inner, Arc::new(condition)))
}

/// Matches an integer pattern whose signed value satisfies `condition`.
pub fn integer_condition(
    inner: Pattern,
    condition: impl Fn(&Integer) -> bool + Send + Sync + 'static,
) -> Pattern {
    self::condition(inner, move |sub, _| {
        sub.expr.signed_integer().map_or(false, |n| condition(&n))
    })
}

/// Matches what any of the options matches, trying the options in order.
pub fn one_of(options: Vec<Pattern>) -> Pattern {
    Pattern::new(PatternKind::OneOf(options))
}

/// Matches when every one of `patterns` matches the same subexpression.
pub fn all_of(patterns: Vec<Pattern>) -> Pattern {
    Pattern::new(PatternKind::AllOf(patterns))
}

/// Matches `inner` against the subexpression or any of its descendants, in the given order.
pub fn find(inner: Pattern, order: TraversalOrder) -> Pattern {
    Pattern::new(PatternKind::Find(inner, order))
}

/// Matches an expression of the given operator kind whose children match `children`, position
/// by position.
pub fn operator(kind: OperatorKind, children: Vec<Pattern>) -> Pattern {
    Pattern::new(PatternKind::Operator(kind, children))
}

/// Matches a bracket of any kind around `inner`.
pub fn bracket_of(inner: Pattern) -> Pattern {
    operator(OperatorKind::Bracket, vec![inner])
}

/// Matches the fraction `[numerator / denominator]`.
pub fn fraction_of(numerator: Pattern, denominator: Pattern) -> Pattern {
    operator(OperatorKind::Fraction, vec![numerator, denominator])
}

/// Matches the mixed number `[whole numerator/denominator]`.
pub fn mixed_number_of(whole: Pattern, numerator: Pattern, denominator: Pattern) -> Pattern {
    operator(OperatorKind::MixedNumber, vec![whole, numerator, denominator])
}

/// Matches the negation `-inner`.
pub fn negation_of(inner: Pattern) -> Pattern {
    operator(OperatorKind::Minus, vec![inner])
}

/// Matches the power `[base ^ exponent]`.
pub fn power_of(base: Pattern, exponent: Pattern) -> Pattern {
    operator(OperatorKind::Power, vec![base, exponent])
}

#[cfg(test)]
mod tests {
    use crate::{expr::Path, primitive::int};
    use pretty_assertions::assert_eq;
    use super::*;

    fn root(expr: Expression) -> Subexpression {
        Subexpression::root(expr)
    }

    fn sum(terms: Vec<Expression>) -> Expression {
        Expression::sum(terms).unwrap()
    }

    fn fraction(n: i32, d: i32) -> Expression {
        Expression::fraction(Expression::integer(n), Expression::integer(d))
    }

    #[test]
    fn leaf_patterns() {
        let ctx = Context::default();
        let five = root(Expression::integer(5));
        let minus_five = root(Expression::integer(-5));

        assert!(integer().is_match(&ctx, &five).unwrap());
        assert!(!integer().is_match(&ctx, &minus_five).unwrap());
        assert!(signed_integer().is_match(&ctx, &minus_five).unwrap());
        assert!(fixed(Expression::integer(5)).is_match(&ctx, &five).unwrap());
        assert!(!variable().is_match(&ctx, &five).unwrap());
        assert!(of_kind(OperatorKind::Minus).is_match(&ctx, &minus_five).unwrap());
    }

    #[test]
    fn repeated_pattern_requires_equal_values() {
        let ctx = Context::default();
        let d = integer();
        let pattern = operator(OperatorKind::Sum, vec![
            fraction_of(integer(), d.clone()),
            fraction_of(integer(), d.clone()),
        ]);

        let same = root(sum(vec![fraction(1, 4), fraction(3, 4)]));
        let different = root(sum(vec![fraction(1, 4), fraction(3, 5)]));
        let m = pattern.first_match(&ctx, &same).unwrap().unwrap();
        assert!(pattern.first_match(&ctx, &different).unwrap().is_none());

        let bound = m.bound_subexpressions(&d).iter().map(|s| s.path.to_string()).collect::<Vec<_>>();
        assert_eq!(bound, vec!["./0/1", "./1/1"]);
    }

    #[test]
    fn one_of_prefers_declared_order() {
        let ctx = Context::default();
        let n = integer();
        let negative = negation_of(n.clone());
        let pattern = one_of(vec![negative.clone(), n.clone()]);

        let m = pattern.first_match(&ctx, &root(Expression::integer(-3))).unwrap().unwrap();
        assert!(m.is_bound(&negative));
        assert_eq!(m.bound(&n).unwrap().path, Path::from_indices([0]));

        let m = pattern.first_match(&ctx, &root(Expression::integer(3))).unwrap().unwrap();
        assert!(!m.is_bound(&negative));
        assert_eq!(m.bound(&n).unwrap().path, Path::root());
    }

    #[test]
    fn all_of_and_conditions() {
        let ctx = Context::default();
        let even = integer_condition(integer(), |n| n.is_even());
        let big = integer_condition(integer(), |n| *n > 10);
        let pattern = all_of(vec![even, big]);

        assert!(pattern.is_match(&ctx, &root(Expression::integer(12))).unwrap());
        assert!(!pattern.is_match(&ctx, &root(Expression::integer(8))).unwrap());
        assert!(!pattern.is_match(&ctx, &root(Expression::integer(13))).unwrap());
    }

    #[test]
    fn all_of_rejects_conflicting_bindings() {
        let ctx = Context::default();
        let p = integer();
        let pattern = all_of(vec![fraction_of(p.clone(), any()), fraction_of(any(), p.clone())]);

        let m = pattern.first_match(&ctx, &root(fraction(2, 2))).unwrap().unwrap();
        assert_eq!(m.bound(&p).unwrap().path, Path::from_indices([0]));
        assert!(!pattern.is_match(&ctx, &root(fraction(1, 2))).unwrap());
    }

    #[test]
    fn find_respects_order() {
        let ctx = Context::default();
        // (1 + 2) + 3
        let inner = sum(vec![Expression::integer(1), Expression::integer(2)]);
        let sub = root(sum(vec![inner, Expression::integer(3)]));
        let s = of_kind(OperatorKind::Sum);

        let pre = find(s.clone(), TraversalOrder::PreOrder);
        let m = pre.first_match(&ctx, &sub).unwrap().unwrap();
        assert_eq!(m.bound(&s).unwrap().path, Path::root());

        let post = find(s.clone(), TraversalOrder::PostOrder);
        let m = post.first_match(&ctx, &sub).unwrap().unwrap();
        assert_eq!(m.bound(&s).unwrap().path, Path::from_indices([0, 0]));
        assert_eq!(post.matches(&ctx, &sub).unwrap().len(), 2);
    }

    #[test]
    fn matching_stops_when_cancelled() {
        let ctx = Context::default();
        ctx.cancellation().cancel();
        let sub = root(sum(vec![Expression::integer(1), Expression::integer(2)]));
        let error = find(integer(), TraversalOrder::PreOrder).first_match(&ctx, &sub).unwrap_err();
        assert!(error.is_cancelled());
    }

    #[test]
    fn integer_values_in_conditions() {
        let ctx = Context::default();
        let pattern = integer_condition(signed_integer(), |n| *n == int(-2));
        assert!(pattern.is_match(&ctx, &root(Expression::integer(-2))).unwrap());
    }
}
