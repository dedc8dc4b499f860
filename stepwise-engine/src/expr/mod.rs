//! The expression tree that rules rewrite, and the paths that address its nodes.
//!
//! An [`Expression`] is immutable once built. Every constructor checks the operator's arity and
//! its per-position child rules (see [`Operator::nth_child_allowed`]), so a malformed tree cannot
//! be represented. The bracketing helpers ([`Expression::sum`], [`Expression::product`],
//! [`Expression::power`], ...) insert round brackets around children that would otherwise be
//! rejected.

pub mod iter;
pub mod operator;
pub mod path;
pub mod subexpression;

pub use iter::TraversalOrder;
pub use operator::{Arity, BracketKind, Operator, OperatorKind};
pub use path::{Path, PathRoot};
pub use subexpression::Subexpression;

use crate::{
    error::{ChildCount, Error, InvalidChild},
    primitive::{Decimal, SignedDecimal},
};
use rug::Integer;
use std::fmt;

/// An expression node: an operator applied to an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    operator: Operator,
    children: Vec<Expression>,
}

impl Expression {
    /// Builds an expression, checking the arity of the operator and the position rule of every
    /// child.
    pub fn new(operator: Operator, children: Vec<Expression>) -> Result<Self, Error> {
        let arity = operator.arity();
        if children.len() < arity.min() || children.len() > arity.max() {
            return Err(ChildCount {
                operator: operator.name(),
                min: arity.min(),
                max: arity.max(),
                found: children.len(),
            }.into());
        }

        if let Some((index, child)) = children
            .iter()
            .enumerate()
            .find(|(index, child)| !operator.nth_child_allowed(*index, &child.operator))
        {
            return Err(InvalidChild {
                operator: operator.name(),
                index,
                child: child.to_string(),
            }.into());
        }

        Ok(Self { operator, children })
    }

    /// Builds an expression, wrapping every child that is not allowed at its position in round
    /// brackets first. Fails only on arity violations.
    pub fn with_brackets(operator: Operator, children: Vec<Expression>) -> Result<Self, Error> {
        let children = children
            .into_iter()
            .enumerate()
            .map(|(index, child)| child.wrap_in_brackets_unless(&operator, index))
            .collect();
        Self::new(operator, children)
    }

    /// Builds a leaf, or a node whose children are known to satisfy the operator's rules.
    fn from_parts(operator: Operator, children: Vec<Expression>) -> Self {
        Self { operator, children }
    }

    /// An integer. Negative values are represented as `Minus(Integer)`.
    pub fn integer<T>(n: T) -> Self
    where
        Integer: From<T>,
    {
        let n = Integer::from(n);
        if n < 0 {
            Self::from_parts(Operator::Minus, vec![Self::from_parts(Operator::Integer(n.abs()), vec![])])
        } else {
            Self::from_parts(Operator::Integer(n), vec![])
        }
    }

    /// A non-negative decimal literal.
    pub fn decimal(value: Decimal) -> Self {
        Self::from_parts(Operator::Decimal(value), vec![])
    }

    /// A decimal with its sign: negative values are represented as `Minus(Decimal)`.
    pub fn signed_decimal(value: SignedDecimal) -> Self {
        let literal = Self::decimal(value.magnitude);
        if value.negative {
            Self::from_parts(Operator::Minus, vec![literal])
        } else {
            literal
        }
    }

    /// A variable.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::from_parts(Operator::Variable(name.into()), vec![])
    }

    /// The mixed number `[whole numerator/denominator]`. Fails with [`InvalidChild`] if a part
    /// is negative; a negative mixed number is the negation of a positive one.
    pub fn mixed_number(whole: Integer, numerator: Integer, denominator: Integer) -> Result<Self, Error> {
        let parts = [whole, numerator, denominator].into_iter().map(Self::integer).collect();
        Self::new(Operator::MixedNumber, parts)
    }

    /// The fraction `[numerator / denominator]`. Any expressions are allowed as parts.
    pub fn fraction(numerator: Expression, denominator: Expression) -> Self {
        Self::from_parts(Operator::Fraction, vec![numerator, denominator])
    }

    /// The power `[base ^ exponent]`, bracketing the base unless it is atomic.
    pub fn power(base: Expression, exponent: Expression) -> Self {
        let base = base.wrap_in_brackets_unless(&Operator::Power, 0);
        Self::from_parts(Operator::Power, vec![base, exponent])
    }

    /// The negation `-x`, bracketing `x` if needed.
    pub fn negate(expr: Expression) -> Self {
        let expr = expr.wrap_in_brackets_unless(&Operator::Minus, 0);
        Self::from_parts(Operator::Minus, vec![expr])
    }

    /// The expression inside round brackets.
    pub fn bracket(expr: Expression) -> Self {
        Self::from_parts(Operator::Bracket(BracketKind::Round), vec![expr])
    }

    /// The sum of the given terms, bracketing terms that are themselves sums.
    pub fn sum(terms: Vec<Expression>) -> Result<Self, Error> {
        Self::with_brackets(Operator::Sum, terms)
    }

    /// The product of the given factors, bracketing factors that bind looser than a product.
    pub fn product(factors: Vec<Expression>) -> Result<Self, Error> {
        Self::with_brackets(Operator::Product, factors)
    }

    /// Returns this expression, or the expression inside round brackets if it may not be the
    /// `index`th child of `parent`.
    pub fn wrap_in_brackets_unless(self, parent: &Operator, index: usize) -> Self {
        if parent.nth_child_allowed(index, &self.operator) {
            self
        } else {
            Self::bracket(self)
        }
    }

    /// The operator of this node.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The kind of the operator of this node.
    pub fn kind(&self) -> OperatorKind {
        self.operator.kind()
    }

    /// The children of this node.
    pub fn children(&self) -> &[Expression] {
        &self.children
    }

    /// The `index`th child of this node.
    pub fn child(&self, index: usize) -> Option<&Expression> {
        self.children.get(index)
    }

    /// Splits the node into its operator and children.
    pub fn into_parts(self) -> (Operator, Vec<Expression>) {
        (self.operator, self.children)
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The descendant reached by following `indices` from this node.
    pub fn get(&self, indices: &[usize]) -> Option<&Expression> {
        indices.iter().try_fold(self, |expr, &index| expr.child(index))
    }

    /// Structural equality after erasing the distinction between bracket kinds.
    pub fn equiv(&self, other: &Expression) -> bool {
        self.operator.equiv(&other.operator)
            && self.children.len() == other.children.len()
            && self.children.iter().zip(&other.children).all(|(a, b)| a.equiv(b))
    }

    /// The value of a non-negative integer literal.
    pub fn as_integer(&self) -> Option<&Integer> {
        match &self.operator {
            Operator::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// The value of an integer literal, or of the negation of one.
    pub fn signed_integer(&self) -> Option<Integer> {
        match &self.operator {
            Operator::Integer(n) => Some(n.clone()),
            Operator::Minus => self.children[0].as_integer().map(|n| Integer::from(-n)),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children = &self.children;
        match &self.operator {
            Operator::Integer(n) => write!(f, "{}", n),
            Operator::Decimal(d) => write!(f, "{}", d),
            Operator::Variable(name) => write!(f, "{}", name),
            Operator::MixedNumber => {
                write!(f, "[{} {}/{}]", children[0], children[1], children[2])
            },
            Operator::Bracket(kind) => {
                let (open, close) = kind.delimiters();
                write!(f, "{}{}{}", open, children[0], close)
            },
            Operator::Plus => write!(f, "+{}", children[0]),
            Operator::Minus => write!(f, "-{}", children[0]),
            Operator::DivideBy => write!(f, ":{}", children[0]),
            Operator::SquareRoot => write!(f, "sqrt[{}]", children[0]),
            Operator::NaturalLog => write!(f, "ln {}", children[0]),
            Operator::Fraction => write!(f, "[{} / {}]", children[0], children[1]),
            Operator::Divide => write!(f, "{} : {}", children[0], children[1]),
            Operator::Power => write!(f, "[{} ^ {}]", children[0], children[1]),
            Operator::Root => write!(f, "root[{}, {}]", children[0], children[1]),
            Operator::Sum => {
                write!(f, "{}", children[0])?;
                for term in &children[1..] {
                    match term.operator {
                        Operator::Minus => write!(f, " - {}", term.children[0])?,
                        _ => write!(f, " + {}", term)?,
                    }
                }
                Ok(())
            },
            Operator::Product => {
                write!(f, "{}", children[0])?;
                for factor in &children[1..] {
                    match factor.operator {
                        Operator::DivideBy => write!(f, " : {}", factor.children[0])?,
                        _ => write!(f, " * {}", factor)?,
                    }
                }
                Ok(())
            },
            Operator::ImplicitProduct => {
                for factor in children {
                    write!(f, "{}", factor)?;
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ErrorCategory, primitive::int};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn display() {
        let mixed = Expression::mixed_number(int(5), int(1), int(4)).unwrap();
        let fraction = Expression::fraction(Expression::integer(2), Expression::integer(3));
        let sum = Expression::sum(vec![mixed, fraction, Expression::integer(-7)]).unwrap();
        assert_eq!(sum.to_string(), "[5 1/4] + [2 / 3] - 7");

        let product = Expression::product(vec![
            Expression::integer(2),
            sum,
            Expression::power(Expression::variable("x"), Expression::integer(2)),
        ]).unwrap();
        assert_eq!(product.to_string(), "2 * ([5 1/4] + [2 / 3] - 7) * [x ^ 2]");

        let decimal = Expression::decimal(Decimal::new(int(125), 2));
        assert_eq!(decimal.to_string(), "1.25");
    }

    #[test]
    fn bracketing_helpers() {
        let inner = Expression::sum(vec![Expression::integer(1), Expression::integer(2)]).unwrap();
        let outer = Expression::sum(vec![inner, Expression::variable("x")]).unwrap();
        assert_eq!(outer.to_string(), "(1 + 2) + x");
        assert_eq!(outer.child(0).unwrap().kind(), OperatorKind::Bracket);

        let base = Expression::fraction(Expression::integer(1), Expression::integer(2));
        assert_eq!(Expression::power(base, Expression::integer(3)).to_string(), "[([1 / 2]) ^ 3]");
    }

    #[test]
    fn reject_invalid_children() {
        let inner = Expression::sum(vec![Expression::integer(1), Expression::integer(2)]).unwrap();
        let error = Expression::new(Operator::Sum, vec![inner, Expression::integer(3)]).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Structural);
        assert!(matches!(error, Error::InvalidChild(InvalidChild { index: 0, .. })));

        let error = Expression::new(Operator::MixedNumber, vec![
            Expression::integer(1),
            Expression::integer(-1),
            Expression::integer(2),
        ]).unwrap_err();
        assert!(matches!(error, Error::InvalidChild(InvalidChild { index: 1, .. })));

        let error = Expression::mixed_number(int(2), int(1), int(-3)).unwrap_err();
        assert_eq!(error, InvalidChild {
            operator: "MixedNumber".to_string(),
            index: 2,
            child: "-3".to_string(),
        }.into());
    }

    #[test]
    fn signed_decimals() {
        let negative = Decimal::from_ratio(&int(-1), &int(2), 2).unwrap();
        let expr = Expression::signed_decimal(negative);
        assert_eq!(expr.kind(), OperatorKind::Minus);
        assert_eq!(expr.to_string(), "-0.50");

        let positive = Decimal::from_ratio(&int(1), &int(4), 2).unwrap();
        assert_eq!(Expression::signed_decimal(positive).to_string(), "0.25");
    }

    #[test]
    fn reject_wrong_arity() {
        let error = Expression::new(Operator::Sum, vec![Expression::integer(1)]).unwrap_err();
        assert_eq!(error, ChildCount {
            operator: "Sum".to_string(),
            min: 2,
            max: operator::MAX_CHILD_COUNT,
            found: 1,
        }.into());

        let error = Expression::new(Operator::Fraction, vec![]).unwrap_err();
        assert!(matches!(error, Error::ChildCount(ChildCount { found: 0, .. })));
    }

    #[test]
    fn equivalence_ignores_bracket_kind() {
        let x = Expression::variable("x");
        let round = Expression::new(Operator::Bracket(BracketKind::Round), vec![x.clone()]).unwrap();
        let curly = Expression::new(Operator::Bracket(BracketKind::Curly), vec![x.clone()]).unwrap();
        assert_ne!(round, curly);
        assert!(round.equiv(&curly));
        assert!(!round.equiv(&x));
    }

    #[test]
    fn integer_values() {
        assert_eq!(Expression::integer(-4).signed_integer(), Some(int(-4)));
        assert_eq!(Expression::integer(-4).as_integer(), None);
        assert_eq!(Expression::integer(9).as_integer(), Some(&int(9)));
        assert_eq!(Expression::variable("y").signed_integer(), None);
    }

    #[test]
    fn get_descendants() {
        let fraction = Expression::fraction(Expression::integer(3), Expression::integer(4));
        let sum = Expression::sum(vec![Expression::integer(1), fraction]).unwrap();
        assert_eq!(sum.get(&[1, 1]), Some(&Expression::integer(4)));
        assert_eq!(sum.get(&[]), Some(&sum));
        assert_eq!(sum.get(&[0, 0]), None);
    }
}
