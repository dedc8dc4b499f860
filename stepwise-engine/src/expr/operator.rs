//! The closed set of operators an [`Expression`](super::Expression) node can carry, with their
//! arity contracts and per-position child rules.

use crate::primitive::Decimal;
use rug::Integer;
use std::fmt;

/// The maximum number of children of a variable-arity operator.
pub const MAX_CHILD_COUNT: usize = 1000;

pub const SUM_PRECEDENCE: u8 = 10;
pub const PLUS_MINUS_PRECEDENCE: u8 = 15;
pub const PRODUCT_PRECEDENCE: u8 = 20;
pub const DIVIDE_PRECEDENCE: u8 = 30;
pub const IMPLICIT_PRODUCT_PRECEDENCE: u8 = 40;
pub const FRACTION_PRECEDENCE: u8 = 50;
pub const NATURAL_LOG_PRECEDENCE: u8 = 50;
pub const POWER_PRECEDENCE: u8 = 60;
pub const DIVIDE_BY_PRECEDENCE: u8 = 90;
pub const MAX_PRECEDENCE: u8 = 100;

/// The kind of bracket around a [`Operator::Bracket`] node. All kinds are equivalent; the
/// distinction is only cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketKind {
    /// `(x)`
    Round,

    /// `[.x.]`
    Square,

    /// `{.x.}`
    Curly,

    /// `<.x.>`, around some operands of a sum or product taken out to be worked on alone.
    Partial,
}

impl BracketKind {
    /// The opening and closing strings of the bracket.
    pub fn delimiters(&self) -> (&'static str, &'static str) {
        match self {
            BracketKind::Round => ("(", ")"),
            BracketKind::Square => ("[.", ".]"),
            BracketKind::Curly => ("{.", ".}"),
            BracketKind::Partial => ("<.", ".>"),
        }
    }
}

/// The number of children an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many children.
    Fixed(usize),

    /// Between 2 and [`MAX_CHILD_COUNT`] children.
    Variable,
}

impl Arity {
    /// The minimum number of children.
    pub fn min(&self) -> usize {
        match self {
            Arity::Fixed(n) => *n,
            Arity::Variable => 2,
        }
    }

    /// The maximum number of children.
    pub fn max(&self) -> usize {
        match self {
            Arity::Fixed(n) => *n,
            Arity::Variable => MAX_CHILD_COUNT,
        }
    }
}

/// The operator of an expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// A non-negative integer, such as `2` or `144`. Negative integers are `Minus(Integer)`.
    Integer(Integer),

    /// A non-negative decimal, such as `1.25`.
    Decimal(Decimal),

    /// A variable, such as `x`.
    Variable(String),

    /// A mixed number `[a b/c]`, whose three children are integers.
    MixedNumber,

    /// A bracket around its only child.
    Bracket(BracketKind),

    /// `+x`
    Plus,

    /// `-x`
    Minus,

    /// `:x`, a division inside a product.
    DivideBy,

    /// `sqrt[x]`
    SquareRoot,

    /// `ln x`
    NaturalLog,

    /// `[a / b]`
    Fraction,

    /// `a : b`
    Divide,

    /// `[a ^ b]`
    Power,

    /// `root[a, n]`
    Root,

    /// `a + b + ...`
    Sum,

    /// `a * b * ...`
    Product,

    /// `ab...`
    ImplicitProduct,
}

/// The tag of an [`Operator`], without any value it carries. Bracket kinds share one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Integer,
    Decimal,
    Variable,
    MixedNumber,
    Bracket,
    Plus,
    Minus,
    DivideBy,
    SquareRoot,
    NaturalLog,
    Fraction,
    Divide,
    Power,
    Root,
    Sum,
    Product,
    ImplicitProduct,
}

impl OperatorKind {
    /// Returns true if operators of this kind take a variable number of children.
    pub fn is_nary(&self) -> bool {
        matches!(self, OperatorKind::Sum | OperatorKind::Product | OperatorKind::ImplicitProduct)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Operator {
    /// The tag of this operator.
    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::Integer(_) => OperatorKind::Integer,
            Operator::Decimal(_) => OperatorKind::Decimal,
            Operator::Variable(_) => OperatorKind::Variable,
            Operator::MixedNumber => OperatorKind::MixedNumber,
            Operator::Bracket(_) => OperatorKind::Bracket,
            Operator::Plus => OperatorKind::Plus,
            Operator::Minus => OperatorKind::Minus,
            Operator::DivideBy => OperatorKind::DivideBy,
            Operator::SquareRoot => OperatorKind::SquareRoot,
            Operator::NaturalLog => OperatorKind::NaturalLog,
            Operator::Fraction => OperatorKind::Fraction,
            Operator::Divide => OperatorKind::Divide,
            Operator::Power => OperatorKind::Power,
            Operator::Root => OperatorKind::Root,
            Operator::Sum => OperatorKind::Sum,
            Operator::Product => OperatorKind::Product,
            Operator::ImplicitProduct => OperatorKind::ImplicitProduct,
        }
    }

    /// The binding strength of the operator. A child with a lower precedence than its parent
    /// usually needs brackets.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Plus | Operator::Minus => PLUS_MINUS_PRECEDENCE,
            Operator::DivideBy => DIVIDE_BY_PRECEDENCE,
            Operator::NaturalLog => NATURAL_LOG_PRECEDENCE,
            Operator::Fraction => FRACTION_PRECEDENCE,
            Operator::Divide => DIVIDE_PRECEDENCE,
            Operator::Power => POWER_PRECEDENCE,
            Operator::Sum => SUM_PRECEDENCE,
            Operator::Product => PRODUCT_PRECEDENCE,
            Operator::ImplicitProduct => IMPLICIT_PRODUCT_PRECEDENCE,
            Operator::Integer(_)
            | Operator::Decimal(_)
            | Operator::Variable(_)
            | Operator::MixedNumber
            | Operator::Bracket(_)
            | Operator::SquareRoot
            | Operator::Root => MAX_PRECEDENCE,
        }
    }

    /// The number of children the operator takes.
    pub fn arity(&self) -> Arity {
        match self {
            Operator::Integer(_) | Operator::Decimal(_) | Operator::Variable(_) => Arity::Fixed(0),
            Operator::Bracket(_)
            | Operator::Plus
            | Operator::Minus
            | Operator::DivideBy
            | Operator::SquareRoot
            | Operator::NaturalLog => Arity::Fixed(1),
            Operator::Fraction | Operator::Divide | Operator::Power | Operator::Root => Arity::Fixed(2),
            Operator::MixedNumber => Arity::Fixed(3),
            Operator::Sum | Operator::Product | Operator::ImplicitProduct => Arity::Variable,
        }
    }

    /// Returns true if an expression with operator `child` can be the `n`th child of this
    /// operator without brackets.
    pub fn nth_child_allowed(&self, n: usize, child: &Operator) -> bool {
        if n >= self.arity().max() {
            return false;
        }

        let child_precedence = child.precedence();
        match self {
            Operator::Integer(_) | Operator::Decimal(_) | Operator::Variable(_) => false,
            Operator::MixedNumber => matches!(child, Operator::Integer(_)),
            Operator::Bracket(_) | Operator::SquareRoot | Operator::Fraction | Operator::Root => true,
            Operator::Plus | Operator::Minus => child_precedence > PLUS_MINUS_PRECEDENCE,
            Operator::DivideBy => child_precedence > PRODUCT_PRECEDENCE,
            Operator::NaturalLog => child_precedence >= FRACTION_PRECEDENCE,
            Operator::Divide => child_precedence >= IMPLICIT_PRODUCT_PRECEDENCE,
            Operator::Power => n == 1 || child_precedence >= MAX_PRECEDENCE,
            Operator::Sum => child_precedence > SUM_PRECEDENCE,
            Operator::Product => child_precedence > PRODUCT_PRECEDENCE,
            Operator::ImplicitProduct => child_precedence > IMPLICIT_PRODUCT_PRECEDENCE,
        }
    }

    /// Returns true if the two operators are the same up to cosmetic differences. All bracket
    /// kinds are equivalent to each other.
    pub fn equiv(&self, other: &Operator) -> bool {
        match (self, other) {
            (Operator::Bracket(_), Operator::Bracket(_)) => true,
            _ => self == other,
        }
    }

    /// The name of the operator, used in error messages.
    pub fn name(&self) -> String {
        match self {
            Operator::Integer(n) => n.to_string(),
            Operator::Decimal(d) => d.to_string(),
            Operator::Variable(name) => name.clone(),
            other => other.kind().to_string(),
        }
    }
}
