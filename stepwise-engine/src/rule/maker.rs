use crate::{
    context::Context,
    error::Error,
    expr::{Expression, Operator, Subexpression},
    mapping::{MappedExpression, PathMappingTree, PathMappingType},
    pattern::{Match, NaryPattern, Pattern},
    primitive::{Decimal, SignedDecimal},
    transformation::{Metadata, MetadataKey, Transformation},
};
use rug::Integer;

/// Everything a rule's result builder can read, and helpers to build a provenance-tagged result.
///
/// Every helper that reads a pattern fails with
/// [`UnboundPattern`](crate::error::UnboundPattern) if the match did not bind it, so builders
/// can use `?` freely.
pub struct ResultBuilder<'a> {
    ctx: &'a Context,
    sub: &'a Subexpression,
    m: &'a Match,
}

impl<'a> ResultBuilder<'a> {
    pub(crate) fn new(ctx: &'a Context, sub: &'a Subexpression, m: &'a Match) -> Self {
        Self { ctx, sub, m }
    }

    /// The context of the computation.
    pub fn ctx(&self) -> &Context {
        self.ctx
    }

    /// The subexpression the rule is applied to.
    pub fn expression(&self) -> &Subexpression {
        self.sub
    }

    /// The match of the rule's pattern.
    pub fn matched(&self) -> &Match {
        self.m
    }

    /// The subexpression bound to `p`.
    pub fn get(&self, p: &Pattern) -> Result<&Subexpression, Error> {
        self.m.bound(p)
    }

    /// Returns true if `p` took part in the match.
    pub fn is_bound(&self, p: &Pattern) -> bool {
        self.m.is_bound(p)
    }

    /// The signed integer value bound to `p`.
    pub fn integer(&self, p: &Pattern) -> Result<Integer, Error> {
        self.m.integer(p)
    }

    /// The subexpression bound to `p`, unchanged.
    pub fn moved(&self, p: &Pattern) -> Result<MappedExpression, Error> {
        Ok(self.get(p)?.to_mapped())
    }

    /// `expr`, as a rewrite of the subexpression bound to `p`.
    pub fn transform(&self, p: &Pattern, expr: Expression) -> Result<MappedExpression, Error> {
        self.with_origin(PathMappingType::Transform, &[p], expr)
    }

    /// `expr`, obtained by merging the subexpressions bound to `patterns`.
    pub fn combine(&self, patterns: &[&Pattern], expr: Expression) -> Result<MappedExpression, Error> {
        self.with_origin(PathMappingType::Combine, patterns, expr)
    }

    /// `expr`, obtained by factoring the subexpressions bound to `patterns`.
    pub fn factor(&self, patterns: &[&Pattern], expr: Expression) -> Result<MappedExpression, Error> {
        self.with_origin(PathMappingType::Factor, patterns, expr)
    }

    /// `expr`, obtained by distributing the subexpressions bound to `patterns`.
    pub fn distribute(&self, patterns: &[&Pattern], expr: Expression) -> Result<MappedExpression, Error> {
        self.with_origin(PathMappingType::Distribute, patterns, expr)
    }

    /// `expr`, related to the subexpressions bound to `patterns` through `kind`.
    pub fn with_origin(
        &self,
        kind: PathMappingType,
        patterns: &[&Pattern],
        expr: Expression,
    ) -> Result<MappedExpression, Error> {
        let mut paths = Vec::with_capacity(patterns.len());
        for p in patterns {
            let path = &self.get(p)?.path;
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        Ok(MappedExpression::new(expr, PathMappingTree::leaf(paths, kind)))
    }

    /// New material with no source in the input.
    pub fn introduce(&self, expr: Expression) -> MappedExpression {
        MappedExpression::introduced(expr)
    }

    /// A new integer literal; negative values become negations.
    pub fn int(&self, n: Integer) -> MappedExpression {
        self.introduce(Expression::integer(n))
    }

    /// A new decimal literal.
    pub fn decimal(&self, value: Decimal) -> MappedExpression {
        self.introduce(Expression::decimal(value))
    }

    /// `numerator / denominator` rounded to the context's precision, or `None` if the
    /// denominator is zero. Build the literal with [`Expression::signed_decimal`] so a negative
    /// ratio keeps its sign.
    pub fn round_ratio(&self, numerator: &Integer, denominator: &Integer) -> Option<SignedDecimal> {
        self.ctx.round_ratio(numerator, denominator)
    }

    /// Records that the subexpressions bound to `patterns` were removed while building `expr`.
    pub fn cancel(&self, patterns: &[&Pattern], expr: MappedExpression) -> Result<MappedExpression, Error> {
        let paths = patterns
            .iter()
            .map(|p| Ok(self.get(p)?.path.clone()))
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(expr.cancelling(paths))
    }

    /// A sum of the operands, splicing in operands that are sums themselves.
    pub fn sum(&self, terms: Vec<MappedExpression>) -> Result<MappedExpression, Error> {
        MappedExpression::flattened(Operator::Sum, terms)
    }

    /// A product of the operands, splicing in operands that are products themselves.
    pub fn product(&self, factors: Vec<MappedExpression>) -> Result<MappedExpression, Error> {
        MappedExpression::flattened(Operator::Product, factors)
    }

    /// The fraction `[numerator / denominator]`.
    pub fn fraction(
        &self,
        numerator: MappedExpression,
        denominator: MappedExpression,
    ) -> Result<MappedExpression, Error> {
        MappedExpression::with_operator(Operator::Fraction, vec![numerator, denominator])
    }

    /// The mixed number `[whole numerator/denominator]`.
    pub fn mixed_number(
        &self,
        whole: MappedExpression,
        numerator: MappedExpression,
        denominator: MappedExpression,
    ) -> Result<MappedExpression, Error> {
        MappedExpression::with_operator(Operator::MixedNumber, vec![whole, numerator, denominator])
    }

    /// The negation `-operand`.
    pub fn negate(&self, operand: MappedExpression) -> Result<MappedExpression, Error> {
        MappedExpression::with_operator(Operator::Minus, vec![operand])
    }

    /// The matched sum or product with its matched operands replaced (see
    /// [`NaryPattern::substitute`]).
    pub fn substitute(
        &self,
        pattern: &NaryPattern,
        replacements: Vec<MappedExpression>,
    ) -> Result<MappedExpression, Error> {
        pattern.substitute(self.m, replacements)
    }

    /// Metadata whose parameters are the subexpressions bound to `params`.
    pub fn metadata(&self, key: MetadataKey, params: &[&Pattern]) -> Result<Metadata, Error> {
        let params = params
            .iter()
            .map(|p| self.get(p).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Metadata::new(key, params))
    }

    /// The result of the rule: the subexpression rewritten into `to`, with an explanation.
    pub fn result(&self, to: MappedExpression, explanation: Metadata) -> Transformation {
        Transformation::rule(self.sub.clone(), to).with_explanation(explanation)
    }
}
