use super::{Match, NaryMode, Pattern, PatternKind};
use crate::{
    error::Error,
    expr::{Expression, Operator, Subexpression},
    mapping::MappedExpression,
};
use std::ops::Deref;

/// A pattern over the operands of a sum or product, which can also rebuild the matched
/// expression with some of its operands replaced.
///
/// Dereferences to the underlying [`Pattern`], so it can be used wherever a pattern is read
/// from a [`Match`].
#[derive(Debug, Clone)]
pub struct NaryPattern {
    pattern: Pattern,
    operator: Operator,
    operands: Vec<Pattern>,
}

impl NaryPattern {
    fn new(operator: Operator, operands: Vec<Pattern>, partial: bool, commutative: bool) -> Self {
        let mode = NaryMode { partial, commutative };
        let pattern = Pattern::new(PatternKind::Nary(operator.clone(), operands.clone(), mode));
        Self { pattern, operator, operands }
    }

    /// The underlying pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern.clone()
    }

    /// The operator of the matched expression.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The operand patterns.
    pub fn operands(&self) -> &[Pattern] {
        &self.operands
    }

    /// The positions of the operands matched by the operand patterns, in the order of the
    /// patterns.
    pub fn matched_indices(&self, m: &Match) -> Result<Vec<usize>, Error> {
        let node = m.bound(&self.pattern)?;
        let mut indices = Vec::with_capacity(self.operands.len());
        for operand in &self.operands {
            for sub in m.bound_subexpressions(operand) {
                let Some(index) = sub.index() else { continue };
                if sub.path.parent().as_ref() == Some(&node.path) && !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
        Ok(indices)
    }

    /// The operands of the matched expression that no operand pattern matched.
    pub fn rest_subexpressions(&self, m: &Match) -> Result<Vec<Subexpression>, Error> {
        let node = m.bound(&self.pattern)?;
        let matched = self.matched_indices(m)?;
        Ok(node
            .children()
            .into_iter()
            .filter(|child| child.index().map_or(true, |index| !matched.contains(&index)))
            .collect())
    }

    /// Rebuilds the matched expression with the `j`th matched operand replaced by
    /// `replacements[j]`. Matched operands without a replacement are dropped; the others are
    /// moved unchanged.
    ///
    /// A single remaining operand is returned on its own, and no remaining operand gives the
    /// neutral element of the operator (`0` for sums, `1` for products).
    pub fn substitute(
        &self,
        m: &Match,
        replacements: Vec<MappedExpression>,
    ) -> Result<MappedExpression, Error> {
        let node = m.bound(&self.pattern)?;
        let matched = self.matched_indices(m)?;
        let mut replacements = replacements.into_iter().map(Some).collect::<Vec<_>>();

        let mut operands = Vec::with_capacity(node.expr.children().len());
        for child in node.children() {
            let position = child
                .index()
                .and_then(|index| matched.iter().position(|&matched| matched == index));
            match position {
                None => operands.push(child.to_mapped()),
                Some(j) => {
                    if let Some(replacement) = replacements.get_mut(j).and_then(Option::take) {
                        operands.push(replacement);
                    }
                },
            }
        }

        match operands.len() {
            0 => Ok(MappedExpression::introduced(self.neutral_element())),
            1 => Ok(operands.remove(0)),
            _ => MappedExpression::flattened(self.operator.clone(), operands),
        }
    }

    /// The matched expression with every matched operand removed.
    pub fn rest(&self, m: &Match) -> Result<MappedExpression, Error> {
        self.substitute(m, Vec::new())
    }

    fn neutral_element(&self) -> Expression {
        match self.operator {
            Operator::Sum => Expression::integer(0),
            _ => Expression::integer(1),
        }
    }
}

impl Deref for NaryPattern {
    type Target = Pattern;

    fn deref(&self) -> &Pattern {
        &self.pattern
    }
}

impl From<NaryPattern> for Pattern {
    fn from(nary: NaryPattern) -> Self {
        nary.pattern
    }
}

/// Matches a sum whose terms match `terms`, in order.
pub fn sum_of(terms: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Sum, terms, false, false)
}

/// Matches a sum containing terms that match `terms`, in order, possibly with other terms in
/// between.
pub fn sum_containing(terms: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Sum, terms, true, false)
}

/// Matches a sum whose terms match `terms`, in any order.
pub fn commutative_sum_of(terms: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Sum, terms, false, true)
}

/// Matches a sum containing terms that match `terms`, in any order.
pub fn commutative_sum_containing(terms: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Sum, terms, true, true)
}

/// Matches a product whose factors match `factors`, in order.
pub fn product_of(factors: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Product, factors, false, false)
}

/// Matches a product containing factors that match `factors`, in order.
pub fn product_containing(factors: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Product, factors, true, false)
}

/// Matches a product whose factors match `factors`, in any order.
pub fn commutative_product_of(factors: Vec<Pattern>) -> NaryPattern {
    NaryPattern::new(Operator::Product, factors, false, true)
}

#[cfg(test)]
mod tests {
    use crate::{
        context::Context,
        expr::Path,
        mapping::{PathMapping, PathMappingType},
        pattern::{fraction_of, integer, signed_integer, variable},
    };
    use pretty_assertions::assert_eq;
    use super::*;

    fn sum(terms: Vec<Expression>) -> Subexpression {
        Subexpression::root(Expression::sum(terms).unwrap())
    }

    fn ints(values: &[i32]) -> Vec<Expression> {
        values.iter().map(|&n| Expression::integer(n)).collect()
    }

    #[test]
    fn partial_matches_in_order() {
        let ctx = Context::default();
        let (a, b) = (integer(), integer());
        let pattern = sum_containing(vec![a.clone(), b.clone()]);
        let sub = sum(ints(&[1, 2, 3]));

        let pairs = pattern
            .matches(&ctx, &sub)
            .unwrap()
            .into_iter()
            .map(|m| pattern.matched_indices(&m).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn partial_skips_non_matching_terms() {
        let ctx = Context::default();
        let (a, b) = (integer(), integer());
        let pattern = sum_containing(vec![a.clone(), b.clone()]);
        let sub = sum(vec![
            Expression::integer(1),
            Expression::variable("x"),
            Expression::integer(2),
        ]);

        let m = pattern.first_match(&ctx, &sub).unwrap().unwrap();
        assert_eq!(m.bound(&a).unwrap().path, Path::from_indices([0]));
        assert_eq!(m.bound(&b).unwrap().path, Path::from_indices([2]));
        assert_eq!(
            pattern.rest_subexpressions(&m).unwrap().iter().map(|s| s.expr.to_string()).collect::<Vec<_>>(),
            vec!["x"],
        );
    }

    #[test]
    fn exact_requires_same_count() {
        let ctx = Context::default();
        let pattern = sum_of(vec![integer(), integer()]);
        assert!(pattern.is_match(&ctx, &sum(ints(&[1, 2]))).unwrap());
        assert!(!pattern.is_match(&ctx, &sum(ints(&[1, 2, 3]))).unwrap());
    }

    #[test]
    fn commutative_any_order() {
        let ctx = Context::default();
        let (n, x) = (integer(), variable());
        let pattern = commutative_sum_of(vec![n.clone(), x.clone()]);
        let sub = sum(vec![Expression::variable("x"), Expression::integer(3)]);

        let m = pattern.first_match(&ctx, &sub).unwrap().unwrap();
        assert_eq!(m.bound(&n).unwrap().path, Path::from_indices([1]));
        assert_eq!(pattern.matched_indices(&m).unwrap(), vec![1, 0]);
        assert!(!pattern.is_match(&ctx, &sum(ints(&[1, 2]))).unwrap());
    }

    #[test]
    fn substitute_first_slot() {
        let ctx = Context::default();
        let (a, b) = (signed_integer(), signed_integer());
        let pattern = sum_containing(vec![a.clone(), b.clone()]);
        let sub = sum(vec![
            Expression::integer(1),
            Expression::variable("x"),
            Expression::integer(2),
        ]);
        let m = pattern.first_match(&ctx, &sub).unwrap().unwrap();

        let three = MappedExpression::with_sources(
            Expression::integer(3),
            vec![Path::from_indices([0]), Path::from_indices([2])],
            PathMappingType::Combine,
        );
        let result = pattern.substitute(&m, vec![three]).unwrap();
        assert_eq!(result.to_string(), "3 + x");
        assert_eq!(result.merged_path_mappings(&Path::root()), vec![
            PathMapping::new(
                vec![Path::from_indices([0]), Path::from_indices([2])],
                PathMappingType::Combine,
                vec![Path::from_indices([0])],
            ),
            PathMapping::new(vec![Path::from_indices([1])], PathMappingType::Move, vec![Path::from_indices([1])]),
        ]);
    }

    #[test]
    fn substitute_collapses() {
        let ctx = Context::default();
        let pattern = sum_of(vec![integer(), integer()]);
        let m = pattern.first_match(&ctx, &sum(ints(&[4, 5]))).unwrap().unwrap();

        let nine = MappedExpression::introduced(Expression::integer(9));
        assert_eq!(pattern.substitute(&m, vec![nine]).unwrap().to_string(), "9");
        assert_eq!(pattern.rest(&m).unwrap().to_string(), "0");
    }

    #[test]
    fn substitute_flattens_sums() {
        let ctx = Context::default();
        let f = fraction_of(integer(), integer());
        let pattern = sum_containing(vec![f.clone()]);
        let fraction = Expression::fraction(Expression::integer(1), Expression::integer(2));
        let m = pattern
            .first_match(&ctx, &sum(vec![Expression::integer(1), fraction]))
            .unwrap()
            .unwrap();

        let split = MappedExpression::introduced(Expression::sum(ints(&[2, 3])).unwrap());
        assert_eq!(pattern.substitute(&m, vec![split]).unwrap().to_string(), "1 + 2 + 3");
    }
}
