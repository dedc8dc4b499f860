use crate::explanation::{EVALUATE_INTEGER_ADDITION, EVALUATE_INTEGER_PRODUCT};
use once_cell::sync::Lazy;
use std::sync::Arc;
use stepwise_engine::{
    expr::Expression,
    pattern::{commutative_sum_containing, integer, product_containing, signed_integer},
    rule::Rule,
};

/// Adds two signed integer terms of a sum, wherever they are: `2 + x - 5 -> -3 + x`.
pub static EVALUATE_SIGNED_INTEGER_ADDITION: Lazy<Arc<Rule>> = Lazy::new(|| {
    let a = signed_integer();
    let b = signed_integer();
    let sum = commutative_sum_containing(vec![a.clone(), b.clone()]);

    Arc::new(Rule::new("EvaluateSignedIntegerAddition", sum.clone(), move |r| {
        let total = r.integer(&a)? + r.integer(&b)?;
        let combined = r.combine(&[&a, &b], Expression::integer(total))?;
        let to = r.substitute(&sum, vec![combined])?;
        Ok(Some(r.result(to, r.metadata(EVALUATE_INTEGER_ADDITION, &[&a, &b])?)))
    }))
});

/// Multiplies two adjacent integer factors: `2 * 3 * x -> 6 * x`.
pub static EVALUATE_INTEGER_PRODUCT_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let a = integer();
    let b = integer();
    let product = product_containing(vec![a.clone(), b.clone()]);

    Arc::new(Rule::new("EvaluateIntegerProduct", product.clone(), move |r| {
        let value = r.integer(&a)? * r.integer(&b)?;
        let combined = r.combine(&[&a, &b], Expression::integer(value))?;
        let to = r.substitute(&product, vec![combined])?;
        Ok(Some(r.result(to, r.metadata(EVALUATE_INTEGER_PRODUCT, &[&a, &b])?)))
    }))
});

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_engine::{
        context::Context,
        expr::{Path, Subexpression},
        mapping::{PathMapping, PathMappingType},
    };
    use super::*;

    fn apply(rule: &Rule, expr: Expression) -> Option<String> {
        rule.apply(&Context::new(), &Subexpression::root(expr))
            .unwrap()
            .map(|step| step.to.expr.to_string())
    }

    #[test]
    fn adds_all_integer_terms() {
        let sum = Expression::sum(vec![
            Expression::integer(2),
            Expression::variable("x"),
            Expression::integer(-5),
        ]).unwrap();
        assert_eq!(sum.to_string(), "2 + x - 5");
        assert_eq!(apply(&EVALUATE_SIGNED_INTEGER_ADDITION, sum), Some("-3 + x".to_string()));
    }

    #[test]
    fn whole_sum_collapses() {
        let sum = Expression::sum(vec![Expression::integer(5), Expression::integer(2)]).unwrap();
        let step = EVALUATE_SIGNED_INTEGER_ADDITION
            .apply(&Context::new(), &Subexpression::root(sum))
            .unwrap()
            .unwrap();
        assert_eq!(step.to.expr.to_string(), "7");
        assert_eq!(step.explanation.unwrap().to_string(), "IntegerArithmetic.EvaluateIntegerAddition(5, 2)");
        assert_eq!(step.path_mappings(), vec![PathMapping::new(
            vec![Path::from_indices([0]), Path::from_indices([1])],
            PathMappingType::Combine,
            vec![Path::root()],
        )]);
    }

    #[test]
    fn multiplies_neighbours() {
        let product = Expression::product(vec![
            Expression::integer(2),
            Expression::integer(3),
            Expression::variable("x"),
        ]).unwrap();
        assert_eq!(apply(&EVALUATE_INTEGER_PRODUCT_RULE, product), Some("6 * x".to_string()));
    }

    #[test]
    fn single_integer_is_left_alone() {
        let sum = Expression::sum(vec![Expression::integer(2), Expression::variable("x")]).unwrap();
        assert_eq!(apply(&EVALUATE_SIGNED_INTEGER_ADDITION, sum), None);
    }
}
