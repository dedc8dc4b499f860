//! Fraction arithmetic on integer fractions.

use crate::{
    explanation::{
        ADD_FRACTIONS, ADD_LIKE_FRACTIONS, BRING_TO_COMMON_DENOMINATOR, CONVERT_FRACTION_TO_DECIMAL,
        CONVERT_INTEGER_TO_FRACTION, EVALUATE_PRODUCTS_IN_NUMERATOR_AND_DENOMINATOR, SKILL_ADD_FRACTIONS,
    },
    integers::{EVALUATE_INTEGER_PRODUCT_RULE, EVALUATE_SIGNED_INTEGER_ADDITION},
};
use once_cell::sync::Lazy;
use rug::Integer;
use std::sync::Arc;
use stepwise_engine::{
    error::Error,
    expr::{Expression, OperatorKind, TraversalOrder},
    mapping::{MappedExpression, PathMappingType},
    pattern::{commutative_sum_containing, condition, find, fraction_of, integer, of_kind, Pattern},
    rule::{ResultBuilder, Rule},
    strategy::{pipeline, Deeply, Plan, WhilePossible},
    transformation::MetadataMaker,
};

/// A fraction with integer numerator and denominator.
fn integer_fraction() -> Pattern {
    fraction_of(integer(), integer())
}

/// `3 + [1 / 2] -> [3 / 1] + [1 / 2]`
pub static CONVERT_INTEGER_TO_FRACTION_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let n = integer();
    let f = integer_fraction();
    let sum = commutative_sum_containing(vec![n.clone(), f.clone()]);

    Arc::new(Rule::new("ConvertIntegerToFraction", sum.clone(), move |r| {
        let fraction = r.fraction(r.moved(&n)?, r.introduce(Expression::integer(1)))?;
        let to = r.substitute(&sum, vec![fraction, r.moved(&f)?])?;
        Ok(Some(r.result(to, r.metadata(CONVERT_INTEGER_TO_FRACTION, &[&n])?)))
    }))
});

/// `[1 / 5] + [2 / 5] -> [1 + 2 / 5]`
///
/// The two denominators are combined into the one of the result.
pub static ADD_LIKE_FRACTIONS_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let n1 = integer();
    let n2 = integer();
    let d = integer();
    let f1 = fraction_of(n1.clone(), d.clone());
    let f2 = fraction_of(n2.clone(), d.clone());
    let sum = commutative_sum_containing(vec![f1.clone(), f2.clone()]);

    Arc::new(Rule::new("AddLikeFractions", sum.clone(), move |r| {
        let denominators = r
            .matched()
            .bound_subexpressions(&d)
            .into_iter()
            .map(|sub| sub.path.clone())
            .collect();
        let denominator = MappedExpression::with_sources(
            r.get(&d)?.expr.clone(),
            denominators,
            PathMappingType::Combine,
        );
        let numerator = r.sum(vec![r.moved(&n1)?, r.moved(&n2)?])?;
        let to = r.substitute(&sum, vec![r.fraction(numerator, denominator)?])?;
        Ok(Some(r.result(to, r.metadata(ADD_LIKE_FRACTIONS, &[&f1, &f2])?)))
    }))
});

/// `[n / d] -> [n * k / d * k]` where `k = lcm / d`, or the fraction itself if `k = 1`.
fn expand_fraction(
    r: &ResultBuilder<'_>,
    lcm: &Integer,
    [f, n, d]: [&Pattern; 3],
    denominator: &Integer,
) -> Result<MappedExpression, Error> {
    let factor = Integer::from(lcm / denominator);
    if factor == 1 {
        return r.moved(f);
    }
    r.fraction(
        r.product(vec![r.moved(n)?, r.int(factor.clone())])?,
        r.product(vec![r.moved(d)?, r.int(factor)])?,
    )
}

/// `[1 / 4] + [1 / 6] -> [1 * 3 / 4 * 3] + [1 * 2 / 6 * 2]`
///
/// Both fractions are brought to the least common multiple of their denominators. A fraction
/// that already has it is left as it is.
pub static BRING_TO_COMMON_DENOMINATOR_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let n1 = integer();
    let d1 = integer();
    let n2 = integer();
    let d2 = {
        let d1 = d1.clone();
        condition(integer(), move |sub, m| {
            m.integer(&d1).map_or(false, |first| sub.expr.as_integer() != Some(&first))
        })
    };
    let f1 = fraction_of(n1.clone(), d1.clone());
    let f2 = fraction_of(n2.clone(), d2.clone());
    let sum = commutative_sum_containing(vec![f1.clone(), f2.clone()]);

    Arc::new(Rule::new("BringToCommonDenominator", sum.clone(), move |r| {
        let (denominator1, denominator2) = (r.integer(&d1)?, r.integer(&d2)?);
        if denominator1.is_zero() || denominator2.is_zero() {
            return Ok(None);
        }
        let lcm = denominator1.clone().lcm(&denominator2);

        let to = r.substitute(&sum, vec![
            expand_fraction(r, &lcm, [&f1, &n1, &d1], &denominator1)?,
            expand_fraction(r, &lcm, [&f2, &n2, &d2], &denominator2)?,
        ])?;
        Ok(Some(r.result(to, r.metadata(BRING_TO_COMMON_DENOMINATOR, &[&f1, &f2])?)))
    }))
});

/// `[1 / 4] -> 0.25`, rounded to the precision of the context.
pub static CONVERT_FRACTION_TO_DECIMAL_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let n = integer();
    let d = integer();
    let f = fraction_of(n.clone(), d.clone());

    Arc::new(Rule::new("ConvertFractionToDecimal", f.clone(), move |r| {
        let Some(value) = r.round_ratio(&r.integer(&n)?, &r.integer(&d)?) else {
            return Ok(None);
        };
        let to = r.transform(&f, Expression::signed_decimal(value))?;
        Ok(Some(r.result(to, r.metadata(CONVERT_FRACTION_TO_DECIMAL, &[&f])?)))
    }))
});

/// Evaluates every integer product inside the fractions, one product per step.
pub static EVALUATE_PRODUCTS_IN_FRACTIONS: Lazy<Arc<Plan>> = Lazy::new(|| {
    let steps = WhilePossible::new(Deeply::pre_order(EVALUATE_INTEGER_PRODUCT_RULE.clone()));
    Arc::new(
        Plan::new("EvaluateProductsInNumeratorAndDenominator", steps)
            .with_pattern(find(of_kind(OperatorKind::Product), TraversalOrder::PreOrder))
            .with_explanation(EVALUATE_PRODUCTS_IN_NUMERATOR_AND_DENOMINATOR),
    )
});

/// Adds two integer fractions of a sum, bringing them to a common denominator first if needed:
/// `[1 / 4] + [2 / 3] -> [11 / 12]`.
pub static ADD_FRACTIONS_PLAN: Lazy<Arc<Plan>> = Lazy::new(|| {
    let f1 = integer_fraction();
    let f2 = integer_fraction();
    let sum = commutative_sum_containing(vec![f1.clone(), f2.clone()]);

    let steps = pipeline()
        .optionally(BRING_TO_COMMON_DENOMINATOR_RULE.clone())
        .optionally(EVALUATE_PRODUCTS_IN_FRACTIONS.clone())
        .apply(ADD_LIKE_FRACTIONS_RULE.clone())
        .optionally(Deeply::post_order(EVALUATE_SIGNED_INTEGER_ADDITION.clone()));

    Arc::new(
        Plan::new("AddFractions", steps)
            .with_pattern(sum)
            .with_explanation(MetadataMaker::new(ADD_FRACTIONS, vec![f1.clone(), f2.clone()]))
            .with_skill(MetadataMaker::new(SKILL_ADD_FRACTIONS, vec![f1, f2])),
    )
});
