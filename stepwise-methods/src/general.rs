//! Rules that tidy up sums without computing anything.

use crate::explanation::{ELIMINATE_ZERO_IN_SUM, REMOVE_BRACKET_SUM_IN_SUM};
use once_cell::sync::Lazy;
use std::sync::Arc;
use stepwise_engine::{
    expr::{Expression, OperatorKind},
    pattern::{bracket_of, fixed, of_kind, sum_containing},
    rule::Rule,
};

/// `a + (b + c) + d -> a + b + c + d`
pub static REMOVE_BRACKETS_SUM: Lazy<Arc<Rule>> = Lazy::new(|| {
    let inner = of_kind(OperatorKind::Sum);
    let sum = sum_containing(vec![bracket_of(inner.clone())]);

    Arc::new(Rule::new("RemoveBracketSumInSum", sum.clone(), move |r| {
        let to = r.substitute(&sum, vec![r.moved(&inner)?])?;
        Ok(Some(r.result(to, r.metadata(REMOVE_BRACKET_SUM_IN_SUM, &[&inner])?)))
    }))
});

/// `a + 0 + b -> a + b`
pub static ELIMINATE_ZERO_IN_SUM_RULE: Lazy<Arc<Rule>> = Lazy::new(|| {
    let zero = fixed(Expression::integer(0));
    let sum = sum_containing(vec![zero.clone()]);

    Arc::new(Rule::new("EliminateZeroInSum", sum.clone(), move |r| {
        let to = r.cancel(&[&zero], sum.rest(r.matched())?)?;
        Ok(Some(r.result(to, r.metadata(ELIMINATE_ZERO_IN_SUM, &[])?)))
    }))
});
