//! Adding mixed numbers, the way the different curricula teach it.
//!
//! By default both mixed numbers are converted to improper fractions, the fractions are added,
//! and the result is converted back to a mixed number. In the US curriculum the whole parts and
//! the fractional parts are added separately instead, using the commutativity of addition. When
//! decimals are preferred, the improper fraction is converted to a decimal at the end.

use crate::{
    explanation::{
        ADD_FRACTIONAL_PARTS, ADD_MIXED_NUMBERS, ADD_WHOLE_PARTS, COMBINE_PARTS, CONVERT_FRACTION_TO_MIXED_NUMBER,
        CONVERT_MIXED_NUMBERS_TO_SUMS, CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION, CONVERT_MIXED_NUMBER_TO_SUM,
        CONVERT_SUM_OF_INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER, DIVISION_WITH_REMAINDER,
    },
    fractions::{ADD_FRACTIONS_PLAN, CONVERT_FRACTION_TO_DECIMAL_RULE, CONVERT_INTEGER_TO_FRACTION_RULE},
    general::REMOVE_BRACKETS_SUM,
    integers::EVALUATE_SIGNED_INTEGER_ADDITION,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use stepwise_engine::{
    context::{Curriculum, ResourceData, Setting},
    error::Error,
    expr::{Expression, OperatorKind},
    pattern::{commutative_sum_of, condition, fraction_of, integer, mixed_number_of, of_kind, Pattern},
    rule::Rule,
    strategy::{pipeline, ContextSensitive, Deeply, FirstOf, Pipeline, Plan, TaskSet, WhilePossible},
    transformation::{Metadata, MetadataMaker},
};

/// A sum of two or more terms, all of which are mixed numbers.
fn sum_of_mixed_numbers() -> Pattern {
    condition(of_kind(OperatorKind::Sum), |sub, _| {
        sub.expr
            .children()
            .iter()
            .all(|term| term.kind() == OperatorKind::MixedNumber)
    })
}

/// `[5 1/4] -> 5 + [1 / 4]`
pub static SPLIT_MIXED_NUMBER: Lazy<Arc<Rule>> = Lazy::new(|| {
    let whole = integer();
    let numerator = integer();
    let denominator = integer();
    let mixed = mixed_number_of(whole.clone(), numerator.clone(), denominator.clone());

    Arc::new(Rule::new("SplitMixedNumber", mixed.clone(), move |r| {
        if r.integer(&denominator)?.is_zero() {
            return Ok(None);
        }
        let to = if r.integer(&numerator)?.is_zero() {
            r.moved(&whole)?
        } else {
            let fraction = r.fraction(r.moved(&numerator)?, r.moved(&denominator)?)?;
            r.sum(vec![r.moved(&whole)?, fraction])?
        };
        Ok(Some(r.result(to, r.metadata(CONVERT_MIXED_NUMBER_TO_SUM, &[&mixed])?)))
    }))
});

/// `[23 / 4] -> [5 3/4]`, for improper fractions that are not whole numbers.
pub static FRACTION_TO_MIXED_NUMBER: Lazy<Arc<Rule>> = Lazy::new(|| {
    let numerator = integer();
    let denominator = integer();
    let fraction = fraction_of(numerator.clone(), denominator.clone());

    Arc::new(Rule::new("ConvertFractionToMixedNumber", fraction.clone(), move |r| {
        let (n, d) = (r.integer(&numerator)?, r.integer(&denominator)?);
        if d.is_zero() || n <= d {
            return Ok(None);
        }
        let (quotient, remainder) = n.div_rem(d);
        if remainder.is_zero() {
            return Ok(None);
        }

        let parts = [&numerator, &denominator];
        let to = r.mixed_number(
            r.combine(&parts, Expression::integer(quotient))?,
            r.combine(&parts, Expression::integer(remainder))?,
            r.moved(&denominator)?,
        )?;
        let step = r
            .result(to, r.metadata(CONVERT_FRACTION_TO_MIXED_NUMBER, &[&fraction])?)
            .with_skills([r.metadata(DIVISION_WITH_REMAINDER, &[&numerator, &denominator])?]);
        Ok(Some(step))
    }))
});

/// `5 + [3 / 4] -> [5 3/4]`
pub static INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER: Lazy<Arc<Rule>> = Lazy::new(|| {
    let whole = integer();
    let numerator = integer();
    let denominator = integer();
    let fraction = fraction_of(numerator.clone(), denominator.clone());
    let sum = commutative_sum_of(vec![whole.clone(), fraction.clone()]);

    Arc::new(Rule::new("ConvertSumOfIntegerAndProperFractionToMixedNumber", sum, move |r| {
        let n = r.integer(&numerator)?;
        if n.is_zero() || n >= r.integer(&denominator)? {
            return Ok(None);
        }
        let to = r.mixed_number(r.moved(&whole)?, r.moved(&numerator)?, r.moved(&denominator)?)?;
        Ok(Some(r.result(
            to,
            r.metadata(CONVERT_SUM_OF_INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER, &[&whole, &fraction])?,
        )))
    }))
});

/// `[5 1/4] -> 5 + [1 / 4] -> [5 / 1] + [1 / 4] -> [21 / 4]`
pub static CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION: Lazy<Arc<Plan>> = Lazy::new(|| {
    let mixed = mixed_number_of(integer(), integer(), integer());
    let steps = pipeline()
        .apply(SPLIT_MIXED_NUMBER.clone())
        .apply(CONVERT_INTEGER_TO_FRACTION_RULE.clone())
        .apply(ADD_FRACTIONS_PLAN.clone());

    Arc::new(
        Plan::new("ConvertMixedNumberToImproperFraction", steps)
            .with_pattern(mixed.clone())
            .with_explanation(MetadataMaker::new(CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION, vec![mixed])),
    )
});

/// Splits every mixed number of a sum into the sum of its parts.
pub static CONVERT_MIXED_NUMBERS_TO_SUMS: Lazy<Arc<Plan>> = Lazy::new(|| {
    Arc::new(
        Plan::new(
            "ConvertMixedNumbersToSums",
            WhilePossible::new(Deeply::pre_order(SPLIT_MIXED_NUMBER.clone())),
        )
        .with_pattern(sum_of_mixed_numbers())
        .with_explanation(CONVERT_MIXED_NUMBERS_TO_SUMS),
    )
});

/// Turns `whole + fraction` back into a single mixed number.
fn recombine() -> FirstOf {
    FirstOf::new()
        .option(INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER.clone())
        .option(
            pipeline()
                .apply(CONVERT_INTEGER_TO_FRACTION_RULE.clone())
                .apply(ADD_FRACTIONS_PLAN.clone())
                .optionally(FRACTION_TO_MIXED_NUMBER.clone()),
        )
}

/// Converts the mixed numbers to improper fractions and adds those.
fn converting_steps() -> Pipeline {
    pipeline()
        .apply_to_children(CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION.clone(), false, true)
        .apply(WhilePossible::new(ADD_FRACTIONS_PLAN.clone()))
}

/// Adds the whole parts and the fractional parts separately.
fn commutativity_steps() -> Pipeline {
    pipeline()
        .apply(CONVERT_MIXED_NUMBERS_TO_SUMS.clone())
        .while_possible(Deeply::pre_order(REMOVE_BRACKETS_SUM.clone()))
        .while_possible(EVALUATE_SIGNED_INTEGER_ADDITION.clone())
        .while_possible(ADD_FRACTIONS_PLAN.clone())
        .first_of(recombine())
}

pub static ADD_MIXED_NUMBERS_BY_CONVERTING: Lazy<Arc<Plan>> = Lazy::new(|| {
    Arc::new(
        Plan::new(
            "AddMixedNumbersByConverting",
            converting_steps().optionally(FRACTION_TO_MIXED_NUMBER.clone()),
        )
        .with_pattern(sum_of_mixed_numbers())
        .with_explanation(ADD_MIXED_NUMBERS),
    )
});

pub static ADD_MIXED_NUMBERS_USING_COMMUTATIVITY: Lazy<Arc<Plan>> = Lazy::new(|| {
    Arc::new(
        Plan::new("AddMixedNumbersUsingCommutativity", commutativity_steps())
            .with_pattern(sum_of_mixed_numbers())
            .with_explanation(ADD_MIXED_NUMBERS),
    )
});

/// Adds the mixed numbers of a sum, choosing the method from the context.
///
/// The [`Setting::AddMixedNumbersWithoutConvertingToImproperFractions`] setting forces the
/// commutativity method. Otherwise the method is selected from the curriculum and the decimal
/// preference, converting to improper fractions when nothing is declared.
pub static ADD_MIXED_NUMBERS_PLAN: Lazy<Arc<Plan>> = Lazy::new(|| {
    let forced = pipeline()
        .check(|ctx, _| ctx.is_set(Setting::AddMixedNumbersWithoutConvertingToImproperFractions))
        .apply(commutativity_steps());

    let selected = ContextSensitive::new(
        converting_steps().optionally(FRACTION_TO_MIXED_NUMBER.clone()),
        ResourceData::new().with_curriculum(Curriculum::Eu),
    )
    .alternative(commutativity_steps(), ResourceData::new().with_curriculum(Curriculum::Us))
    .alternative(
        converting_steps().apply(CONVERT_FRACTION_TO_DECIMAL_RULE.clone()),
        ResourceData::new().with_prefer_decimals(true),
    );

    Arc::new(
        Plan::new("AddMixedNumbers", FirstOf::new().option(forced).option(selected))
            .with_pattern(sum_of_mixed_numbers())
            .with_explanation(ADD_MIXED_NUMBERS),
    )
});

/// Adds two mixed numbers in three tasks: the whole parts, the fractional parts, and the two
/// partial results.
pub static ADD_MIXED_NUMBERS_IN_TASKS: Lazy<Arc<TaskSet>> = Lazy::new(|| {
    let (w1, n1, d1) = (integer(), integer(), integer());
    let (w2, n2, d2) = (integer(), integer(), integer());
    let sum = commutative_sum_of(vec![
        mixed_number_of(w1.clone(), n1.clone(), d1.clone()),
        mixed_number_of(w2.clone(), n2.clone(), d2.clone()),
    ]);

    let add_integers = EVALUATE_SIGNED_INTEGER_ADDITION.clone();
    let add_fractions = ADD_FRACTIONS_PLAN.clone();
    let recombine = recombine();

    Arc::new(
        TaskSet::new("AddMixedNumbersInTasks", move |t| {
            let wholes = Expression::sum(vec![t.get(&w1)?.expr.clone(), t.get(&w2)?.expr.clone()])?;
            let explanation = t.metadata(ADD_WHOLE_PARTS, &[&w1, &w2])?;
            let Some(wholes) = t.task(wholes, explanation, &[], &add_integers)? else {
                return Ok(None);
            };

            let fraction = |n: &Pattern, d: &Pattern| -> Result<Expression, Error> {
                Ok(Expression::fraction(t.get(n)?.expr.clone(), t.get(d)?.expr.clone()))
            };
            let fractions = Expression::sum(vec![fraction(&n1, &d1)?, fraction(&n2, &d2)?])?;
            let explanation = t.metadata(ADD_FRACTIONAL_PARTS, &[])?;
            let Some(fractions) = t.task(fractions, explanation, &[], &add_fractions)? else {
                return Ok(None);
            };

            let parts = Expression::sum(vec![wholes.result().expr, fractions.result().expr])?;
            let explanation = Metadata::from_key(COMBINE_PARTS);
            if t.task(parts, explanation, &[&wholes, &fractions], &recombine)?.is_none() {
                return Ok(None);
            }
            Ok(t.all_tasks())
        })
        .with_pattern(sum)
        .with_explanation(ADD_MIXED_NUMBERS),
    )
});

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_engine::{
        context::{Context, Preset},
        expr::{Path, Subexpression},
        primitive::int,
        strategy::Method,
        transformation::{Transformation, TransformationKind},
    };
    use super::*;

    fn mixed(whole: i32, numerator: i32, denominator: i32) -> Expression {
        Expression::mixed_number(int(whole), int(numerator), int(denominator)).unwrap()
    }

    /// `[5 1/4] + [2 2/3]`
    fn example() -> Subexpression {
        Subexpression::root(Expression::sum(vec![mixed(5, 1, 4), mixed(2, 2, 3)]).unwrap())
    }

    fn steps(transformation: &Transformation) -> Vec<String> {
        transformation.steps.iter().map(|s| s.to.expr.to_string()).collect()
    }

    #[test]
    fn split() {
        let ctx = Context::new();
        let step = SPLIT_MIXED_NUMBER
            .apply(&ctx, &Subexpression::root(mixed(5, 1, 4)))
            .unwrap()
            .unwrap();
        assert_eq!(step.to.expr.to_string(), "5 + [1 / 4]");

        let step = SPLIT_MIXED_NUMBER
            .apply(&ctx, &Subexpression::root(mixed(5, 0, 4)))
            .unwrap()
            .unwrap();
        assert_eq!(step.to.expr.to_string(), "5");

        assert_eq!(SPLIT_MIXED_NUMBER.apply(&ctx, &Subexpression::root(mixed(5, 1, 0))).unwrap(), None);
    }

    #[test]
    fn improper_fraction_to_mixed_number() {
        let ctx = Context::new();
        let fraction = |n: i32, d: i32| {
            Subexpression::root(Expression::fraction(Expression::integer(n), Expression::integer(d)))
        };

        let step = FRACTION_TO_MIXED_NUMBER.apply(&ctx, &fraction(95, 12)).unwrap().unwrap();
        assert_eq!(step.to.expr.to_string(), "[7 11/12]");
        assert_eq!(step.skills[0].to_string(), "Skill.DivisionWithRemainder(95, 12)");

        assert_eq!(FRACTION_TO_MIXED_NUMBER.apply(&ctx, &fraction(3, 4)).unwrap(), None);
        assert_eq!(FRACTION_TO_MIXED_NUMBER.apply(&ctx, &fraction(8, 4)).unwrap(), None);
    }

    #[test]
    fn only_proper_fractions_join_an_integer() {
        let ctx = Context::new();
        let sum = |n: i32, d: i32| {
            let fraction = Expression::fraction(Expression::integer(n), Expression::integer(d));
            Subexpression::root(Expression::sum(vec![Expression::integer(7), fraction]).unwrap())
        };

        let step = INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER.apply(&ctx, &sum(11, 12)).unwrap().unwrap();
        assert_eq!(step.to.expr.to_string(), "[7 11/12]");
        assert_eq!(INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER.apply(&ctx, &sum(13, 12)).unwrap(), None);
    }

    #[test]
    fn mixed_number_to_improper_fraction() {
        let plan = CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION
            .try_execute(&Context::new(), &Subexpression::root(mixed(5, 1, 4)))
            .unwrap()
            .unwrap();
        assert_eq!(plan.to.expr.to_string(), "[21 / 4]");
        assert_eq!(steps(&plan), vec!["5 + [1 / 4]", "[5 / 1] + [1 / 4]", "[21 / 4]"]);
    }

    #[test]
    fn eu_converts_to_improper_fractions() {
        let ctx = Context::new().with_preset(Preset::EuCurriculum);
        let plan = ADD_MIXED_NUMBERS_PLAN.try_execute(&ctx, &example()).unwrap().unwrap();
        assert_eq!(plan.kind, TransformationKind::Plan);
        assert_eq!(plan.explanation.as_ref().unwrap().to_string(), "MixedNumbers.AddMixedNumbers");
        assert_eq!(steps(&plan), vec![
            "[21 / 4] + [2 2/3]",
            "[21 / 4] + [8 / 3]",
            "[95 / 12]",
            "[7 11/12]",
        ]);
    }

    #[test]
    fn us_adds_parts_separately() {
        let ctx = Context::new().with_preset(Preset::UsCurriculum);
        let plan = ADD_MIXED_NUMBERS_PLAN.try_execute(&ctx, &example()).unwrap().unwrap();
        assert_eq!(steps(&plan), vec![
            "(5 + [1 / 4]) + (2 + [2 / 3])",
            "5 + [1 / 4] + (2 + [2 / 3])",
            "5 + [1 / 4] + 2 + [2 / 3]",
            "7 + [1 / 4] + [2 / 3]",
            "7 + [11 / 12]",
            "[7 11/12]",
        ]);
    }

    #[test]
    fn us_curriculum_without_setting_selects_commutativity() {
        let ctx = Context::new().with_curriculum(Curriculum::Us);
        let plan = ADD_MIXED_NUMBERS_PLAN.try_execute(&ctx, &example()).unwrap().unwrap();
        assert_eq!(plan.steps.len(), 6);
        assert_eq!(plan.to.expr.to_string(), "[7 11/12]");
    }

    #[test]
    fn no_declared_context_converts() {
        let plan = ADD_MIXED_NUMBERS_PLAN.try_execute(&Context::new(), &example()).unwrap().unwrap();
        assert_eq!(plan.steps.len(), 4);
    }

    #[test]
    fn decimal_result() {
        let ctx = Context::new().with_prefer_decimals(true);
        let plan = ADD_MIXED_NUMBERS_PLAN.try_execute(&ctx, &example()).unwrap().unwrap();
        assert_eq!(plan.to.expr.to_string(), "7.917");
        assert_eq!(plan.steps.last().unwrap().explanation.as_ref().unwrap().to_string(),
            "FractionArithmetic.ConvertFractionToDecimal([95 / 12])");
    }

    #[test]
    fn sums_with_other_terms_are_not_added() {
        let sub = Subexpression::root(
            Expression::sum(vec![mixed(5, 1, 4), Expression::variable("x")]).unwrap(),
        );
        assert_eq!(ADD_MIXED_NUMBERS_PLAN.try_execute(&Context::new(), &sub).unwrap(), None);
    }

    #[test]
    fn dedicated_plans() {
        let ctx = Context::new();
        let converting = ADD_MIXED_NUMBERS_BY_CONVERTING.try_execute(&ctx, &example()).unwrap().unwrap();
        let commutativity = ADD_MIXED_NUMBERS_USING_COMMUTATIVITY.try_execute(&ctx, &example()).unwrap().unwrap();
        assert_eq!(converting.to.expr, commutativity.to.expr);
        assert!(commutativity.steps.len() > converting.steps.len());
    }

    #[test]
    fn tasks() {
        let result = ADD_MIXED_NUMBERS_IN_TASKS.try_execute(&Context::new(), &example()).unwrap().unwrap();
        assert_eq!(result.kind, TransformationKind::TaskSet);
        assert_eq!(result.to.expr.to_string(), "[7 11/12]");

        let tasks = result
            .tasks
            .iter()
            .map(|task| (task.start.expr.to_string(), task.result().expr.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(tasks, vec![
            ("5 + 2".to_string(), "7".to_string()),
            ("[1 / 4] + [2 / 3]".to_string(), "[11 / 12]".to_string()),
            ("7 + [11 / 12]".to_string(), "[7 11/12]".to_string()),
        ]);
        assert_eq!(result.tasks[2].depends_on, vec!["1", "2"]);
        assert_eq!(result.tasks[0].start.path, Path::task("1"));
    }
}
