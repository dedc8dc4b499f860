//! The catalogue of named strategies.

use crate::{fractions, general, integers, mixed_numbers};
use once_cell::sync::Lazy;
use stepwise_engine::registry::Registry;

/// Every strategy of the catalogue, by name.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::builder()
        .register(general::REMOVE_BRACKETS_SUM.clone(), "removes brackets around a sum inside a sum")
        .register(general::ELIMINATE_ZERO_IN_SUM_RULE.clone(), "removes a zero term from a sum")
        .register(integers::EVALUATE_SIGNED_INTEGER_ADDITION.clone(), "adds two integer terms of a sum")
        .register(integers::EVALUATE_INTEGER_PRODUCT_RULE.clone(), "multiplies two integer factors of a product")
        .register(fractions::CONVERT_INTEGER_TO_FRACTION_RULE.clone(), "writes an integer as a fraction over one")
        .register(fractions::ADD_LIKE_FRACTIONS_RULE.clone(), "adds two fractions with the same denominator")
        .register(fractions::BRING_TO_COMMON_DENOMINATOR_RULE.clone(), "brings two fractions to a common denominator")
        .register(fractions::CONVERT_FRACTION_TO_DECIMAL_RULE.clone(), "converts a fraction to a rounded decimal")
        .register(fractions::EVALUATE_PRODUCTS_IN_FRACTIONS.clone(), "evaluates the products inside fractions")
        .register(fractions::ADD_FRACTIONS_PLAN.clone(), "adds two integer fractions")
        .register(mixed_numbers::SPLIT_MIXED_NUMBER.clone(), "writes a mixed number as a sum")
        .register(mixed_numbers::FRACTION_TO_MIXED_NUMBER.clone(), "converts an improper fraction to a mixed number")
        .register(
            mixed_numbers::INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER.clone(),
            "joins an integer and a proper fraction into a mixed number",
        )
        .register(
            mixed_numbers::CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION.clone(),
            "converts a mixed number to an improper fraction",
        )
        .register(mixed_numbers::CONVERT_MIXED_NUMBERS_TO_SUMS.clone(), "writes every mixed number of a sum as a sum")
        .register(
            mixed_numbers::ADD_MIXED_NUMBERS_BY_CONVERTING.clone(),
            "adds mixed numbers through improper fractions",
        )
        .register(
            mixed_numbers::ADD_MIXED_NUMBERS_USING_COMMUTATIVITY.clone(),
            "adds the whole and fractional parts of mixed numbers separately",
        )
        .register(mixed_numbers::ADD_MIXED_NUMBERS_PLAN.clone(), "adds mixed numbers the way the context prefers")
        .register(mixed_numbers::ADD_MIXED_NUMBERS_IN_TASKS.clone(), "adds mixed numbers in separate tasks")
        .build()
});

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepwise_engine::{
        context::Context,
        error::{Error, UnknownStrategy},
        expr::{Expression, Subexpression},
        primitive::int,
    };
    use super::*;

    #[test]
    fn every_strategy_is_registered() {
        assert_eq!(REGISTRY.len(), 19);
        assert!(REGISTRY.names().contains(&"AddMixedNumbers"));
        assert!(REGISTRY.names().contains(&"AddMixedNumbersInTasks"));
    }

    #[test]
    fn lookup_and_execute() {
        let sum = Expression::sum(vec![
            Expression::mixed_number(int(1), int(1), int(2)).unwrap(),
            Expression::mixed_number(int(2), int(1), int(3)).unwrap(),
        ]).unwrap();
        let method = REGISTRY.get("AddMixedNumbers").unwrap();
        let result = method
            .try_execute(&Context::new(), &Subexpression::root(sum))
            .unwrap()
            .unwrap();
        assert_eq!(result.to.expr.to_string(), "[3 5/6]");
    }

    #[test]
    fn misspelled_name() {
        let error = REGISTRY.get("AddFraction").err().unwrap();
        assert_eq!(error, Error::from(UnknownStrategy {
            name: "AddFraction".to_string(),
            suggestions: vec!["AddFractions".to_string()],
        }));
    }
}
