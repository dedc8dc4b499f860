//! Explanation and skill keys used by the catalogue.
//!
//! The text behind each key lives with the translation service; only the keys are defined here.

use stepwise_engine::transformation::MetadataKey;

const fn general(key: &'static str) -> MetadataKey {
    MetadataKey::new("General", key)
}

const fn integers(key: &'static str) -> MetadataKey {
    MetadataKey::new("IntegerArithmetic", key)
}

const fn fractions(key: &'static str) -> MetadataKey {
    MetadataKey::new("FractionArithmetic", key)
}

const fn mixed_numbers(key: &'static str) -> MetadataKey {
    MetadataKey::new("MixedNumbers", key)
}

const fn skill(key: &'static str) -> MetadataKey {
    MetadataKey::new("Skill", key)
}

/// `(a + b) + c -> a + b + c`
pub const REMOVE_BRACKET_SUM_IN_SUM: MetadataKey = general("RemoveBracketSumInSum");

/// `a + 0 -> a`
pub const ELIMINATE_ZERO_IN_SUM: MetadataKey = general("EliminateZeroInSum");

/// `2 + 3 -> 5`
pub const EVALUATE_INTEGER_ADDITION: MetadataKey = integers("EvaluateIntegerAddition");

/// `2 * 3 -> 6`
pub const EVALUATE_INTEGER_PRODUCT: MetadataKey = integers("EvaluateIntegerProduct");

/// `3 + [1 / 2] -> [3 / 1] + [1 / 2]`
pub const CONVERT_INTEGER_TO_FRACTION: MetadataKey = fractions("ConvertIntegerToFraction");

/// `[1 / 5] + [2 / 5] -> [3 / 5]`
pub const ADD_LIKE_FRACTIONS: MetadataKey = fractions("AddLikeFractions");

/// `[1 / 2] + [1 / 3] -> [1 * 3 / 2 * 3] + [1 * 2 / 3 * 2]`
pub const BRING_TO_COMMON_DENOMINATOR: MetadataKey = fractions("BringToCommonDenominator");

/// Every product in the numerators and denominators is evaluated.
pub const EVALUATE_PRODUCTS_IN_NUMERATOR_AND_DENOMINATOR: MetadataKey =
    fractions("EvaluateProductsInNumeratorAndDenominator");

pub const ADD_FRACTIONS: MetadataKey = fractions("AddFractions");

/// `[1 / 4] -> 0.25`
pub const CONVERT_FRACTION_TO_DECIMAL: MetadataKey = fractions("ConvertFractionToDecimal");

/// `[5 1/4] -> 5 + [1 / 4]`
pub const CONVERT_MIXED_NUMBER_TO_SUM: MetadataKey = mixed_numbers("ConvertMixedNumberToSum");

pub const CONVERT_MIXED_NUMBERS_TO_SUMS: MetadataKey = mixed_numbers("ConvertMixedNumbersToSums");

/// `[5 1/4] -> [21 / 4]`
pub const CONVERT_MIXED_NUMBER_TO_IMPROPER_FRACTION: MetadataKey =
    mixed_numbers("ConvertMixedNumberToImproperFraction");

/// `[21 / 4] -> [5 1/4]`
pub const CONVERT_FRACTION_TO_MIXED_NUMBER: MetadataKey = mixed_numbers("ConvertFractionToMixedNumber");

/// `5 + [1 / 4] -> [5 1/4]`
pub const CONVERT_SUM_OF_INTEGER_AND_PROPER_FRACTION_TO_MIXED_NUMBER: MetadataKey =
    mixed_numbers("ConvertSumOfIntegerAndProperFractionToMixedNumber");

pub const ADD_MIXED_NUMBERS: MetadataKey = mixed_numbers("AddMixedNumbers");

pub const ADD_WHOLE_PARTS: MetadataKey = mixed_numbers("AddWholeParts");

pub const ADD_FRACTIONAL_PARTS: MetadataKey = mixed_numbers("AddFractionalParts");

pub const COMBINE_PARTS: MetadataKey = mixed_numbers("CombineWholeAndFractionalParts");

pub const DIVISION_WITH_REMAINDER: MetadataKey = skill("DivisionWithRemainder");

pub const SKILL_ADD_FRACTIONS: MetadataKey = skill("AddFractions");
