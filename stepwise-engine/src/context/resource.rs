//! Selection among alternative implementations tailored to different contexts.
//!
//! Each alternative declares, through its [`ResourceData`], the context dimensions it was
//! written for. A dimension the resource declares scores [`BEST_SCORE`] if the context declares
//! the same value and [`WORST_SCORE`] otherwise; a dimension the resource leaves open scores
//! [`DEFAULT_SCORE`]. The score of a resource is the product over all dimensions, so a single
//! mismatch outweighs any number of unconstrained dimensions.

use super::{Context, Curriculum};

pub const BEST_SCORE: f64 = 1.0;
pub const DEFAULT_SCORE: f64 = 0.5;
/// Score of a declared dimension the context does not share. Scoring schemes have used both
/// `0.0` and `0.1`; with `0.1`, fewer mismatches still rank higher instead of all tying at zero.
pub const WORST_SCORE: f64 = 0.1;

/// The context dimensions a resource is tailored for. `None` means "no opinion".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceData {
    /// The curriculum the resource follows.
    pub curriculum: Option<Curriculum>,

    /// Whether the resource presents results as decimals.
    pub prefer_decimals: Option<bool>,
}

fn dimension_score<T: PartialEq>(resource: Option<&T>, context: Option<&T>) -> f64 {
    match resource {
        None => DEFAULT_SCORE,
        Some(value) if Some(value) == context => BEST_SCORE,
        Some(_) => WORST_SCORE,
    }
}

impl ResourceData {
    /// Data with no opinion on any dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tailors the resource to a curriculum.
    pub fn with_curriculum(mut self, curriculum: Curriculum) -> Self {
        self.curriculum = Some(curriculum);
        self
    }

    /// Tailors the resource to a decimal preference.
    pub fn with_prefer_decimals(mut self, prefer_decimals: bool) -> Self {
        self.prefer_decimals = Some(prefer_decimals);
        self
    }

    /// How well the resource suits the context, between `WORST_SCORE²` and `BEST_SCORE`.
    pub fn score(&self, ctx: &Context) -> f64 {
        dimension_score(self.curriculum.as_ref(), ctx.curriculum().as_ref())
            * dimension_score(self.prefer_decimals.as_ref(), ctx.prefer_decimals().as_ref())
    }
}

/// Something tagged with the context dimensions it is tailored for.
pub trait Resource {
    /// The dimensions the resource is tailored for.
    fn resource_data(&self) -> &ResourceData;
}

impl Context {
    /// Returns the alternative that suits this context strictly better than every alternative
    /// before it and than `default`, or `default` if none does.
    pub fn select_best_resource<'a, R: Resource>(&self, default: &'a R, alternatives: &'a [R]) -> &'a R {
        let mut best = default;
        let mut best_score = default.resource_data().score(self);
        for alternative in alternatives {
            let score = alternative.resource_data().score(self);
            if score > best_score {
                best = alternative;
                best_score = score;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestResource(ResourceData);

    impl Resource for TestResource {
        fn resource_data(&self) -> &ResourceData {
            &self.0
        }
    }

    fn us() -> TestResource {
        TestResource(ResourceData::new().with_curriculum(Curriculum::Us))
    }

    fn eu() -> TestResource {
        TestResource(ResourceData::new().with_curriculum(Curriculum::Eu))
    }

    fn dec() -> TestResource {
        TestResource(ResourceData::new().with_prefer_decimals(true))
    }

    fn no_dec() -> TestResource {
        TestResource(ResourceData::new().with_prefer_decimals(false))
    }

    fn eu_no_dec() -> TestResource {
        TestResource(ResourceData::new().with_curriculum(Curriculum::Eu).with_prefer_decimals(false))
    }

    #[test]
    fn empty_context_selects_default() {
        let ctx = Context::new();
        assert_eq!(ctx.select_best_resource(&eu(), &[us()]), &eu());
        assert_eq!(ctx.select_best_resource(&us(), &[eu()]), &us());
        assert_eq!(ctx.select_best_resource(&dec(), &[no_dec(), us()]), &dec());
        assert_eq!(ctx.select_best_resource(&no_dec(), &[dec(), us()]), &no_dec());
    }

    #[test]
    fn us_context_selects_us_resource() {
        let ctx = Context::new().with_curriculum(Curriculum::Us);
        assert_eq!(ctx.select_best_resource(&us(), &[eu()]), &us());
        assert_eq!(ctx.select_best_resource(&eu(), &[us()]), &us());
        assert_eq!(ctx.select_best_resource(&dec(), &[no_dec()]), &dec());
        assert_eq!(ctx.select_best_resource(&no_dec(), &[dec()]), &no_dec());
    }

    #[test]
    fn decimal_context_selects_decimal_resource() {
        let ctx = Context::new().with_prefer_decimals(true);
        assert_eq!(ctx.select_best_resource(&us(), &[eu()]), &us());
        assert_eq!(ctx.select_best_resource(&eu(), &[us()]), &eu());
        assert_eq!(ctx.select_best_resource(&dec(), &[no_dec()]), &dec());
        assert_eq!(ctx.select_best_resource(&no_dec(), &[dec()]), &dec());
    }

    #[test]
    fn composite_context() {
        let ctx = Context::new().with_curriculum(Curriculum::Eu).with_prefer_decimals(false);
        assert_eq!(ctx.select_best_resource(&us(), &[eu()]), &eu());
        assert_eq!(ctx.select_best_resource(&eu(), &[us()]), &eu());
        assert_eq!(ctx.select_best_resource(&dec(), &[no_dec()]), &no_dec());
        assert_eq!(ctx.select_best_resource(&no_dec(), &[dec()]), &no_dec());
        assert_eq!(ctx.select_best_resource(&no_dec(), &[eu(), eu_no_dec(), us()]), &eu_no_dec());

        // an exact decimal match beats a curriculum mismatch and the default's mismatch
        let default = dec();
        let a = no_dec();
        let b = us();
        let alternatives = [a, b];
        assert!(std::ptr::eq(ctx.select_best_resource(&default, &alternatives), &alternatives[0]));
    }

    #[test]
    fn scores_multiply() {
        let ctx = Context::new().with_curriculum(Curriculum::Eu).with_prefer_decimals(false);
        assert_eq!(eu_no_dec().0.score(&ctx), BEST_SCORE);
        assert_eq!(ResourceData::new().score(&ctx), DEFAULT_SCORE * DEFAULT_SCORE);
        assert!((us().0.score(&ctx) - WORST_SCORE * DEFAULT_SCORE).abs() < 1e-12);
    }

    #[test]
    fn fewer_mismatches_rank_higher() {
        let ctx = Context::new().with_curriculum(Curriculum::Eu).with_prefer_decimals(false);
        let both_wrong = TestResource(ResourceData::new().with_curriculum(Curriculum::Us).with_prefer_decimals(true));
        let one_wrong = TestResource(ResourceData::new().with_curriculum(Curriculum::Us).with_prefer_decimals(false));
        assert!(both_wrong.0.score(&ctx) > 0.0);
        assert_eq!(ctx.select_best_resource(&both_wrong, &[one_wrong]).0.prefer_decimals, Some(false));
    }
}
