use super::{bounded_field_checks, ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

const MIN_LEN: usize = 120;
const MAX_LEN: usize = 160;

/// Meta description exists, is 120-160 characters and contains the keyword
pub struct MetaDescriptionRule;

impl SeoRule for MetaDescriptionRule {
    fn name(&self) -> &'static str {
        "meta-description"
    }

    fn category(&self) -> Category {
        Category::MetaDescription
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        bounded_field_checks(
            ctx,
            Category::MetaDescription,
            "meta-description",
            "meta description",
            &ctx.document.meta_description,
            MIN_LEN,
            MAX_LEN,
        )
    }
}
