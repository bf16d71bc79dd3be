use super::{bounded_field_checks, ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

const MIN_LEN: usize = 30;
const MAX_LEN: usize = 60;

/// Title exists, is 30-60 characters and contains the keyword
pub struct TitleRule;

impl SeoRule for TitleRule {
    fn name(&self) -> &'static str {
        "title"
    }

    fn category(&self) -> Category {
        Category::Title
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        bounded_field_checks(
            ctx,
            Category::Title,
            "title",
            "title",
            &ctx.document.title,
            MIN_LEN,
            MAX_LEN,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::Document;

    fn run(title: &str, keyword: &str) -> Vec<SeoCheck> {
        let mut doc = Document::new("page");
        doc.title = title.to_string();
        doc.primary_keyword = keyword.to_string();
        TitleRule.check(&ScoreContext::new(&doc))
    }

    #[test]
    fn test_missing_title() {
        let checks = run("   ", "lisbon");
        assert_eq!(checks[0].message.as_deref(), Some("Missing title"));
        assert!(checks.iter().all(|c| c.points == 0));
        assert!(checks[1].message.is_none());
    }

    #[test]
    fn test_length_bounds_are_inclusive() {
        let thirty = "a".repeat(30);
        let sixty = "a".repeat(60);
        let sixty_one = "a".repeat(61);

        assert!(run(&thirty, "")[1].passed());
        assert!(run(&sixty, "")[1].passed());
        assert!(!run(&sixty_one, "")[1].passed());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let checks = run("Visiting LISBON on a budget this year", "lisbon");
        assert!(checks[2].passed());
    }
}
