use super::{ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

/// Keyword is set, appears in the content, and is used in both the title
/// and the meta description
pub struct KeywordRule;

impl SeoRule for KeywordRule {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn category(&self) -> Category {
        Category::Keyword
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        if ctx.keyword.is_empty() {
            return vec![
                SeoCheck::fail(Category::Keyword, "keyword-set", 5, "No primary keyword set"),
                SeoCheck::skipped(Category::Keyword, "keyword-in-content", 5),
                SeoCheck::skipped(Category::Keyword, "keyword-in-metadata", 5),
            ];
        }

        let in_content = if ctx.content.contains(&ctx.keyword) {
            SeoCheck::pass(
                Category::Keyword,
                "keyword-in-content",
                5,
                "Primary keyword appears in the content",
            )
        } else {
            SeoCheck::fail(
                Category::Keyword,
                "keyword-in-content",
                5,
                "Primary keyword does not appear in the content",
            )
        };

        let doc = ctx.document;
        let in_metadata =
            if ctx.mentions_keyword(&doc.title) && ctx.mentions_keyword(&doc.meta_description) {
                SeoCheck::pass(
                    Category::Keyword,
                    "keyword-in-metadata",
                    5,
                    "Primary keyword is used in title and meta description",
                )
            } else {
                SeoCheck::fail(
                    Category::Keyword,
                    "keyword-in-metadata",
                    5,
                    "Use the primary keyword in both the title and the meta description",
                )
            };

        vec![
            SeoCheck::pass(Category::Keyword, "keyword-set", 5, "Primary keyword is set"),
            in_content,
            in_metadata,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::Document;

    #[test]
    fn test_unset_keyword() {
        let doc = Document::new("page");
        let checks = KeywordRule.check(&ScoreContext::new(&doc));

        assert_eq!(checks[0].message.as_deref(), Some("No primary keyword set"));
        assert!(checks.iter().all(|c| c.points == 0));
    }

    #[test]
    fn test_whitespace_keyword_counts_as_unset() {
        let mut doc = Document::new("page");
        doc.primary_keyword = "   ".to_string();
        let checks = KeywordRule.check(&ScoreContext::new(&doc));

        assert!(!checks[0].passed());
    }

    #[test]
    fn test_keyword_needed_in_title_and_description() {
        let mut doc = Document::new("page");
        doc.primary_keyword = "lisbon".to_string();
        doc.title = "Lisbon for beginners".to_string();

        let checks = KeywordRule.check(&ScoreContext::new(&doc));
        assert!(!checks[2].passed());

        doc.meta_description = "Everything about lisbon".to_string();
        let checks = KeywordRule.check(&ScoreContext::new(&doc));
        assert!(checks[2].passed());
    }
}
