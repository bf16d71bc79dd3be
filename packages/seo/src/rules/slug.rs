use super::{ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

const MAX_LEN: usize = 75;

/// Slug exists, is at most 75 characters and contains the keyword
pub struct SlugRule;

impl SeoRule for SlugRule {
    fn name(&self) -> &'static str {
        "slug"
    }

    fn category(&self) -> Category {
        Category::Slug
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        let slug = ctx.document.slug.trim().to_lowercase();

        if slug.is_empty() {
            return vec![
                SeoCheck::fail(Category::Slug, "slug-exists", 3, "Missing slug"),
                SeoCheck::skipped(Category::Slug, "slug-length", 3),
                SeoCheck::skipped(Category::Slug, "slug-keyword", 4),
            ];
        }

        let mut checks = vec![SeoCheck::pass(Category::Slug, "slug-exists", 3, "Slug is set")];

        let len = slug.chars().count();
        checks.push(if len <= MAX_LEN {
            SeoCheck::pass(Category::Slug, "slug-length", 3, "Slug length is fine")
        } else {
            SeoCheck::fail(
                Category::Slug,
                "slug-length",
                3,
                format!("Slug should be {} characters or fewer (currently {})", MAX_LEN, len),
            )
        });

        checks.push(if ctx.keyword.is_empty() {
            SeoCheck::skipped(Category::Slug, "slug-keyword", 4)
        } else if slug.contains(&ctx.keyword) || slug.contains(&slugify(&ctx.keyword)) {
            SeoCheck::pass(Category::Slug, "slug-keyword", 4, "Slug contains the primary keyword")
        } else {
            SeoCheck::fail(
                Category::Slug,
                "slug-keyword",
                4,
                "Slug should contain the primary keyword",
            )
        });

        checks
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to one `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::Document;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Lisbon Travel Guide"), "lisbon-travel-guide");
        assert_eq!(slugify("  café & bars!  "), "café-bars");
    }

    #[test]
    fn test_multi_word_keyword_matches_slug() {
        let mut doc = Document::new("page");
        doc.slug = "lisbon-travel-guide-2026".to_string();
        doc.primary_keyword = "Lisbon travel guide".to_string();

        let checks = SlugRule.check(&ScoreContext::new(&doc));
        assert!(checks.iter().all(|c| c.passed()));
    }

    #[test]
    fn test_long_slug() {
        let mut doc = Document::new("page");
        doc.slug = "a".repeat(76);

        let checks = SlugRule.check(&ScoreContext::new(&doc));
        assert!(!checks[1].passed());
    }
}
