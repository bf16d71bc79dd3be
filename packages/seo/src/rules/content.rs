use super::{ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

/// Word-count tiers, each worth 5 points
const WORD_TIERS: [usize; 3] = [300, 600, 1000];

/// Content volume and structure
pub struct ContentRule;

impl SeoRule for ContentRule {
    fn name(&self) -> &'static str {
        "content"
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        let blocks = ctx.document.blocks();
        let words = ctx.words;
        let mut checks = Vec::with_capacity(6);

        // Only the first unmet tier is reported
        let mut reported = false;
        for tier in WORD_TIERS {
            let rule = format!("content-words-{}", tier);
            if words >= tier {
                checks.push(SeoCheck::pass(
                    Category::Content,
                    rule,
                    5,
                    format!("Content has at least {} words", tier),
                ));
            } else if !reported {
                reported = true;
                checks.push(SeoCheck::fail(
                    Category::Content,
                    rule,
                    5,
                    format!("Content is too short ({} words, aim for at least {})", words, tier),
                ));
            } else {
                checks.push(SeoCheck::skipped(Category::Content, rule, 5));
            }
        }

        if blocks.is_empty() {
            checks.push(SeoCheck::fail(Category::Content, "content-blocks", 5, "No contents blocks"));
            checks.push(SeoCheck::skipped(Category::Content, "content-heading", 5));
            checks.push(SeoCheck::skipped(Category::Content, "content-media", 5));
            return checks;
        }

        checks.push(SeoCheck::pass(
            Category::Content,
            "content-blocks",
            5,
            format!("Page has {} content blocks", blocks.len()),
        ));

        checks.push(if blocks.iter().any(|b| b.block_type().is_heading_like()) {
            SeoCheck::pass(Category::Content, "content-heading", 5, "Page has a heading")
        } else {
            SeoCheck::fail(Category::Content, "content-heading", 5, "Add a heading or hero block")
        });

        checks.push(if blocks.iter().any(|b| b.block_type().is_media()) {
            SeoCheck::pass(Category::Content, "content-media", 5, "Page has images")
        } else {
            SeoCheck::fail(Category::Content, "content-media", 5, "Add an image or gallery block")
        });

        checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::{BlockType, Command, Document};
    use serde_json::json;

    fn doc_with_words(words: usize) -> Document {
        let mut doc = Document::new("page");
        doc.apply(Command::AddBlock {
            block_type: BlockType::Text,
            after_index: None,
        });
        let id = doc.blocks()[0].id.clone();
        let contents = vec!["word"; words].join(" ");
        doc.apply(Command::UpdateBlock {
            id,
            data: json!({ "contents": contents }).as_object().unwrap().clone(),
        });
        doc
    }

    fn points(doc: &Document) -> u8 {
        ContentRule
            .check(&ScoreContext::new(doc))
            .iter()
            .filter(|c| c.rule.starts_with("content-words"))
            .map(|c| c.points)
            .sum()
    }

    #[test]
    fn test_word_tiers() {
        assert_eq!(points(&doc_with_words(299)), 0);
        assert_eq!(points(&doc_with_words(300)), 5);
        assert_eq!(points(&doc_with_words(600)), 10);
        assert_eq!(points(&doc_with_words(1000)), 15);
    }

    #[test]
    fn test_only_first_missing_tier_is_reported() {
        let doc = doc_with_words(10);
        let checks = ContentRule.check(&ScoreContext::new(&doc));
        let messages: Vec<_> = checks.iter().filter_map(|c| c.message.as_deref()).collect();

        assert!(messages.contains(&"Content is too short (10 words, aim for at least 300)"));
        assert!(!messages.iter().any(|m| m.contains("aim for at least 600")));
        assert!(messages.contains(&"Add a heading or hero block"));
        assert!(messages.contains(&"Add an image or gallery block"));
    }

    #[test]
    fn test_empty_page() {
        let doc = Document::new("page");
        let checks = ContentRule.check(&ScoreContext::new(&doc));

        assert!(checks.iter().any(|c| c.message.as_deref() == Some("No contents blocks")));
        assert_eq!(checks.iter().map(|c| c.max_points).sum::<u8>(), 30);
    }
}
