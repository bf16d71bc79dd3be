mod content;
mod hero_image;
mod keyword;
mod meta_description;
mod slug;
mod title;

pub use content::ContentRule;
pub use hero_image::HeroImageRule;
pub use keyword::KeywordRule;
pub use meta_description::MetaDescriptionRule;
pub use slug::SlugRule;
pub use title::TitleRule;

use crate::report::{Category, SeoCheck};
use pagecraft_model::{content_text, word_count, Document};

/// Values shared by every rule, computed once per scoring pass
#[derive(Debug)]
pub struct ScoreContext<'a> {
    pub document: &'a Document,

    /// Trimmed, lowercased primary keyword (empty when unset)
    pub keyword: String,

    /// Lowercased block prose
    pub content: String,

    pub words: usize,
}

impl<'a> ScoreContext<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            keyword: document.primary_keyword.trim().to_lowercase(),
            content: content_text(document.blocks()).to_lowercase(),
            words: word_count(document.blocks()),
        }
    }

    /// Case-insensitive keyword containment; an unset keyword never matches
    pub fn mentions_keyword(&self, text: &str) -> bool {
        !self.keyword.is_empty() && text.to_lowercase().contains(&self.keyword)
    }
}

/// Trait for implementing rubric rules
pub trait SeoRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Produce this rule's checks; their `max_points` must sum to the
    /// category's points
    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck>;
}

/// Registry of scoring rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn SeoRule>>,
}

impl RuleRegistry {
    /// Create a registry with the standard rubric
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TitleRule),
                Box::new(MetaDescriptionRule),
                Box::new(HeroImageRule),
                Box::new(ContentRule),
                Box::new(KeywordRule),
                Box::new(SlugRule),
            ],
        }
    }

    pub fn rules(&self) -> &[Box<dyn SeoRule>] {
        &self.rules
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn SeoRule>) {
        self.rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}

/// Shared checks for a required, length-bounded field that should contain
/// the keyword (title and meta description)
pub(crate) fn bounded_field_checks(
    ctx: &ScoreContext<'_>,
    category: Category,
    prefix: &str,
    label: &str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> Vec<SeoCheck> {
    let value = value.trim();
    let exists_rule = format!("{}-exists", prefix);
    let length_rule = format!("{}-length", prefix);
    let keyword_rule = format!("{}-keyword", prefix);

    if value.is_empty() {
        return vec![
            SeoCheck::fail(category, exists_rule, 5, format!("Missing {}", label)),
            SeoCheck::skipped(category, length_rule, 5),
            SeoCheck::skipped(category, keyword_rule, 5),
        ];
    }

    let mut checks = vec![SeoCheck::pass(
        category,
        exists_rule,
        5,
        format!("{} is set", capitalize(label)),
    )];

    let len = value.chars().count();
    if (min_len..=max_len).contains(&len) {
        checks.push(SeoCheck::pass(
            category,
            length_rule,
            5,
            format!("{} length is {} characters", capitalize(label), len),
        ));
    } else {
        checks.push(SeoCheck::fail(
            category,
            length_rule,
            5,
            format!(
                "{} should be {}-{} characters (currently {})",
                capitalize(label),
                min_len,
                max_len,
                len
            ),
        ));
    }

    if ctx.keyword.is_empty() {
        checks.push(SeoCheck::skipped(category, keyword_rule, 5));
    } else if ctx.mentions_keyword(value) {
        checks.push(SeoCheck::pass(
            category,
            keyword_rule,
            5,
            format!("{} contains the primary keyword", capitalize(label)),
        ));
    } else {
        checks.push(SeoCheck::fail(
            category,
            keyword_rule,
            5,
            format!("{} does not contain the primary keyword", capitalize(label)),
        ));
    }

    checks
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
