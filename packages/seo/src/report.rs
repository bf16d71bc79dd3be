use serde::{Deserialize, Serialize};

/// Rubric category a check scores into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Title,
    MetaDescription,
    HeroImage,
    Content,
    Keyword,
    Slug,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Title,
        Category::MetaDescription,
        Category::HeroImage,
        Category::Content,
        Category::Keyword,
        Category::Slug,
    ];

    /// Points available in this category (all categories sum to 100)
    pub fn max_points(self) -> u8 {
        match self {
            Category::Title => 15,
            Category::MetaDescription => 15,
            Category::HeroImage => 15,
            Category::Content => 30,
            Category::Keyword => 15,
            Category::Slug => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Title => "Title",
            Category::MetaDescription => "Meta description",
            Category::HeroImage => "Hero image",
            Category::Content => "Content",
            Category::Keyword => "Keyword",
            Category::Slug => "Slug",
        }
    }
}

/// Outcome of a single rubric check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoCheck {
    pub category: Category,

    /// Stable identifier (`"title-length"`, ...)
    pub rule: String,

    /// Points awarded
    pub points: u8,

    /// Points available
    pub max_points: u8,

    /// User-facing message; checks that only fail because a prerequisite
    /// failed carry no message
    pub message: Option<String>,
}

impl SeoCheck {
    pub fn pass(category: Category, rule: impl Into<String>, points: u8, message: impl Into<String>) -> Self {
        Self {
            category,
            rule: rule.into(),
            points,
            max_points: points,
            message: Some(message.into()),
        }
    }

    pub fn fail(category: Category, rule: impl Into<String>, max_points: u8, message: impl Into<String>) -> Self {
        Self {
            category,
            rule: rule.into(),
            points: 0,
            max_points,
            message: Some(message.into()),
        }
    }

    /// A failed check that does not produce its own issue
    pub fn skipped(category: Category, rule: impl Into<String>, max_points: u8) -> Self {
        Self {
            category,
            rule: rule.into(),
            points: 0,
            max_points,
            message: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.points == self.max_points
    }
}

/// Result of scoring a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    /// 0..=100
    pub score: u8,

    /// Messages of failed checks, in rubric order
    pub issues: Vec<String>,

    /// Messages of passed checks, in rubric order
    pub passed: Vec<String>,

    pub total_words: usize,

    /// Full per-check breakdown
    pub checks: Vec<SeoCheck>,
}

impl SeoReport {
    pub fn from_checks(checks: Vec<SeoCheck>, total_words: usize) -> Self {
        let total: u32 = checks.iter().map(|c| u32::from(c.points)).sum();
        let mut issues = Vec::new();
        let mut passed = Vec::new();

        for check in &checks {
            if let Some(message) = &check.message {
                if check.passed() {
                    passed.push(message.clone());
                } else {
                    issues.push(message.clone());
                }
            }
        }

        Self {
            score: total.min(100) as u8,
            issues,
            passed,
            total_words,
            checks,
        }
    }

    /// Awarded and available points for one category
    pub fn category_score(&self, category: Category) -> (u8, u8) {
        self.checks
            .iter()
            .filter(|c| c.category == category)
            .fold((0, 0), |(got, max), c| (got + c.points, max + c.max_points))
    }

    /// Whether the check with this rule id passed
    pub fn rule_passed(&self, rule: &str) -> bool {
        self.checks.iter().any(|c| c.rule == rule && c.passed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_points_sum_to_100() {
        let total: u32 = Category::ALL.iter().map(|c| u32::from(c.max_points())).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_report_splits_messages() {
        let report = SeoReport::from_checks(
            vec![
                SeoCheck::pass(Category::Title, "title-exists", 5, "Title is set"),
                SeoCheck::fail(Category::Slug, "slug-exists", 3, "Missing slug"),
                SeoCheck::skipped(Category::Slug, "slug-length", 3),
            ],
            0,
        );

        assert_eq!(report.score, 5);
        assert_eq!(report.passed, vec!["Title is set"]);
        assert_eq!(report.issues, vec!["Missing slug"]);
        assert_eq!(report.category_score(Category::Slug), (0, 6));
        assert!(report.rule_passed("title-exists"));
        assert!(!report.rule_passed("slug-length"));
    }
}
