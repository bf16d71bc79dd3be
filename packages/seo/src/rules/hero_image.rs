use super::{ScoreContext, SeoRule};
use crate::report::{Category, SeoCheck};

const MODERN_FORMATS: &[&str] = &[".webp", ".avif"];

/// Hero image exists and uses a modern compressed format
pub struct HeroImageRule;

impl SeoRule for HeroImageRule {
    fn name(&self) -> &'static str {
        "hero-image"
    }

    fn category(&self) -> Category {
        Category::HeroImage
    }

    fn check(&self, ctx: &ScoreContext<'_>) -> Vec<SeoCheck> {
        let image = ctx.document.hero_image.trim();

        if image.is_empty() {
            return vec![
                SeoCheck::fail(Category::HeroImage, "hero-image-exists", 10, "Missing hero image"),
                SeoCheck::skipped(Category::HeroImage, "hero-image-format", 5),
            ];
        }

        let format = if is_modern_format(image) {
            SeoCheck::pass(
                Category::HeroImage,
                "hero-image-format",
                5,
                "Hero image uses a modern format",
            )
        } else {
            SeoCheck::fail(
                Category::HeroImage,
                "hero-image-format",
                5,
                "Hero image should use a modern format (WebP or AVIF)",
            )
        };

        vec![
            SeoCheck::pass(Category::HeroImage, "hero-image-exists", 10, "Hero image is set"),
            format,
        ]
    }
}

/// Extension check that ignores query strings, fragments and case
pub fn is_modern_format(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    MODERN_FORMATS.iter().any(|ext| path.ends_with(ext))
}
