//! # Pagecraft SEO
//!
//! Derived SEO quality score for page documents.
//!
//! The scorer is a pure projection of the document: it keeps no state and is
//! recomputed on every change. The publish gate consumes its report.
//!
//! ## Rubric
//!
//! | Category         | Points |
//! |------------------|--------|
//! | Title            | 15     |
//! | Meta description | 15     |
//! | Hero image       | 15     |
//! | Content          | 30     |
//! | Keyword          | 15     |
//! | Slug             | 10     |

mod gate;
mod report;
mod rules;
mod scorer;

pub use gate::{validate, GateConfig, SeoValidation};
pub use report::{Category, SeoCheck, SeoReport};
pub use rules::{
    ContentRule, HeroImageRule, KeywordRule, MetaDescriptionRule, RuleRegistry, ScoreContext,
    SeoRule, SlugRule, TitleRule,
};
pub use scorer::{score, score_with};
