use crate::report::SeoReport;
use crate::rules::{RuleRegistry, ScoreContext};
use pagecraft_model::Document;
use tracing::debug;

/// Score a document against the standard rubric.
///
/// Pure and deterministic: the same document always yields the same report.
/// Callers recompute it on every change instead of storing it.
pub fn score(document: &Document) -> SeoReport {
    score_with(document, &RuleRegistry::new())
}

/// Score a document against a custom rule registry
pub fn score_with(document: &Document, registry: &RuleRegistry) -> SeoReport {
    let ctx = ScoreContext::new(document);

    let checks = registry
        .rules()
        .iter()
        .flat_map(|rule| rule.check(&ctx))
        .collect();

    let report = SeoReport::from_checks(checks, ctx.words);
    debug!(
        document_id = %document.id,
        score = report.score,
        issues = report.issues.len(),
        "Scored document"
    );
    report
}
