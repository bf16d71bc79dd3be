//! Publish gate: turns a score report into a publish decision.

use crate::report::SeoReport;
use serde::{Deserialize, Serialize};

/// Which failures block publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GateConfig {
    /// Minimum score required to publish (0 disables the threshold)
    pub min_publish_score: u8,
    pub require_title: bool,
    pub require_meta_description: bool,
    pub require_hero_image: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_publish_score: 0,
            require_title: true,
            require_meta_description: true,
            require_hero_image: true,
        }
    }
}

/// Publish decision derived from a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoValidation {
    pub can_publish: bool,

    /// Issues that prevent publishing
    pub blocking: Vec<String>,

    /// Remaining issues, shown but not enforced
    pub warnings: Vec<String>,
}

impl SeoValidation {
    pub fn passing() -> Self {
        Self {
            can_publish: true,
            blocking: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn blocked(blocking: Vec<String>) -> Self {
        Self {
            can_publish: blocking.is_empty(),
            blocking,
            warnings: Vec::new(),
        }
    }
}

/// Evaluate a report against the gate configuration
pub fn validate(report: &SeoReport, config: &GateConfig) -> SeoValidation {
    let required = [
        (config.require_title, "title-exists"),
        (config.require_meta_description, "meta-description-exists"),
        (config.require_hero_image, "hero-image-exists"),
    ];

    let mut blocking = Vec::new();
    let mut blocking_rules = Vec::new();

    for (enabled, rule) in required {
        if !enabled {
            continue;
        }
        if let Some(check) = report.checks.iter().find(|c| c.rule == rule && !c.passed()) {
            if let Some(message) = &check.message {
                blocking.push(message.clone());
            }
            blocking_rules.push(rule);
        }
    }

    if report.score < config.min_publish_score {
        blocking.push(format!(
            "SEO score {} is below the minimum of {}",
            report.score, config.min_publish_score
        ));
    }

    let warnings = report
        .checks
        .iter()
        .filter(|c| !c.passed() && !blocking_rules.contains(&c.rule.as_str()))
        .filter_map(|c| c.message.clone())
        .collect();

    SeoValidation {
        can_publish: blocking.is_empty(),
        blocking,
        warnings,
    }
}
