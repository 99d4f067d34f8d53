/*!
 * Validation service that orchestrates all content rules.
 *
 * This module provides a unified interface for running every enabled rule
 * on a parsed episode and deriving the episode's validation status.
 */

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::rules::{self, Findings};
use crate::app_config::ValidationConfig;
use crate::script::Episode;

/// Overall outcome of validating an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Passed,
    Warning,
    Failed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }

    /// Whether the episode can move on to production
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured feedback for script authors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub missing_tags: Vec<String>,
    #[serde(default)]
    pub format_violations: Vec<String>,
    #[serde(default)]
    pub quality_suggestions: Vec<String>,
}

impl Feedback {
    pub fn is_empty(&self) -> bool {
        self.missing_tags.is_empty() && self.format_violations.is_empty() && self.quality_suggestions.is_empty()
    }
}

/// Complete validation report for an episode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Warnings in the order the rules raised them
    pub warnings: Vec<String>,
    pub feedback: Feedback,
    pub status: ValidationStatus,
    /// Whether any critical finding fired
    pub critical: bool,
}

impl ValidationReport {
    fn from_findings(findings: Findings, fail_on_critical: bool) -> Self {
        let mut report = Self {
            warnings: findings.warnings,
            feedback: Feedback {
                missing_tags: findings.missing_tags,
                format_violations: findings.format_violations,
                quality_suggestions: findings.quality_suggestions,
            },
            status: ValidationStatus::Passed,
            critical: findings.critical,
        };
        report.status = report.derive_status(fail_on_critical);
        report
    }

    /// Status implied by the current findings
    pub fn derive_status(&self, fail_on_critical: bool) -> ValidationStatus {
        if self.critical && fail_on_critical {
            ValidationStatus::Failed
        } else if !self.warnings.is_empty() || !self.feedback.format_violations.is_empty() {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Passed
        }
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        format!(
            "Validation: {} ({} warnings, {} missing tags, {} format violations, {} suggestions)",
            self.status,
            self.warnings.len(),
            self.feedback.missing_tags.len(),
            self.feedback.format_violations.len(),
            self.feedback.quality_suggestions.len()
        )
    }
}

/// Runs the enabled content rules over an episode
#[derive(Debug, Clone)]
pub struct ContentValidator {
    config: ValidationConfig,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentValidator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an episode
    pub fn validate(&self, episode: &Episode) -> ValidationReport {
        let rules_enabled = &self.config.rules;
        let mut findings = Findings::default();

        if rules_enabled.required_speakers {
            rules::check_required_speakers(episode, &self.config, &mut findings);
        }
        if rules_enabled.required_multimedia {
            rules::check_required_multimedia(episode, &self.config, &mut findings);
        }
        if rules_enabled.structure {
            rules::check_structure(episode, &mut findings);
        }
        if rules_enabled.quality {
            rules::check_quality(episode, &self.config.thresholds, &mut findings);
        }
        if rules_enabled.image_coverage {
            rules::check_image_coverage(episode, self.config.thresholds.min_image_scene_ratio, &mut findings);
        }
        if rules_enabled.duplicate_scene_ids {
            rules::check_duplicate_scene_ids(episode, &mut findings);
        }

        debug!(
            "Rules finished for {}: critical={}",
            episode.number, findings.critical
        );
        let report = ValidationReport::from_findings(findings, self.config.fail_on_critical_errors);
        info!("{}", report.summary());
        report
    }
}
