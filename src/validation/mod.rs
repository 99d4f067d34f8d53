/*!
 * Validation module for parsed episode scripts.
 *
 * This module checks a parsed episode before it moves on to production:
 * - Required speakers and multimedia coverage
 * - Structural checks (empty episode, empty scenes)
 * - Quality heuristics (dialogue volume and length, image coverage)
 * - Structural check of the output document against a JSON schema
 *
 * # Architecture
 *
 * - `rules`: Individual content rules
 * - `schema`: JSON schema subset checker for the output document
 * - `service`: Orchestrates the rules and derives the status
 */

pub mod rules;
pub mod schema;
pub mod service;

// Re-export main types
pub use schema::{OutputSchema, SchemaViolation};
pub use service::{ContentValidator, Feedback, ValidationReport, ValidationStatus};
