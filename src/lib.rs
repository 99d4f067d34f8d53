/*!
 * # epiparse - Episode script parser
 *
 * A Rust library that turns markdown episode scripts into structured data
 * for an automated audio/visual production pipeline.
 *
 * ## Features
 *
 * - Scene segmentation on `## **\[SCENE: NAME\]**` markers
 * - Dialogue extraction (`SPEAKER: "text"`)
 * - Multimedia tag extraction (images, sound effects, music, ambient
 *   tracks, transitions, thumbnails), ignoring fenced code blocks
 * - Content validation with author feedback and a pass/warning/fail status
 * - Deterministic production cost and episode duration estimates
 * - A pre-processor that escapes bare multimedia tags
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: Grammar, scene segmentation, dialogue and tag extraction:
 *   - `script::grammar`: Compiled regular expressions
 *   - `script::source`: Line and code fence index over one document
 *   - `script::scenes`: Scene markers and spans
 *   - `script::dialogue`: Dialogue lines
 *   - `script::tags`: Multimedia tags
 * - `validation`: Content rules, status derivation and schema checks
 * - `estimate`: Cost and timing estimators
 * - `assembler`: Builds the output document for one episode
 * - `reporting`: Plain-text validation and cost reports
 * - `escaper`: Tag escaping pre-processor
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod assembler;
pub mod errors;
pub mod escaper;
pub mod estimate;
pub mod file_utils;
pub mod reporting;
pub mod script;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use assembler::{EpisodeAssembler, EpisodeDocument};
pub use errors::{ConfigError, ParseError, SchemaError};
pub use escaper::TagEscaper;
pub use estimate::{CostAnalysis, TimingEstimate, estimate_costs, estimate_timing};
pub use script::{Dialogue, Episode, ParserContext, Scene, TagKind, parse_script};
pub use validation::{ContentValidator, ValidationReport, ValidationStatus};
