/*!
 * Episode assembly.
 *
 * Runs the whole pipeline for one script (parse, validate, estimate) and
 * merges the results into the output document with its metadata envelope.
 * Input failures never escape: they produce an emergency document with no
 * scenes and a `failed` status instead.
 */

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::app_config::Config;
use crate::errors::ParseError;
use crate::estimate::{CostAnalysis, TimingEstimate, estimate_costs, estimate_timing};
use crate::file_utils::FileManager;
use crate::script::{Episode, ParserContext, Scene, TagKind, episode_identity};
use crate::validation::{ContentValidator, Feedback, OutputSchema, SchemaViolation, ValidationStatus};

/// Warning recorded when a script has no scene heading at all
pub const NO_SCENES_WARNING: &str = "No scene markers found. Expected format: ## **\\[SCENE: NAME\\]**";

/// Characters of the source kept in `episode_metadata.content_preview`
const CONTENT_PREVIEW_CHARS: usize = 200;

/// Asset counts handed to the production stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownstreamCounts {
    pub voice_character_count: usize,
    pub image_generation_count: usize,
    pub sfx_count: usize,
    pub music_cue_count: usize,
    pub ambient_count: usize,
    pub transition_count: usize,
    pub thumbnail_count: usize,
}

impl DownstreamCounts {
    pub fn from_episode(episode: &Episode) -> Self {
        Self {
            voice_character_count: episode.character_count(),
            image_generation_count: episode.tag_count(TagKind::Image),
            sfx_count: episode.tag_count(TagKind::Sfx),
            music_cue_count: episode.tag_count(TagKind::Music),
            ambient_count: episode.tag_count(TagKind::Ambient),
            transition_count: episode.tag_count(TagKind::Transition),
            thumbnail_count: episode.tag_count(TagKind::Thumbnail),
        }
    }
}

/// Metadata envelope of an output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub parser_version: String,
    pub processing_timestamp: String,
    pub input_file_path: String,
    pub total_processing_time_seconds: f64,
    pub validation_status: ValidationStatus,
    pub estimated_downstream_costs: DownstreamCounts,
    pub character_count_by_speaker: BTreeMap<String, usize>,
    pub detailed_cost_analysis: CostAnalysis,
    pub timing_estimates: TimingEstimate,
}

/// Identity and summary of the episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub title: String,
    pub number: String,
    pub input_file: String,
    pub content_preview: String,
    pub total_scenes: usize,
}

/// The document written as `<episode>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeDocument {
    pub metadata: ProcessingMetadata,
    pub episode_metadata: EpisodeMetadata,
    pub scenes: Vec<Scene>,
    pub warnings: Vec<String>,
    pub feedback: Feedback,
}

impl EpisodeDocument {
    /// Minimal failed document for a script that could not be read
    pub fn emergency(path: &Path, error: &ParseError) -> Self {
        let (title, number) = episode_identity(path);
        let episode = Episode {
            title,
            number,
            source_path: path.to_path_buf(),
            scenes: Vec::new(),
        };
        let config = Config::default();

        let mut document = Self::from_parts(
            &episode,
            "",
            estimate_costs(&episode, &config.costs),
            estimate_timing(&episode, &config.timing),
            config.parser.version,
        );
        document.warnings.push(format!("Parser failed: {}", error));
        document.feedback.format_violations.push(error.to_string());
        document.metadata.validation_status = ValidationStatus::Failed;
        document
    }

    fn from_parts(
        episode: &Episode,
        text: &str,
        costs: CostAnalysis,
        timing: TimingEstimate,
        parser_version: String,
    ) -> Self {
        let input_file = absolute_display(&episode.source_path);
        let character_count_by_speaker = costs
            .voice_generation
            .costs_by_speaker
            .iter()
            .map(|(speaker, cost)| (speaker.clone(), cost.characters))
            .collect();

        Self {
            metadata: ProcessingMetadata {
                parser_version,
                processing_timestamp: chrono::Local::now().to_rfc3339(),
                input_file_path: input_file.clone(),
                total_processing_time_seconds: 0.0,
                validation_status: ValidationStatus::Passed,
                estimated_downstream_costs: DownstreamCounts::from_episode(episode),
                character_count_by_speaker,
                detailed_cost_analysis: costs,
                timing_estimates: timing,
            },
            episode_metadata: EpisodeMetadata {
                title: episode.title.clone(),
                number: episode.number.clone(),
                input_file,
                content_preview: content_preview(text),
                total_scenes: episode.scenes.len(),
            },
            scenes: episode.scenes.clone(),
            warnings: Vec::new(),
            feedback: Feedback::default(),
        }
    }

    pub fn status(&self) -> ValidationStatus {
        self.metadata.validation_status
    }

    /// Add a warning, raising a passed status to warning
    pub fn add_warning(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
        if self.metadata.validation_status == ValidationStatus::Passed {
            self.metadata.validation_status = ValidationStatus::Warning;
        }
    }

    /// Record schema violations; any violation fails the document
    pub fn apply_schema_violations(&mut self, violations: &[SchemaViolation]) {
        for violation in violations {
            let message = violation.to_string();
            self.feedback.format_violations.push(message.clone());
            self.warnings.push(message);
        }
        if !violations.is_empty() {
            self.metadata.validation_status = ValidationStatus::Failed;
        }
    }

    /// Extra detail written with `--debug`
    pub fn debug_dump(&self, config: &Config) -> Value {
        let spans: Vec<Value> = self
            .scenes
            .iter()
            .map(|scene| {
                json!({
                    "scene_id": scene.scene_id,
                    "start_line": scene.start_line,
                    "marker_start": scene.span.marker_start,
                    "content_start": scene.span.content_start,
                    "content_end": scene.span.content_end,
                    "dialogues": scene.dialogue_count(),
                    "tags": scene
                        .multimedia
                        .iter_ordered()
                        .iter()
                        .map(|tag| json!({ "kind": tag.kind, "id": tag.tag_id, "line": tag.line_position }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        json!({
            "debug_info": {
                "full_metadata": self.metadata,
                "scene_spans": spans,
                "configuration": config,
            }
        })
    }
}

/// Builds output documents for episode scripts
#[derive(Debug, Clone)]
pub struct EpisodeAssembler {
    context: ParserContext,
    validator: ContentValidator,
    schema: Option<OutputSchema>,
}

impl EpisodeAssembler {
    pub fn new(config: Config) -> Result<Self, ParseError> {
        let schema = load_schema(&config);
        let validator = ContentValidator::with_config(config.validation.clone());
        Ok(Self {
            context: ParserContext::new(config)?,
            validator,
            schema,
        })
    }

    pub fn config(&self) -> &Config {
        &self.context.config
    }

    /// Read and assemble one script file; never fails
    pub fn assemble(&self, path: &Path) -> EpisodeDocument {
        let started = Instant::now();
        info!("Reading script from: {}", path.display());

        match FileManager::read_script(path) {
            Ok(text) => self.assemble_timed(&text, path, started),
            Err(e) => {
                error!("{}", e);
                let mut document = EpisodeDocument::emergency(path, &e);
                document.metadata.parser_version = self.config().parser.version.clone();
                document.metadata.detailed_cost_analysis.currency = self.config().costs.currency.clone();
                document.metadata.total_processing_time_seconds = round3(started.elapsed().as_secs_f64());
                document
            }
        }
    }

    /// Assemble a script already held in memory
    pub fn assemble_source(&self, text: &str, path: &Path) -> EpisodeDocument {
        self.assemble_timed(text, path, Instant::now())
    }

    fn assemble_timed(&self, text: &str, path: &Path, started: Instant) -> EpisodeDocument {
        let config = self.config();
        let episode = self.context.parse(text, path);
        let report = self.validator.validate(&episode);
        let costs = estimate_costs(&episode, &config.costs);
        let timing = estimate_timing(&episode, &config.timing);

        let mut document = EpisodeDocument::from_parts(&episode, text, costs, timing, config.parser.version.clone());
        document.metadata.validation_status = report.status;
        document.feedback = report.feedback;
        if episode.scenes.is_empty() {
            document.add_warning(NO_SCENES_WARNING.to_string());
        }
        for message in report.warnings {
            document.add_warning(message);
        }

        let elapsed = started.elapsed().as_secs_f64();
        document.metadata.total_processing_time_seconds = round3(elapsed);
        if elapsed > config.parser.max_processing_time_seconds {
            document.add_warning(format!(
                "Processing took {:.3}s, above the {}s limit",
                elapsed, config.parser.max_processing_time_seconds
            ));
        }

        self.check_schema(&mut document);

        info!(
            "Assembled {}: {} scenes, {} dialogues, status {}",
            document.episode_metadata.title,
            document.scenes.len(),
            episode.dialogue_count(),
            document.status()
        );
        document
    }

    fn check_schema(&self, document: &mut EpisodeDocument) {
        let Some(schema) = &self.schema else {
            return;
        };
        match serde_json::to_value(&*document) {
            Ok(value) => {
                let violations = schema.validate(&value);
                debug!(
                    "Schema {} reported {} violations",
                    schema.source().display(),
                    violations.len()
                );
                document.apply_schema_violations(&violations);
            }
            Err(e) => warn!("Could not serialize document for schema validation: {}", e),
        }
    }
}

fn load_schema(config: &Config) -> Option<OutputSchema> {
    let path = config.validation.schema_path.as_ref()?;
    if !path.exists() {
        warn!("Schema file {} not found, skipping schema validation", path.display());
        return None;
    }
    match OutputSchema::load(path) {
        Ok(schema) => Some(schema),
        Err(e) => {
            warn!("{}. Skipping schema validation.", e);
            None
        }
    }
}

fn content_preview(text: &str) -> String {
    match text.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
