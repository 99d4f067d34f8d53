use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::assembler::{EpisodeAssembler, EpisodeDocument};
use crate::file_utils::FileManager;
use crate::reporting::{render_cost_report, render_validation_report};
use crate::validation::ValidationStatus;

// @module: Application controller for episode script processing

/// Files written for one episode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFiles {
    pub json: PathBuf,
    pub validation_report: PathBuf,
    pub cost_report: Option<PathBuf>,
    pub debug_dump: Option<PathBuf>,
}

/// Result of processing one script
#[derive(Debug, Clone)]
pub struct EpisodeRun {
    pub input: PathBuf,
    pub status: ValidationStatus,
    pub outputs: OutputFiles,
}

/// Main application controller for episode parsing
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared parser, validator and estimators
    assembler: EpisodeAssembler,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let assembler = EpisodeAssembler::new(config.clone()).context("Failed to build the script parser")?;
        Ok(Self { config, assembler })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process a single script and write its outputs
    ///
    /// Input errors still produce a (failed) document on disk; only output
    /// failures are returned as errors.
    pub fn run(&self, input_file: &Path, output_dir: &Path, debug_mode: bool) -> Result<EpisodeRun> {
        let document = self.assembler.assemble(input_file);
        let outputs = self.write_outputs(&document, input_file, output_dir, debug_mode)?;
        let status = document.status();

        match status {
            ValidationStatus::Failed => error!("Failed: {} (see {})", input_file.display(), outputs.validation_report.display()),
            _ => info!("Success: {} ({})", outputs.json.display(), status),
        }

        Ok(EpisodeRun {
            input: input_file.to_path_buf(),
            status,
            outputs,
        })
    }

    /// Process every script under a directory in parallel
    ///
    /// Outputs mirror the script's subdirectory under `output_dir`. Returns
    /// the worst status seen; an output failure for one file counts as
    /// failed without stopping the others.
    pub fn run_folder(&self, input_dir: &Path, output_dir: &Path, debug_mode: bool) -> Result<ValidationStatus> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let mut scripts = FileManager::find_files(input_dir, "md")?;
        scripts.extend(FileManager::find_files(input_dir, "markdown")?);
        scripts.sort();
        if scripts.is_empty() {
            return Err(anyhow!("No episode scripts found in directory: {:?}", input_dir));
        }
        info!("Found {} episode scripts in {}", scripts.len(), input_dir.display());

        let folder_pb = ProgressBar::new(scripts.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scripts ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Parsing scripts");

        // Two scripts writing the same JSON would race; keep the first
        let mut claimed = HashSet::new();
        let mut jobs = Vec::with_capacity(scripts.len());
        let mut skipped = 0;
        for script in &scripts {
            let target_dir = Self::mirrored_output_dir(script, input_dir, output_dir);
            let json_path = FileManager::generate_output_path(script, &target_dir, "", "json");
            if claimed.insert(json_path.clone()) {
                jobs.push((script, target_dir));
            } else {
                warn!("Skipping {}: its outputs would overwrite {}", script.display(), json_path.display());
                folder_pb.inc(1);
                skipped += 1;
            }
        }

        let mut statuses: Vec<ValidationStatus> = jobs
            .par_iter()
            .map(|(script, target_dir)| {
                let status = match self.run(script, target_dir, debug_mode) {
                    Ok(run) => run.status,
                    Err(e) => {
                        error!("Error processing file {}: {:#}", script.display(), e);
                        ValidationStatus::Failed
                    }
                };
                folder_pb.inc(1);
                status
            })
            .collect();
        statuses.extend(std::iter::repeat_n(ValidationStatus::Failed, skipped));

        folder_pb.finish_with_message("Folder processing complete");

        let failed = statuses.iter().filter(|s| **s == ValidationStatus::Failed).count();
        let warned = statuses.iter().filter(|s| **s == ValidationStatus::Warning).count();
        info!(
            "Folder processing completed: {} scripts, {} with warnings, {} failed in {}",
            statuses.len(),
            warned,
            failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(worst_status(&statuses))
    }

    // @returns: Output directory mirroring the script's place under input_dir
    fn mirrored_output_dir(script: &Path, input_dir: &Path, output_dir: &Path) -> PathBuf {
        match script.parent().and_then(|parent| parent.strip_prefix(input_dir).ok()) {
            Some(relative) if !relative.as_os_str().is_empty() => output_dir.join(relative),
            _ => output_dir.to_path_buf(),
        }
    }

    /// Rebuild `<stem>_cost_report.txt` from a previously written `<stem>.json`
    pub fn regenerate_cost_report(json_path: &Path) -> Result<PathBuf> {
        let content = FileManager::read_to_string(json_path)?;
        let document: EpisodeDocument = serde_json::from_str(&content)
            .with_context(|| format!("Not an episode document: {:?}", json_path))?;

        let output_dir = json_path.parent().unwrap_or_else(|| Path::new("."));
        let report_path = FileManager::generate_output_path(json_path, output_dir, "_cost_report", "txt");
        FileManager::write_to_file(&report_path, &render_cost_report(&document))?;
        info!("Cost report saved: {}", report_path.display());
        Ok(report_path)
    }

    fn write_outputs(
        &self,
        document: &EpisodeDocument,
        input_file: &Path,
        output_dir: &Path,
        debug_mode: bool,
    ) -> Result<OutputFiles> {
        FileManager::ensure_dir(output_dir)?;

        let json_path = FileManager::generate_output_path(input_file, output_dir, "", "json");
        let json = serde_json::to_string_pretty(document).context("Failed to serialize episode document")?;
        FileManager::write_to_file(&json_path, &json)?;
        debug!("Episode document saved: {}", json_path.display());

        let validation_path = FileManager::generate_output_path(input_file, output_dir, "_validation", "txt");
        FileManager::write_to_file(&validation_path, &render_validation_report(document))?;

        let cost_report = if self.config.parser.write_cost_report {
            let path = FileManager::generate_output_path(input_file, output_dir, "_cost_report", "txt");
            FileManager::write_to_file(&path, &render_cost_report(document))?;
            Some(path)
        } else {
            None
        };

        let debug_dump = if debug_mode || self.config.parser.default_debug_mode {
            let path = FileManager::generate_output_path(input_file, output_dir.join("debug"), "_debug", "json");
            let dump = serde_json::to_string_pretty(&document.debug_dump(&self.config))
                .context("Failed to serialize debug dump")?;
            FileManager::write_to_file(&path, &dump)?;
            Some(path)
        } else {
            None
        };

        if !document.warnings.is_empty() {
            warn!("{} warnings for {}", document.warnings.len(), input_file.display());
        }

        Ok(OutputFiles {
            json: json_path,
            validation_report: validation_path,
            cost_report,
            debug_dump,
        })
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Failed beats warning beats passed
pub fn worst_status(statuses: &[ValidationStatus]) -> ValidationStatus {
    if statuses.contains(&ValidationStatus::Failed) {
        ValidationStatus::Failed
    } else if statuses.contains(&ValidationStatus::Warning) {
        ValidationStatus::Warning
    } else {
        ValidationStatus::Passed
    }
}
