// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use epiparse::app_config::{self, Config};
use epiparse::app_controller::Controller;
use epiparse::escaper::{EscapeReport, TagEscaper};
use epiparse::file_utils::FileManager;
use epiparse::script::TagKind;
use epiparse::validation::ValidationStatus;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse an episode script, or every script in a directory (default command)
    Parse {
        /// Episode script (.md) or directory of scripts
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        #[command(flatten)]
        options: ParseOptions,
    },

    /// Escape bare multimedia tags so the parser recognises them
    Escape {
        /// Script to process
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: <name>_processed.md next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Only check; exit 0 when the file needs processing, 1 otherwise
        #[arg(long)]
        verify: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate the cost report from a written episode JSON file
    Report {
        #[arg(value_name = "EPISODE_JSON")]
        episode_json: PathBuf,
    },

    /// Write a configuration template
    InitConfig {
        /// Configuration file path
        #[arg(short, long, default_value = "config.json")]
        config_path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions for epiparse
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ParseOptions {
    /// Output directory (default: parser.default_output_dir from the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write debug dumps and log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config_path: PathBuf,
}

/// epiparse - episode script parser
///
/// Turns markdown episode scripts into structured JSON for the production
/// pipeline, with validation feedback and cost/timing estimates.
#[derive(Parser, Debug)]
#[command(name = "epiparse")]
#[command(version)]
#[command(about = "Episode script parser and production cost estimator")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "epiparse parses markdown episode scripts into structured JSON for voice, image and audio generation.

EXAMPLES:
    epiparse episode_001.md                       # Parse using config.json if present
    epiparse parse scripts/ -o output/json        # Parse every script in a directory
    epiparse parse episode_001.md --debug         # Also write debug/episode_001_debug.json
    epiparse escape episode_001.md --dry-run      # Show which tags need escaping
    epiparse report output/json/episode_001.json  # Rebuild the cost report
    epiparse init-config                          # Write a config.json template
    epiparse completions bash > epiparse.bash     # Generate bash completions

EXIT STATUS:
    0 when every episode passed or has warnings, 1 when any failed.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Episode script or directory to parse
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: ParseOptions,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour code and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("31", "❌ "),
            Level::Warn => ("33", "🚧 "),
            Level::Info => ("32", " "),
            Level::Debug => ("36", "🔍 "),
            Level::Trace => ("35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, marker) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[1;{}m{} {} {}\x1B[0m", colour, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // The logger accepts everything; the effective level is set through set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).to_level_filter());
    }

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "epiparse", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Parse { input_path, options }) => run_parse(&input_path, &options, cli.log_level.as_ref()),
        Some(Commands::Escape {
            file,
            output,
            dry_run,
            verify,
            json,
        }) => run_escape(&file, output.as_deref(), dry_run || verify, verify, json),
        Some(Commands::Report { episode_json }) => run_report(&episode_json),
        Some(Commands::InitConfig { config_path, force }) => run_init_config(&config_path, force),
        None => match cli.input_path {
            Some(input_path) => run_parse(&input_path, &cli.options, cli.log_level.as_ref()),
            None => Err(anyhow!("INPUT_PATH is required when no subcommand is specified")),
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_parse(input_path: &Path, options: &ParseOptions, cli_level: Option<&CliLogLevel>) -> Result<ExitCode> {
    let config = Config::load_or_default(&options.config_path);

    // --debug wins, then --log-level, then the config file
    let level = if options.debug {
        LevelFilter::Debug
    } else if let Some(level) = cli_level {
        app_config::LogLevel::from(level.clone()).to_level_filter()
    } else {
        config.log_level.to_level_filter()
    };
    log::set_max_level(level);

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.parser.default_output_dir.clone());
    let controller = Controller::with_config(config)?;

    let status = if input_path.is_dir() {
        controller.run_folder(input_path, &output_dir, options.debug)?
    } else {
        controller.run(input_path, &output_dir, options.debug)?.status
    };

    Ok(exit_code_for(status))
}

fn run_escape(file: &Path, output: Option<&Path>, dry_run: bool, verify: bool, json: bool) -> Result<ExitCode> {
    let report = TagEscaper::process_file(file, output, dry_run)?;

    if json {
        let rendered = serde_json::to_string_pretty(&report).context("Failed to serialize escape report")?;
        println!("{}", rendered);
    } else {
        print_escape_summary(&report);
    }

    if verify {
        // Mirrors `grep -q`: success means there is something to fix
        return Ok(if report.needs_processing {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }
    Ok(ExitCode::SUCCESS)
}

fn print_escape_summary(report: &EscapeReport) {
    info!("Input: {}", report.input_file.display());
    for kind in TagKind::ALL {
        let counts = report.stats.get(kind);
        if counts.fixed > 0 || counts.already_escaped > 0 {
            info!(
                "  {}: {} fixed, {} already escaped",
                kind.keyword(),
                counts.fixed,
                counts.already_escaped
            );
        }
    }
    info!(
        "Total: {} fixed, {} already escaped",
        report.total_fixed, report.total_already_escaped
    );
    for sample in &report.sample_fixes {
        info!("  {} -> {}", sample.original, sample.escaped);
    }

    if !report.needs_processing {
        info!("No unescaped tags found");
    } else if report.written {
        info!("Output: {}", report.output_file.display());
    } else {
        warn!("Dry run, nothing written (would write {})", report.output_file.display());
    }
}

fn run_report(episode_json: &Path) -> Result<ExitCode> {
    let path = Controller::regenerate_cost_report(episode_json)?;
    info!("Success: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn run_init_config(config_path: &Path, force: bool) -> Result<ExitCode> {
    if FileManager::file_exists(config_path) && !force {
        return Err(anyhow!(
            "Config file already exists: {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    Config::write_default(config_path)?;
    info!("Configuration template written to {}", config_path.display());
    Ok(ExitCode::SUCCESS)
}

fn exit_code_for(status: ValidationStatus) -> ExitCode {
    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
