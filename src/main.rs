use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use scenesweep::discovery::BUILD_SETTINGS;
use scenesweep::report::SummaryReporter;
use scenesweep::{
    Config, FileFinder, ProjectAnalyzer, ReportFormat, Reporter, SceneSource, UsageReport,
};

/// SceneSweep - Unity scene hierarchy dumps and unused script detection
#[derive(Parser, Debug)]
#[command(name = "scenesweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Unity project folder
    project: Option<PathBuf>,

    /// Folder receiving the hierarchy dumps and the report
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of documents processed concurrently
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Patterns to exclude, relative to the asset folder (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Take scenes from the build settings instead of scanning the asset folder
    #[arg(long)]
    build_settings: bool,

    /// Do not count prefabs as usage evidence
    #[arg(long)]
    no_prefabs: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of unused scripts listed in the terminal summary
    #[arg(long, default_value = "10")]
    top: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only write output files
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

const USAGE: &str = "Usage: scenesweep <path-to-project-folder> <output-folder>";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    // Nothing to do is not a failure
    let (Some(project), Some(output)) = (cli.project.clone(), cli.output.clone()) else {
        println!("{}", USAGE);
        return Ok(());
    };

    if !project.is_dir() {
        println!("Project folder does not exist: {}", project.display());
        return Ok(());
    }

    if !FileFinder::is_project(&project) {
        println!(
            "Are you sure this is a valid Unity project? Asset folder does not exist: {}",
            FileFinder::asset_dir(&project).display()
        );
        return Ok(());
    }

    info!("SceneSweep v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli, &project)?;

    if config.scene_source == SceneSource::BuildSettings && !project.join(BUILD_SETTINGS).is_file()
    {
        println!(
            "Are you sure this is a valid Unity project? Build settings file does not exist: {}",
            project.join(BUILD_SETTINGS).display()
        );
        return Ok(());
    }

    std::fs::create_dir_all(&output).into_diagnostic()?;

    run_analysis(&config, &cli, &project, &output)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli, project: &Path) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(project)?
    };

    // Override with CLI arguments
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if cli.build_settings {
        config.scene_source = SceneSource::BuildSettings;
    }
    if cli.no_prefabs {
        config.sweep_prefabs = false;
    }

    config.validate()?;
    Ok(config)
}

fn run_analysis(config: &Config, cli: &Cli, project: &Path, output: &Path) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let discovery = finder.find_files(project)?;
    let files = discovery.files;
    let mut diagnostics = discovery.diagnostics;

    info!(
        "Found {} scenes, {} prefabs, {} scripts",
        files.scenes.len(),
        files.prefabs.len(),
        files.scripts.len()
    );

    if !cli.quiet {
        if files.is_empty() {
            println!("{}", "Nothing to analyze: no scenes, prefabs or scripts found.".yellow());
        } else if files.scenes.is_empty() {
            println!("{}", "No scenes found.".yellow());
        }
    }

    // Step 2: Registry, dumps and usage sweeps
    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .into_diagnostic()?
                .progress_chars("#>-"),
        );
        pb
    };

    let analyzer = ProjectAnalyzer::new(config).with_progress(progress);
    let mut analysis = analyzer.analyze(project, &files, output)?;
    diagnostics.append(&mut analysis.diagnostics);
    analysis.diagnostics = diagnostics;

    // Step 3: Report
    let format = ReportFormat::from(cli.format);
    let report_path = Reporter::path_in(output, &config.report_file, format);
    let report = UsageReport::from_registry(&analysis.registry);
    Reporter::new(format, report_path.clone()).report(&report)?;

    if !cli.quiet {
        SummaryReporter::new()
            .with_top_n(cli.top)
            .with_base_path(project.to_path_buf())
            .report(&analysis);

        println!(
            "{}",
            format!("📝 Report written: {}", report_path.display()).green()
        );
        let elapsed = start_time.elapsed();
        println!(
            "{}",
            format!(
                "⏱  Analyzed {} documents and {} scripts in {:.2}s",
                analysis.documents.len(),
                analysis.scripts_scanned,
                elapsed.as_secs_f64()
            )
            .dimmed()
        );
    }

    Ok(())
}
